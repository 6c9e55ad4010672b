pub mod config;
pub mod curl;
pub mod deck;
pub mod executor;
pub mod files;
pub mod monitor;
pub mod session;
pub mod template;
