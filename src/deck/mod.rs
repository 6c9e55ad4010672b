//! The authored demo command set.

mod content;
mod model;

pub use content::{all_commands, find_command, find_section, presentation};
pub use model::{CommandBody, CommandDescriptor, DemoSection, HttpMethod};
