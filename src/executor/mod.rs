mod models;
mod printer;
mod runner;

pub use models::{ExecuteOptions, ExecutionOutcome, ExecutionResult, ResponsePayload, VersionInfo};
pub use printer::{
    create_preview, method_color, print_command, print_execution_result, print_section,
    render_payload,
};
pub use runner::{Executor, DEFAULT_HEALTH_PATH};
