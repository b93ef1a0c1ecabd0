use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub(crate) enum UpdateError {
    #[error("Unsupported distribution: {0}")]
    UnsupportedDistro(String),

    #[error("Execution failed: {0}")]
    Spawn(String),

    #[error("{}", process_failure_message(.0))]
    ProcessFailure(Option<i32>),
}

fn process_failure_message(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("Command failed with return code {code}"),
        None => "Command terminated by signal".to_string(),
    }
}
