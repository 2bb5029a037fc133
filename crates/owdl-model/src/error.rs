//! Workflow definition errors.

/// A workflow definition that cannot be used.
///
/// These are configuration errors: they are reported once and never retried.
#[derive(Debug, thiserror::Error)]
pub enum OwdlParseError {
    #[error("Workflow JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Workflow has no states")]
    NoStates,

    #[error("StartsAt references unknown state '{0}'")]
    UnknownStartState(String),

    #[error("State '{from}' has Next '{next}' which is not defined")]
    UnknownNextState { from: String, next: String },

    #[error("State '{0}' neither sets End nor names a Next state")]
    DanglingState(String),

    #[error("State '{0}' has an empty CmdArgsList")]
    EmptyCmdArgs(String),

    #[error("Invalid state name '{0}'")]
    InvalidStateName(String),
}
