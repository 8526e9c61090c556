use thiserror::Error;

use crate::state::TransitionError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("investigation failed: {0}")]
    Investigation(#[from] InvestigationError),
    #[error("command failed: {0}")]
    Command(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Run-fatal failures. Anything surfacing as this aborts the investigation and
/// is reported at the process boundary as a 500.
#[derive(Error, Debug)]
pub enum InvestigationError {
    #[error("config error: {0}")]
    Config(String),
    #[error("session open failed: {0}")]
    SessionOpen(#[source] anyhow::Error),
    #[error("event stream failed: {0}")]
    Stream(#[source] anyhow::Error),
    #[error("session state read failed: {0}")]
    StateRead(#[source] anyhow::Error),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}
