//! CLI error types

use std::path::PathBuf;

use flexforms::FormError;
use formdom::DomError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid scenario: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("scenario check failed: {0}")]
    Check(String),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Dom(#[from] DomError),

    #[error(transparent)]
    Transport(#[from] flexforms_http::BuildError),

    #[error("logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}
