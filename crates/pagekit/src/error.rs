//! CLI error types.

use std::time::Duration;

use pagekit_config::ConfigError;
use pagekit_confluence::ConfluenceError;
use pagekit_confluence::updater::UpdateError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Confluence(#[from] ConfluenceError),

    #[error("{0}")]
    Update(#[from] UpdateError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "update did not finish within {0:?}; the last attempt may or may not have been applied, \
         re-fetch the page to check its version"
    )]
    Timeout(Duration),

    #[error("{0}")]
    Validation(String),
}
