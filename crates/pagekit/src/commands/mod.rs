//! CLI command implementations.

pub(crate) mod page;
pub(crate) mod search;
pub(crate) mod space;

pub(crate) use page::PageCommand;
pub(crate) use search::SearchArgs;
pub(crate) use space::SpaceCommand;

use std::path::PathBuf;

use clap::Args;
use pagekit_config::{CliSettings, Config};
use pagekit_confluence::updater::RetryConfig;
use pagekit_confluence::{ConfluenceClient, Credentials};

use crate::error::CliError;

/// Connection options shared by every command.
#[derive(Args)]
pub(crate) struct ConnectionArgs {
    /// Path to configuration file (default: auto-discover pagekit.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Confluence base URL (overrides config).
    #[arg(long, env = "PAGEKIT_BASE_URL")]
    base_url: Option<String>,

    /// API token (overrides config).
    #[arg(long, env = "PAGEKIT_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

impl ConnectionArgs {
    /// Load config with connection overrides plus `settings`.
    pub(crate) fn load_config(&self, settings: CliSettings) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            base_url: self.base_url.clone(),
            token: self.token.clone(),
            ..settings
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        match &config.config_path {
            Some(path) => tracing::debug!(path = %path.display(), "Loaded configuration"),
            None => tracing::debug!("No pagekit.toml found, using defaults and CLI settings"),
        }
        Ok(config)
    }

    /// Load config and build a client from its `[confluence]` section.
    pub(crate) fn connect(&self) -> Result<ConfluenceClient, CliError> {
        let config = self.load_config(CliSettings::default())?;
        client_from_config(&config)
    }
}

/// Build a client from the `[confluence]` section of `config`.
pub(crate) fn client_from_config(config: &Config) -> Result<ConfluenceClient, CliError> {
    let conf = config.require_confluence()?;
    let credentials = Credentials::from_parts(conf.username.as_deref(), &conf.token);
    Ok(ConfluenceClient::with_timeout(
        &conf.base_url,
        &credentials,
        conf.timeout(),
    ))
}

/// Retry policy from the `[update]` section of `config`.
pub(crate) fn retry_config(config: &Config) -> RetryConfig {
    RetryConfig {
        max_attempts: config.update.max_attempts,
        base_delay: config.update.base_delay(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_retry_config_from_update_section() {
        let mut config = Config::default();
        config.update.max_attempts = 5;
        config.update.base_delay_ms = 250;

        assert_eq!(
            retry_config(&config),
            RetryConfig {
                max_attempts: 5,
                base_delay: std::time::Duration::from_millis(250),
            }
        );
    }

    #[test]
    fn test_client_requires_confluence_section() {
        let config = Config::default();
        assert!(matches!(
            client_from_config(&config),
            Err(CliError::Config(_))
        ));
    }
}
