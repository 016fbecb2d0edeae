//! Global CLI options shared across all commands

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;

/// Global CLI options passed to all command handlers.
///
/// Precedence is CLI flag > environment variable > config file > default.
/// This struct captures the CLI/env layer; config defaults are resolved in
/// `CommandContext`.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Explicit output format, if given
    pub format: Option<OutputFormat>,

    /// Custom config file path (defaults to ~/.taskdock/config.yaml)
    pub config: Option<String>,

    /// API host override
    pub api_host: Option<String>,
}

impl GlobalOptions {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            api_host: cli.api_host.clone(),
        }
    }

    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }

    pub fn api_host_ref(&self) -> Option<&str> {
        self.api_host.as_deref()
    }

    /// Flag, then config preference, then the default
    pub fn resolve_format(&self, config: &Config) -> OutputFormat {
        self.format
            .or_else(|| {
                config
                    .preferences
                    .format
                    .as_deref()
                    .and_then(OutputFormat::from_preference)
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_precedence() {
        let mut config = Config::default();
        config.preferences.format = Some("json".to_string());

        let flagged = GlobalOptions {
            format: Some(OutputFormat::Table),
            ..Default::default()
        };
        assert_eq!(flagged.resolve_format(&config), OutputFormat::Table);

        let unflagged = GlobalOptions::default();
        assert_eq!(unflagged.resolve_format(&config), OutputFormat::Json);
        assert_eq!(
            unflagged.resolve_format(&Config::default()),
            OutputFormat::Pretty
        );
    }

    #[test]
    fn test_accessors() {
        let opts = GlobalOptions {
            format: None,
            config: Some("/tmp/custom.yaml".to_string()),
            api_host: Some("http://localhost:8000".to_string()),
        };
        assert_eq!(opts.config_ref(), Some("/tmp/custom.yaml"));
        assert_eq!(opts.api_host_ref(), Some("http://localhost:8000"));
    }
}
