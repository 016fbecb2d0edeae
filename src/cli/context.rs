//! Command execution context
//!
//! Loads configuration once per command and wires the API client, the query
//! cache and the mutation coordinator together.

use std::sync::Arc;

use crate::cache::QueryCache;
use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::client::DashboardClient;
use crate::config::Config;
use crate::error::Result;
use crate::mutation::MutationCoordinator;
use crate::notify::ConsoleNotifier;

/// Shared state for one command invocation
pub struct CommandContext {
    pub config: Config,
    pub client: Arc<DashboardClient>,
    /// Process-wide query cache, dropped with the context
    pub cache: QueryCache,
    pub coordinator: Arc<MutationCoordinator<DashboardClient>>,
    pub format: OutputFormat,
}

impl CommandContext {
    /// Load config, apply overrides and require a session.
    ///
    /// # Errors
    /// Fails when the config is missing, no session is stored or no API host is set.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let mut config = Config::load_at(opts.config_ref())?;
        config.apply_overrides(opts.api_host_ref());
        config.validate_session()?;
        Self::with_config(config, opts)
    }

    /// Build the context around an already-loaded config
    pub fn with_config(config: Config, opts: &GlobalOptions) -> Result<Self> {
        let client = Arc::new(DashboardClient::from_config(&config)?);
        let cache = QueryCache::new();
        let coordinator = Arc::new(MutationCoordinator::new(
            Arc::clone(&client),
            cache.clone(),
            Arc::new(ConsoleNotifier),
        ));
        let format = opts.resolve_format(&config);

        Ok(Self {
            config,
            client,
            cache,
            coordinator,
            format,
        })
    }

    /// Signed-in user ID, or empty when unknown
    pub fn user_id(&self) -> &str {
        self.config.user_id.as_deref().unwrap_or_default()
    }

    /// Forget the session on disk and everything cached
    pub fn logout(&mut self, config_path: Option<&str>) -> Result<()> {
        self.config.clear_session();
        self.config.save_at(config_path)?;
        self.cache.clear();
        Ok(())
    }
}
