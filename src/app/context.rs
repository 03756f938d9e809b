use std::path::Path;
use std::sync::Arc;

use crate::app::error::Result;
use crate::cache::Library;
use crate::config::Config;
use crate::fetcher::Fetcher;
use crate::scraper::SiteScraper;

pub struct AppContext {
    pub config: Arc<Config>,
    pub library: Library,
}

impl AppContext {
    /// Load the config (default location unless `config_path` is given) and
    /// build the HTTP-backed pipeline.
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load(config_path)?;
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let scraper = Arc::new(SiteScraper::from_config(&config.scraper)?);
        Ok(Self::assemble(config, scraper))
    }

    /// Same pipeline over a caller-supplied fetcher.
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        let scraper = Arc::new(SiteScraper::new(fetcher, config.scraper.clone())?);
        Ok(Self::assemble(config, scraper))
    }

    fn assemble(config: Config, scraper: Arc<SiteScraper>) -> Self {
        let library = Library::new(scraper, &config.cache);
        Self {
            config: Arc::new(config),
            library,
        }
    }
}
