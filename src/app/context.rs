use std::sync::Arc;

use crate::app::error::Result;
use crate::config::Config;
use crate::fetcher::{Downloader, WorkerPool};
use crate::scraper::{ChromeSessionFactory, ItemLister, LinkResolver, RenderPoller, SessionFactory};

/// Wires configuration into the pipeline components.
pub struct AppContext {
    pub config: Config,
    pub poller: RenderPoller,
    pub lister: ItemLister,
    pub resolver: Arc<LinkResolver>,
    pub downloader: Arc<Downloader>,
    pub pool: WorkerPool,
}

impl AppContext {
    /// Context backed by real Chrome sessions
    pub fn new(config: Config) -> Result<Self> {
        let sessions: Arc<dyn SessionFactory> =
            Arc::new(ChromeSessionFactory::new(config.scraper.clone()));
        Self::with_sessions(config, sessions)
    }

    pub fn with_sessions(config: Config, sessions: Arc<dyn SessionFactory>) -> Result<Self> {
        let poller = RenderPoller::new(sessions);
        let lister = ItemLister::new(&config.crawl.card_selector)?;
        let resolver = LinkResolver::new(
            poller.clone(),
            config.scraper.detail_plan(),
            &config.crawl,
        )?;
        let downloader = Downloader::new(&config.download)?;
        let pool = WorkerPool::new(config.crawl.workers());

        Ok(Self {
            config,
            poller,
            lister,
            resolver: Arc::new(resolver),
            downloader: Arc::new(downloader),
            pool,
        })
    }
}
