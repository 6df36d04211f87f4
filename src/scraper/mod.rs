//! Browser-driven extraction of dynamically rendered pages.
//!
//! The feed page and every detail page build their content client-side,
//! so both are loaded in a real browser and polled until the wanted
//! markup exists.
//!
//! # Architecture
//!
//! ```text
//! SessionFactory → RenderPoller → markup → ItemLister   → ItemDescriptor
//!                                        → LinkResolver → ResolvedLink
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use vidharvest::scraper::{ChromeSessionFactory, RenderPoller, ScraperConfig};
//!
//! let config = ScraperConfig::default();
//! let poller = RenderPoller::new(Arc::new(ChromeSessionFactory::new(config.clone())));
//!
//! let outcome = poller
//!     .render_until_marker("https://example.com/feed", &config.feed_plan(), "the end")
//!     .await?;
//! ```

mod chrome;
mod config;
mod extractor;
pub mod poll;
mod render;
mod resolver;

pub use chrome::ChromeSessionFactory;
pub use config::{Jitter, RenderPlan, ScraperConfig};
pub use extractor::{ItemLister, MediaLocator, MediaLookup};
pub use poll::{poll_until, PollOutcome, PollSchedule, Probe};
pub use render::RenderPoller;
pub use resolver::LinkResolver;

use crate::app::Result;
use async_trait::async_trait;

/// Synthetic keys a session can dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Scroll to the bottom of the page
    End,
}

impl Key {
    /// DOM `key` / `code` value
    pub fn name(&self) -> &'static str {
        match self {
            Key::End => "End",
        }
    }

    /// Windows virtual key code
    pub fn key_code(&self) -> i64 {
        match self {
            Key::End => 35,
        }
    }
}

/// One exclusive browser session.
///
/// Sessions are never shared between workers; callers must `close` a
/// session on every exit path.
#[async_trait]
pub trait BrowserSession: Send {
    /// Load `url` in the session's page
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Serialized live DOM of the current page
    async fn current_markup(&mut self) -> Result<String>;

    /// Dispatch a key press to the page
    async fn send_key(&mut self, key: Key) -> Result<()>;

    /// Shut the session down and release its resources
    async fn close(&mut self) -> Result<()>;
}

/// Creates fresh browser sessions.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self) -> Result<Box<dyn BrowserSession>>;
}

/// Scripted in-memory browser used by unit tests.
#[cfg(test)]
pub(crate) mod fake {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::app::HarvestError;

    /// Markup a page serves on successive reads; the last entry repeats.
    #[derive(Debug, Clone, Default)]
    pub struct Script {
        pub frames: Vec<String>,
        pub fail_navigation: bool,
        /// `close` never returns
        pub hang_on_close: bool,
    }

    impl Script {
        pub fn constant(markup: &str) -> Self {
            Self {
                frames: vec![markup.to_string()],
                ..Default::default()
            }
        }

        pub fn frames(frames: &[&str]) -> Self {
            Self {
                frames: frames.iter().map(|f| f.to_string()).collect(),
                ..Default::default()
            }
        }
    }

    #[derive(Debug, Default)]
    pub struct Stats {
        pub opened: AtomicUsize,
        pub closed: AtomicUsize,
        pub keys: AtomicUsize,
        pub reads: AtomicUsize,
    }

    #[derive(Default)]
    pub struct FakeFactory {
        pub pages: Mutex<HashMap<String, Script>>,
        pub stats: Arc<Stats>,
    }

    impl FakeFactory {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_page(self, url: &str, script: Script) -> Self {
            self.pages.lock().unwrap().insert(url.to_string(), script);
            self
        }
    }

    struct FakeSession {
        pages: HashMap<String, Script>,
        current: Option<Script>,
        cursor: usize,
        stats: Arc<Stats>,
    }

    #[async_trait]
    impl SessionFactory for FakeFactory {
        async fn open(&self) -> Result<Box<dyn BrowserSession>> {
            self.stats.opened.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeSession {
                pages: self.pages.lock().unwrap().clone(),
                current: None,
                cursor: 0,
                stats: self.stats.clone(),
            }))
        }
    }

    #[async_trait]
    impl BrowserSession for FakeSession {
        async fn navigate(&mut self, url: &str) -> Result<()> {
            let script = self.pages.get(url).cloned().unwrap_or_default();
            if script.fail_navigation {
                return Err(HarvestError::Session(format!("cannot reach {}", url)));
            }
            self.current = Some(script);
            self.cursor = 0;
            Ok(())
        }

        async fn current_markup(&mut self) -> Result<String> {
            self.stats.reads.fetch_add(1, Ordering::SeqCst);
            let frames = self
                .current
                .as_ref()
                .map(|s| s.frames.clone())
                .unwrap_or_default();
            let idx = self.cursor.min(frames.len().saturating_sub(1));
            self.cursor += 1;
            Ok(frames.get(idx).cloned().unwrap_or_default())
        }

        async fn send_key(&mut self, _key: Key) -> Result<()> {
            self.stats.keys.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn close(&mut self) -> Result<()> {
            self.stats.closed.fetch_add(1, Ordering::SeqCst);
            if self.current.as_ref().is_some_and(|s| s.hang_on_close) {
                std::future::pending::<()>().await;
            }
            Ok(())
        }
    }
}
