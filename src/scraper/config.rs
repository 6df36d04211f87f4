use std::path::PathBuf;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Configuration for the browser and its render loops
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Whether to run the browser in headless mode (default: true)
    pub headless: bool,

    /// Chrome/Chromium binary; auto-detected when unset
    pub chrome_executable: Option<PathBuf>,

    /// Hide the "controlled by automated software" fingerprint (default: true)
    pub hide_automation: bool,

    /// Total polling budget per render in milliseconds (default: 60000)
    pub timeout_ms: u64,

    /// Feed page wait: max(min, random * factor) seconds (default: 3 / 5)
    pub feed_min_wait_secs: f64,
    pub feed_wait_factor: f64,

    /// Detail page wait: max(min, random * factor) seconds (default: 5 / 10)
    pub detail_min_wait_secs: f64,
    pub detail_wait_factor: f64,

    /// User agent string to use
    pub user_agent: Option<String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_executable: None,
            hide_automation: true,
            timeout_ms: 60_000,
            feed_min_wait_secs: 3.0,
            feed_wait_factor: 5.0,
            detail_min_wait_secs: 5.0,
            detail_wait_factor: 10.0,
            user_agent: None,
        }
    }
}

impl ScraperConfig {
    /// Get the polling budget as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Plan for the feed page: settle, then scroll and wait until the end marker shows up
    pub fn feed_plan(&self) -> RenderPlan {
        RenderPlan {
            jitter: Jitter::new(self.feed_min_wait_secs, self.feed_wait_factor),
            budget: self.timeout(),
            scroll: true,
            settle: true,
        }
    }

    /// Plan for a detail page: wait without input until the media element hydrates
    pub fn detail_plan(&self) -> RenderPlan {
        RenderPlan {
            jitter: Jitter::new(self.detail_min_wait_secs, self.detail_wait_factor),
            budget: self.timeout(),
            scroll: false,
            settle: false,
        }
    }
}

/// Randomised wait between polls, `max(min_secs, random() * factor)` seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Jitter {
    pub min_secs: f64,
    pub factor: f64,
}

impl Jitter {
    pub fn new(min_secs: f64, factor: f64) -> Self {
        Self { min_secs, factor }
    }

    /// A jitter that always yields `wait`
    pub fn fixed(wait: Duration) -> Self {
        Self {
            min_secs: wait.as_secs_f64(),
            factor: 0.0,
        }
    }

    /// Draw one wait interval, truncated to whole milliseconds.
    pub fn draw(&self) -> Duration {
        let r: f64 = rand::thread_rng().gen();
        let secs = self.min_secs.max(r * self.factor);
        Duration::from_millis((secs * 1000.0) as u64)
    }
}

/// How one render cycle polls the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPlan {
    pub jitter: Jitter,
    /// Total time the loop may spend waiting
    pub budget: Duration,
    /// Send an End key before every wait
    pub scroll: bool,
    /// Wait one interval after navigation before polling
    pub settle: bool,
}
