//! Configuration management for vidharvest.
//!
//! Configuration is read from `~/.config/vidharvest/config.toml` at startup
//! unless another file is given. If the default file doesn't exist, a
//! default configuration with comments is created.

use crate::domain::FeedLayout;
use crate::fetcher::DownloadConfig;
use crate::scraper::ScraperConfig;
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawl: CrawlConfig,
    pub scraper: ScraperConfig,
    pub download: DownloadConfig,
}

/// What to crawl and where to put the results.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Profile feed page to scrape
    pub main_page_url: String,

    /// Existing directory the videos are written to
    pub output_dir: PathBuf,

    /// Which profile tab `main_page_url` points at
    pub layout: FeedLayout,

    /// CSS selector matching one feed card
    pub card_selector: String,

    /// Text the feed shows once nothing more will load
    pub terminal_marker: String,

    /// Detail page for the `video` layout; `{id}` is replaced with the item id
    pub detail_url_template: String,

    /// Prefixed to raw hrefs for the `hotsoon` layout
    pub site_origin: String,

    /// Id of the element that wraps the player
    pub media_container_id: String,

    /// Tag of the player element carrying `src`
    pub media_tag: String,

    /// Concurrent items; defaults to the number of available cores
    pub workers: Option<usize>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            main_page_url: "https://www.ixigua.com/home/6871015347/video".to_string(),
            output_dir: PathBuf::from("downloads"),
            layout: FeedLayout::Video,
            card_selector: r#"div[class="HorizontalFeedCard"]"#.to_string(),
            terminal_marker: "已经到底部，没有新的内容啦".to_string(),
            detail_url_template: "https://www.ixigua.com/embed?group_id={id}".to_string(),
            site_origin: "https://www.ixigua.com".to_string(),
            media_container_id: "vs".to_string(),
            media_tag: "video".to_string(),
            workers: None,
        }
    }
}

impl CrawlConfig {
    /// Worker count, falling back to the host's available parallelism
    pub fn workers(&self) -> usize {
        self.workers
            .filter(|w| *w > 0)
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            })
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one the default path is used,
    /// and a commented default file is created there if missing.
    /// Missing fields in the config file will use default values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default_path = Self::default_config_path()?;
                if !default_path.exists() {
                    Self::create_default_config(&default_path)?;
                    return Ok(Self::default());
                }
                default_path
            }
        };

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/vidharvest/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("vidharvest").join("config.toml"))
    }

    /// Check settings that can only be verified at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.crawl.output_dir.is_dir() {
            return Err(ConfigError::MissingOutputDir(self.crawl.output_dir.clone()));
        }
        if self.crawl.layout == FeedLayout::Video
            && !self.crawl.detail_url_template.contains("{id}")
        {
            return Err(ConfigError::Invalid(
                "crawl.detail_url_template must contain {id}".to_string(),
            ));
        }
        Ok(())
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# vidharvest configuration

[crawl]
# Profile page whose videos are downloaded
main_page_url = "https://www.ixigua.com/home/6871015347/video"

# Must already exist; videos are written directly into it
output_dir = "downloads"

# "video": long-video tab, files named <title>.mp4
# "hotsoon": short-video tab, files named <id>.mp4
layout = "video"

# One feed card on the profile page
card_selector = 'div[class="HorizontalFeedCard"]'

# Shown by the feed once scrolling loads nothing more
terminal_marker = "已经到底部，没有新的内容啦"

# Detail page for the video layout ({id} is the item id)
detail_url_template = "https://www.ixigua.com/embed?group_id={id}"

# Prefix for card hrefs in the hotsoon layout
site_origin = "https://www.ixigua.com"

# The player is <media_tag src=...> inside the element with this id
media_container_id = "vs"
media_tag = "video"

# Items processed at once (default: number of CPU cores)
# workers = 4

[scraper]
# Run browser in headless mode (no visible window)
headless = true

# Browser binary (default: auto-detect Chrome/Chromium)
# chrome_executable = "/usr/bin/chromium"

# Hide the automation flag from page scripts
hide_automation = true

# Polling budget per page in milliseconds
timeout_ms = 60000

# Wait between polls is max(min, random * factor) seconds
feed_min_wait_secs = 3.0
feed_wait_factor = 5.0
detail_min_wait_secs = 5.0
detail_wait_factor = 10.0

[download]
# Scheme given to protocol-relative (//host/...) media URLs
scheme = "https"

# Connection timeout in seconds
connect_timeout_secs = 30
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Output directory {0} does not exist")]
    MissingOutputDir(PathBuf),

    #[error("{0}")]
    Invalid(String),
}
