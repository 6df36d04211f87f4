//! # vidharvest
//!
//! Downloads every video listed on a profile feed whose content is rendered
//! client-side and appended lazily on scroll.
//!
//! ## Architecture
//!
//! ```text
//! RenderPoller (feed) → ItemLister → WorkerPool ┬ LinkResolver → Downloader
//!                                               ├ LinkResolver → Downloader
//!                                               └ ...
//! ```
//!
//! The feed page is driven in a real browser until its end marker appears,
//! each card becomes one unit of work, and every worker renders the item's
//! detail page in its own browser session until the player element hydrates
//! before streaming the media file to disk.
//!
//! ## Quick Start
//!
//! ```bash
//! # List what the feed contains
//! vidharvest --url https://www.ixigua.com/home/6871015347/video list
//!
//! # Download everything into ./downloads
//! vidharvest -o downloads run
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together all components:
/// poller, lister, resolver, downloader, pool.
pub mod app;

/// Command-line interface using clap.
///
/// - `run` - Download every video on the feed
/// - `list` - List the feed's items
/// - `resolve <id>` - Resolve one item's media URL
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/vidharvest/config.toml` with `[crawl]`,
/// `[scraper]` and `[download]` sections.
pub mod config;

/// Core domain models.
///
/// - [`ItemDescriptor`](domain::ItemDescriptor): One card on the feed
/// - [`ResolvedLink`](domain::ResolvedLink): An item's media URL
/// - [`FeedLayout`](domain::FeedLayout): Tab-specific URL and file naming
pub mod domain;

/// Downloading and concurrency.
///
/// - [`Downloader`](fetcher::Downloader): Streams protocol-relative media URLs to disk
/// - [`WorkerPool`](fetcher::WorkerPool): Bounded pool with a completion barrier
pub mod fetcher;

/// End-to-end harvest: feed discovery and the per-item job.
pub mod pipeline;

/// Browser-driven rendering and extraction.
///
/// - [`RenderPoller`](scraper::RenderPoller): Poll a page until a stop condition holds
/// - [`ItemLister`](scraper::ItemLister): Feed cards from markup
/// - [`LinkResolver`](scraper::LinkResolver): Media URL from a detail page
/// - [`ChromeSessionFactory`](scraper::ChromeSessionFactory): chromiumoxide sessions
pub mod scraper;
