pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "vidharvest")]
#[command(about = "Download every video listed on a script-rendered profile feed", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/vidharvest/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Feed page to scrape
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Existing directory to save videos in
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Number of items processed in parallel
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    /// Chrome/Chromium binary
    #[arg(long, global = true)]
    pub chrome: Option<PathBuf>,

    /// Show the browser window
    #[arg(long, global = true)]
    pub headful: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download every video on the feed
    Run,
    /// List the feed's items without downloading
    List,
    /// Resolve one item's media URL
    Resolve {
        /// Item id (e.g. 6812345678), or a card href as printed by `list`
        id: String,
    },
}

impl Cli {
    /// Apply command-line overrides on top of the loaded config
    pub fn apply(&self, config: &mut Config) {
        if let Some(ref url) = self.url {
            config.crawl.main_page_url = url.clone();
        }
        if let Some(ref output) = self.output {
            config.crawl.output_dir = output.clone();
        }
        if let Some(workers) = self.workers {
            config.crawl.workers = Some(workers);
        }
        if let Some(ref chrome) = self.chrome {
            config.scraper.chrome_executable = Some(chrome.clone());
        }
        if self.headful {
            config.scraper.headless = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply() {
        let cli = Cli::parse_from([
            "vidharvest",
            "--url",
            "https://example.com/u/2",
            "-o",
            "/tmp/out",
            "-w",
            "3",
            "--headful",
            "run",
        ]);
        let mut config = Config::default();
        cli.apply(&mut config);

        assert_eq!(config.crawl.main_page_url, "https://example.com/u/2");
        assert_eq!(config.crawl.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.crawl.workers(), 3);
        assert!(!config.scraper.headless);
        assert!(matches!(cli.command, Commands::Run));
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let cli = Cli::parse_from(["vidharvest", "list"]);
        let mut config = Config::default();
        cli.apply(&mut config);
        assert_eq!(config.crawl.output_dir, PathBuf::from("downloads"));
        assert!(config.scraper.headless);
    }

    #[test]
    fn test_resolve_takes_id() {
        let cli = Cli::parse_from(["vidharvest", "resolve", "6812345678"]);
        assert!(matches!(cli.command, Commands::Resolve { ref id } if id == "6812345678"));
    }
}
