use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};
use chromiumoxide::Page;
use futures::StreamExt;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::app::{HarvestError, Result};
use crate::scraper::config::ScraperConfig;
use crate::scraper::{BrowserSession, Key, SessionFactory};

/// How long a closing browser process may take to exit
const EXIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Always passed to Chrome
const BASE_ARGS: &[&str] = &[
    "no-sandbox",
    "disable-gpu",
    "disable-dev-shm-usage",
    "disable-software-rasterizer",
];

/// chromiumoxide's default switches minus `enable-automation`, used when the
/// defaults are turned off to hide automation.
const QUIET_DEFAULT_ARGS: &[&str] = &[
    "disable-background-networking",
    "enable-features=NetworkService,NetworkServiceInProcess",
    "disable-background-timer-throttling",
    "disable-backgrounding-occluded-windows",
    "disable-breakpad",
    "disable-client-side-phishing-detection",
    "disable-component-extensions-with-background-pages",
    "disable-default-apps",
    "disable-features=TranslateUI",
    "disable-hang-monitor",
    "disable-ipc-flooding-protection",
    "disable-popup-blocking",
    "disable-prompt-on-repost",
    "disable-renderer-backgrounding",
    "disable-sync",
    "force-color-profile=srgb",
    "metrics-recording-only",
    "no-first-run",
    "password-store=basic",
    "use-mock-keychain",
    "lang=en_US",
];

/// Extra Chrome switches for a session, without the leading `--`.
fn launch_args(config: &ScraperConfig) -> Vec<&'static str> {
    let mut args = BASE_ARGS.to_vec();
    if config.hide_automation {
        args.extend_from_slice(QUIET_DEFAULT_ARGS);
        args.push("disable-blink-features=AutomationControlled");
    }
    args
}

/// Launches one Chrome process per session.
///
/// Every session runs in its own throwaway profile directory, so
/// concurrent workers never share cookies, cache or tabs.
pub struct ChromeSessionFactory {
    config: ScraperConfig,
}

impl ChromeSessionFactory {
    pub fn new(config: ScraperConfig) -> Self {
        Self { config }
    }

    fn browser_config(&self, profile: &TempDir) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .args(launch_args(&self.config))
            .user_data_dir(profile.path());

        // The built-in defaults include `--enable-automation`
        if self.config.hide_automation {
            builder = builder.disable_default_args();
        }

        if let Some(ref path) = self.config.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        if !self.config.headless {
            builder = builder.with_head();
        }

        builder
            .build()
            .map_err(|e| HarvestError::Session(format!("Failed to build browser config: {}", e)))
    }
}

#[async_trait]
impl SessionFactory for ChromeSessionFactory {
    async fn open(&self) -> Result<Box<dyn BrowserSession>> {
        let profile = tempfile::Builder::new().prefix("vidharvest-").tempdir()?;
        let browser_config = self.browser_config(&profile)?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            HarvestError::Session(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        // Spawn the browser handler
        let handler_task = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {
                // Handle browser events
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                abandon(browser, handler_task).await;
                return Err(HarvestError::Session(format!("Failed to create page: {}", e)));
            }
        };

        if let Some(ref ua) = self.config.user_agent {
            if let Err(e) = page.set_user_agent(ua).await {
                abandon(browser, handler_task).await;
                return Err(HarvestError::Session(format!("Failed to set user agent: {}", e)));
            }
        }

        Ok(Box::new(ChromeSession {
            browser,
            page,
            handler_task,
            _profile: profile,
        }))
    }
}

/// Tear down a browser that never became a session.
async fn abandon(mut browser: Browser, handler_task: JoinHandle<()>) {
    shutdown(&mut browser).await.ok();
    handler_task.abort();
}

/// Close `browser`, killing the process when the close request fails, and
/// wait a bounded time for it to exit.
async fn shutdown(browser: &mut Browser) -> Result<()> {
    let closed = browser
        .close()
        .await
        .map(|_| ())
        .map_err(|e| HarvestError::Session(format!("Failed to close browser: {}", e)));

    if closed.is_err() {
        if let Some(Err(e)) = browser.kill().await {
            warn!("Failed to kill browser process: {}", e);
        }
    }

    if tokio::time::timeout(EXIT_TIMEOUT, browser.wait()).await.is_err() {
        warn!("Browser process still running after {:?}", EXIT_TIMEOUT);
    }

    closed
}

struct ChromeSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    // Removed from disk when the session is dropped
    _profile: TempDir,
}

impl ChromeSession {
    fn key_event(kind: DispatchKeyEventType, key: Key) -> Result<DispatchKeyEventParams> {
        DispatchKeyEventParams::builder()
            .r#type(kind)
            .key(key.name())
            .code(key.name())
            .windows_virtual_key_code(key.key_code())
            .native_virtual_key_code(key.key_code())
            .build()
            .map_err(|e| HarvestError::Session(format!("Invalid key event: {}", e)))
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| HarvestError::Session(format!("Navigation to {} failed: {}", url, e)))?;
        Ok(())
    }

    async fn current_markup(&mut self) -> Result<String> {
        self.page
            .content()
            .await
            .map_err(|e| HarvestError::Session(format!("Failed to read page content: {}", e)))
    }

    async fn send_key(&mut self, key: Key) -> Result<()> {
        for kind in [DispatchKeyEventType::KeyDown, DispatchKeyEventType::KeyUp] {
            let event = Self::key_event(kind, key)?;
            self.page
                .execute(event)
                .await
                .map_err(|e| HarvestError::Session(format!("Failed to send {:?}: {}", key, e)))?;
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        let closed = shutdown(&mut self.browser).await;
        self.handler_task.abort();
        debug!("Browser session closed");
        closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(hide_automation: bool) -> ScraperConfig {
        ScraperConfig {
            hide_automation,
            ..Default::default()
        }
    }

    #[test]
    fn test_hidden_args_drop_enable_automation() {
        let args = launch_args(&config(true));
        assert!(!args.iter().any(|a| a.contains("enable-automation")));
        assert!(args.contains(&"disable-blink-features=AutomationControlled"));
        // Defaults that still matter once chromiumoxide's are switched off
        assert!(args.contains(&"no-first-run"));
        assert!(args.contains(&"no-sandbox"));
    }

    #[test]
    fn test_plain_args_leave_defaults_to_chromiumoxide() {
        let args = launch_args(&config(false));
        assert_eq!(args, BASE_ARGS);
        assert!(!args.iter().any(|a| a.contains("AutomationControlled")));
    }

    #[test]
    fn test_args_carry_no_dash_prefix() {
        for arg in launch_args(&config(true)) {
            assert!(!arg.starts_with('-'), "{}", arg);
        }
    }
}
