use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::app::Result;
use crate::scraper::config::RenderPlan;
use crate::scraper::poll::{poll_until, PollOutcome, PollSchedule, Probe};
use crate::scraper::{BrowserSession, Key, SessionFactory};

/// Upper bound on shutting a session down
const CLOSE_TIMEOUT: Duration = Duration::from_secs(30);

/// Loads a page in a fresh browser session and polls its markup until a
/// stop condition holds or the plan's budget runs out.
#[derive(Clone)]
pub struct RenderPoller {
    sessions: Arc<dyn SessionFactory>,
}

impl RenderPoller {
    pub fn new(sessions: Arc<dyn SessionFactory>) -> Self {
        Self { sessions }
    }

    /// Render `url` until its markup contains `marker`.
    ///
    /// Used for lazily appended feeds that print a sentinel once nothing more
    /// will load.
    pub async fn render_until_marker(
        &self,
        url: &str,
        plan: &RenderPlan,
        marker: &str,
    ) -> Result<PollOutcome<String>> {
        self.render(url, plan, |markup: &str| markup.contains(marker))
            .await
    }

    /// Render `url` until `ready` accepts the markup.
    ///
    /// The wait interval is drawn once from the plan's jitter and reused for
    /// every iteration. The session is closed whichever way this returns.
    pub async fn render<F>(
        &self,
        url: &str,
        plan: &RenderPlan,
        ready: F,
    ) -> Result<PollOutcome<String>>
    where
        F: Fn(&str) -> bool + Send + Sync,
    {
        let interval = plan.jitter.draw();
        let mut session = self.sessions.open().await?;

        let outcome = drive(session.as_mut(), url, plan, interval, ready).await;

        match tokio::time::timeout(CLOSE_TIMEOUT, session.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Failed to close browser session for {}: {}", url, e),
            Err(_) => warn!(
                "Browser session for {} did not close within {:?}, abandoning it",
                url, CLOSE_TIMEOUT
            ),
        }

        outcome
    }
}

async fn drive<F>(
    session: &mut dyn BrowserSession,
    url: &str,
    plan: &RenderPlan,
    interval: Duration,
    ready: F,
) -> Result<PollOutcome<String>>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    debug!("Navigating to {} (poll every {:?})", url, interval);
    session.navigate(url).await?;

    if plan.settle {
        tokio::time::sleep(interval).await;
    }

    let mut probe = MarkupProbe {
        session,
        scroll: plan.scroll,
        ready,
    };
    let schedule = PollSchedule {
        interval,
        budget: plan.budget,
    };

    let outcome = poll_until(&mut probe, schedule).await?;
    if !outcome.is_found() {
        warn!(
            "Render budget of {:?} exhausted for {}, using last markup",
            plan.budget, url
        );
    }

    Ok(outcome)
}

struct MarkupProbe<'a, F> {
    session: &'a mut dyn BrowserSession,
    scroll: bool,
    ready: F,
}

#[async_trait]
impl<'a, F> Probe for MarkupProbe<'a, F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    type Output = String;

    async fn nudge(&mut self) -> Result<()> {
        if self.scroll {
            self.session.send_key(Key::End).await?;
        }
        Ok(())
    }

    async fn observe(&mut self) -> Result<String> {
        self.session.current_markup().await
    }

    fn is_ready(&self, observed: &String) -> bool {
        (self.ready)(observed)
    }
}
