use tracing::{debug, info};

use crate::app::{HarvestError, Result};
use crate::config::CrawlConfig;
use crate::domain::{FeedLayout, ItemDescriptor, ResolvedLink};
use crate::scraper::config::RenderPlan;
use crate::scraper::extractor::{MediaLocator, MediaLookup};
use crate::scraper::render::RenderPoller;

/// Turns an item into its real media URL by rendering the item's detail
/// page until the player element hydrates.
#[derive(Clone)]
pub struct LinkResolver {
    poller: RenderPoller,
    plan: RenderPlan,
    locator: MediaLocator,
    layout: FeedLayout,
    detail_url_template: String,
    site_origin: String,
}

impl LinkResolver {
    pub fn new(poller: RenderPoller, plan: RenderPlan, crawl: &CrawlConfig) -> Result<Self> {
        Ok(Self {
            poller,
            plan,
            locator: MediaLocator::new(&crawl.media_container_id, &crawl.media_tag)?,
            layout: crawl.layout,
            detail_url_template: crawl.detail_url_template.clone(),
            site_origin: crawl.site_origin.clone(),
        })
    }

    pub fn detail_url(&self, item: &ItemDescriptor) -> String {
        self.layout
            .detail_url(item, &self.detail_url_template, &self.site_origin)
    }

    /// Resolve the `src` of the item's media element.
    ///
    /// A page that never hydrates within the budget is not an error by
    /// itself; the final markup is inspected once more and a missing element
    /// or attribute is reported as such.
    pub async fn resolve(&self, item: &ItemDescriptor) -> Result<ResolvedLink> {
        let url = self.detail_url(item);
        info!("Resolving item {} via {}", item.id, url);

        let outcome = self
            .poller
            .render(&url, &self.plan, |markup: &str| {
                self.locator.is_hydrated(markup)
            })
            .await?;

        if !outcome.is_found() {
            debug!("Item {} never hydrated, checking last markup", item.id);
        }

        match self.locator.lookup(outcome.as_inner()) {
            MediaLookup::Found(media_url) => Ok(ResolvedLink {
                item_id: item.id.clone(),
                media_url,
            }),
            MediaLookup::MissingContainer => Err(HarvestError::ElementNotFound {
                item_id: item.id.clone(),
                element: self.locator.container_label(),
            }),
            MediaLookup::MissingMedia => Err(HarvestError::ElementNotFound {
                item_id: item.id.clone(),
                element: self.locator.media_label(),
            }),
            MediaLookup::MissingSource => Err(HarvestError::MissingAttribute {
                item_id: item.id.clone(),
                element: self.locator.media_label(),
                attribute: "src".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::time::Instant;

    use super::*;
    use crate::scraper::config::Jitter;
    use crate::scraper::fake::{FakeFactory, Script};

    const DETAIL: &str = "https://www.ixigua.com/embed?group_id=42";

    fn resolver(factory: Arc<FakeFactory>) -> LinkResolver {
        let plan = RenderPlan {
            jitter: Jitter::fixed(Duration::from_secs(5)),
            budget: Duration::from_secs(60),
            scroll: false,
            settle: false,
        };
        LinkResolver::new(RenderPoller::new(factory), plan, &CrawlConfig::default()).unwrap()
    }

    fn item() -> ItemDescriptor {
        ItemDescriptor::from_anchor("/i42/", "clip").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolves_late_media_element() {
        let factory = Arc::new(FakeFactory::new().with_page(
            DETAIL,
            Script::frames(&[
                "<div id=\"app\"></div>",
                "<div id=\"vs\"></div>",
                "<div id=\"vs\"><video src=\"//cdn.example.com/v.mp4\"></video></div>",
            ]),
        ));
        let stats = factory.stats.clone();

        let link = resolver(factory).resolve(&item()).await.unwrap();

        assert_eq!(
            link,
            ResolvedLink {
                item_id: "42".into(),
                media_url: "//cdn.example.com/v.mp4".into(),
            }
        );
        assert_eq!(stats.reads.load(Ordering::SeqCst), 3);
        assert_eq!(stats.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_container_after_budget_is_error() {
        let factory = Arc::new(FakeFactory::new().with_page(DETAIL, Script::constant("<div></div>")));
        let start = Instant::now();

        let err = resolver(factory).resolve(&item()).await.unwrap_err();

        match err {
            HarvestError::ElementNotFound { item_id, element } => {
                assert_eq!(item_id, "42");
                assert_eq!(element, "#vs");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(start.elapsed() >= Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_media_tag_is_error() {
        let factory = Arc::new(
            FakeFactory::new().with_page(DETAIL, Script::constant("<div id=\"vs\"><p></p></div>")),
        );

        let err = resolver(factory).resolve(&item()).await.unwrap_err();

        assert!(matches!(
            err,
            HarvestError::ElementNotFound { ref element, .. } if element == "#vs video"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_media_without_src_is_error() {
        let factory = Arc::new(
            FakeFactory::new().with_page(DETAIL, Script::constant("<div id=\"vs\"><video></video></div>")),
        );
        let start = Instant::now();

        let err = resolver(factory).resolve(&item()).await.unwrap_err();

        assert!(matches!(err, HarvestError::MissingAttribute { .. }));
        // Hydrated on the first poll, no need to wait out the budget
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[test]
    fn test_detail_url_follows_layout() {
        let factory = Arc::new(FakeFactory::new());
        let poller = RenderPoller::new(factory);
        let plan = crate::scraper::ScraperConfig::default().detail_plan();

        let video = LinkResolver::new(poller.clone(), plan, &CrawlConfig::default()).unwrap();
        assert_eq!(video.detail_url(&item()), DETAIL);

        let crawl = CrawlConfig {
            layout: FeedLayout::Hotsoon,
            ..Default::default()
        };
        let hotsoon = LinkResolver::new(poller, plan, &crawl).unwrap();
        assert_eq!(hotsoon.detail_url(&item()), "https://www.ixigua.com/i42/");
    }
}
