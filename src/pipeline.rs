use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::app::{AppContext, Result};
use crate::domain::{FeedLayout, ItemDescriptor};
use crate::fetcher::{Downloader, PoolReport};
use crate::scraper::LinkResolver;

/// Render the feed page and list its cards.
///
/// If the end-of-feed marker never shows up, whatever loaded within the
/// budget is listed.
pub async fn discover(ctx: &AppContext) -> Result<Vec<Result<ItemDescriptor>>> {
    let crawl = &ctx.config.crawl;
    info!("Rendering feed {}", crawl.main_page_url);

    let outcome = ctx
        .poller
        .render_until_marker(
            &crawl.main_page_url,
            &ctx.config.scraper.feed_plan(),
            &crawl.terminal_marker,
        )
        .await?;

    if !outcome.is_found() {
        warn!("Feed did not reach its end marker, listing what loaded");
    }

    let items = ctx.lister.list(outcome.as_inner());
    info!("Found {} items", items.len());
    Ok(items)
}

/// Resolve-then-download for a single item
#[derive(Clone)]
pub struct ItemJob {
    resolver: Arc<LinkResolver>,
    downloader: Arc<Downloader>,
    layout: FeedLayout,
    output_dir: PathBuf,
}

impl ItemJob {
    pub fn from_context(ctx: &AppContext) -> Self {
        Self {
            resolver: ctx.resolver.clone(),
            downloader: ctx.downloader.clone(),
            layout: ctx.config.crawl.layout,
            output_dir: ctx.config.crawl.output_dir.clone(),
        }
    }

    /// Returns the path written. Two items with the same file name overwrite
    /// each other; the last one to finish wins.
    pub async fn run(&self, item: Result<ItemDescriptor>) -> Result<PathBuf> {
        let item = item?;
        let link = self.resolver.resolve(&item).await?;
        info!("Item {} resolved to {}", item.id, link.media_url);

        let dest = self.output_dir.join(self.layout.file_name(&item));
        let bytes = self.downloader.download(&link.media_url, &dest).await?;
        info!("Saved {} ({} bytes)", dest.display(), bytes);

        Ok(dest)
    }
}

/// Process every item on the worker pool and wait for all of them.
pub async fn run_items(ctx: &AppContext, items: Vec<Result<ItemDescriptor>>) -> PoolReport {
    let job = ItemJob::from_context(ctx);

    ctx.pool
        .run_all(items, move |item| {
            let job = job.clone();
            async move { job.run(item).await.map(|_| ()) }
        })
        .await
}

/// Discover the feed's items and download all of them.
pub async fn harvest(ctx: &AppContext) -> Result<PoolReport> {
    let items = discover(ctx).await?;
    Ok(run_items(ctx, items).await)
}
