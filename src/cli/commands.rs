use crate::app::{AppContext, HarvestError, Result};
use crate::domain::{FeedLayout, ItemDescriptor};
use crate::pipeline;

pub async fn run(ctx: &AppContext) -> Result<()> {
    ctx.config.validate()?;

    println!(
        "Harvesting {} into {} with {} workers...",
        ctx.config.crawl.main_page_url,
        ctx.config.crawl.output_dir.display(),
        ctx.pool.workers()
    );

    let report = pipeline::harvest(ctx).await?;

    println!(
        "Harvest complete: {} items, {} saved, {} failed",
        report.total, report.succeeded, report.failed
    );
    Ok(())
}

pub async fn list_items(ctx: &AppContext) -> Result<()> {
    let items = pipeline::discover(ctx).await?;

    if items.is_empty() {
        println!("No items");
        return Ok(());
    }

    for (index, item) in items.iter().enumerate() {
        match item {
            Ok(item) => println!(
                "{:>4}  {}  {}\n      {}",
                index + 1,
                item.href,
                item.display_title(),
                ctx.resolver.detail_url(item)
            ),
            Err(e) => eprintln!("{:>4}  ! {}", index + 1, e),
        }
    }

    let valid = items.iter().filter(|i| i.is_ok()).count();
    println!("\n{} items, {} unusable", items.len(), items.len() - valid);
    Ok(())
}

pub async fn resolve_item(ctx: &AppContext, target: &str) -> Result<()> {
    let item = resolve_target(target, ctx.config.crawl.layout)?;
    println!("Resolving {}...", ctx.resolver.detail_url(&item));

    let link = ctx.resolver.resolve(&item).await?;
    match ctx.downloader.absolute_url(&link.media_url) {
        Ok(url) => println!("{}", url),
        Err(e) => {
            println!("{}", link.media_url);
            eprintln!("  ! {}", e);
        }
    }
    Ok(())
}

/// Item for a `resolve` argument: a bare id, or a card href as `list` prints it.
fn resolve_target(target: &str, layout: FeedLayout) -> Result<ItemDescriptor> {
    if target.starts_with('/') {
        return ItemDescriptor::from_anchor(target, "");
    }
    if layout == FeedLayout::Hotsoon {
        return Err(HarvestError::InvalidItem(format!(
            "{:?}: the hotsoon layout needs the card href, e.g. /i{}/",
            target, target
        )));
    }
    ItemDescriptor::from_id(target)
}
