use ::scraper::{ElementRef, Html, Selector};

use crate::app::{HarvestError, Result};
use crate::domain::ItemDescriptor;

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| HarvestError::Selector {
        selector: selector.to_string(),
        reason: format!("{:?}", e),
    })
}

/// Pulls item cards out of rendered feed markup
#[derive(Debug, Clone)]
pub struct ItemLister {
    cards: Selector,
    anchor: Selector,
}

impl ItemLister {
    pub fn new(card_selector: &str) -> Result<Self> {
        Ok(Self {
            cards: parse_selector(card_selector)?,
            anchor: parse_selector("a")?,
        })
    }

    /// One entry per matched card, in document order.
    ///
    /// Cards without an anchor or a usable href come back as errors so the
    /// caller can report them alongside the real items.
    pub fn list(&self, markup: &str) -> Vec<Result<ItemDescriptor>> {
        let document = Html::parse_document(markup);

        document
            .select(&self.cards)
            .enumerate()
            .map(|(index, card)| self.describe(index, card))
            .collect()
    }

    fn describe(&self, index: usize, card: ElementRef<'_>) -> Result<ItemDescriptor> {
        let anchor = card
            .select(&self.anchor)
            .next()
            .ok_or_else(|| HarvestError::InvalidItem(format!("card #{} has no link", index)))?;

        let href = anchor
            .value()
            .attr("href")
            .ok_or_else(|| HarvestError::InvalidItem(format!("card #{} link has no href", index)))?;
        let title = anchor.value().attr("title").unwrap_or_default();

        ItemDescriptor::from_anchor(href, title)
    }
}

/// What a detail page currently shows for its media element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaLookup {
    MissingContainer,
    MissingMedia,
    MissingSource,
    Found(String),
}

/// Finds the media element (`<tag>` nested inside the element with a known id)
/// that the detail page's script inserts after load.
#[derive(Debug, Clone)]
pub struct MediaLocator {
    container_id: String,
    media_tag: String,
    container: Selector,
    media: Selector,
}

impl MediaLocator {
    pub fn new(container_id: &str, media_tag: &str) -> Result<Self> {
        Ok(Self {
            container_id: container_id.to_string(),
            media_tag: media_tag.to_string(),
            container: parse_selector(&format!("[id=\"{}\"]", container_id))?,
            media: parse_selector(media_tag)?,
        })
    }

    pub fn lookup(&self, markup: &str) -> MediaLookup {
        let document = Html::parse_document(markup);

        let Some(container) = document.select(&self.container).next() else {
            return MediaLookup::MissingContainer;
        };
        let Some(media) = container.select(&self.media).next() else {
            return MediaLookup::MissingMedia;
        };

        match media.value().attr("src") {
            Some(src) => MediaLookup::Found(src.to_string()),
            None => MediaLookup::MissingSource,
        }
    }

    /// Both the container and its media element exist
    pub fn is_hydrated(&self, markup: &str) -> bool {
        !matches!(
            self.lookup(markup),
            MediaLookup::MissingContainer | MediaLookup::MissingMedia
        )
    }

    pub fn container_label(&self) -> String {
        format!("#{}", self.container_id)
    }

    pub fn media_label(&self) -> String {
        format!("#{} {}", self.container_id, self.media_tag)
    }
}
