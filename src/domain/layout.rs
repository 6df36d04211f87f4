use serde::{Deserialize, Serialize};

use crate::domain::item::{sanitize_file_stem, ItemDescriptor};

/// Which profile tab the feed page comes from.
///
/// The two tabs embed item links differently, so they build detail URLs and
/// file names differently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedLayout {
    /// Long-video tab: detail page is the embed player, files are named by title
    #[default]
    Video,
    /// Short-video tab: detail page is the href itself, files are named by id
    Hotsoon,
}

impl FeedLayout {
    /// Detail page URL for an item.
    ///
    /// `template` must contain `{id}`; `origin` is prefixed to raw hrefs.
    pub fn detail_url(&self, item: &ItemDescriptor, template: &str, origin: &str) -> String {
        match self {
            FeedLayout::Video => template.replace("{id}", &item.id),
            FeedLayout::Hotsoon => format!("{}{}", origin.trim_end_matches('/'), item.href),
        }
    }

    /// Output file name (`<stem>.mp4`) for an item
    pub fn file_name(&self, item: &ItemDescriptor) -> String {
        let stem = match self {
            FeedLayout::Video => item.display_title(),
            FeedLayout::Hotsoon => &item.id,
        };
        format!("{}.mp4", sanitize_file_stem(stem))
    }
}
