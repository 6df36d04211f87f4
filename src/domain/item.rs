use serde::{Deserialize, Serialize};

use crate::app::{HarvestError, Result};

/// One video card found on the feed page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDescriptor {
    pub id: String,
    pub title: String,
    /// Raw anchor href the id was derived from
    pub href: String,
}

impl ItemDescriptor {
    /// Build a descriptor from a card anchor's `href` and `title` attributes.
    ///
    /// Fails when the href yields no id; such cards are reported, never skipped.
    pub fn from_anchor(href: &str, title: &str) -> Result<Self> {
        let id = Self::derive_id(href).ok_or_else(|| {
            HarvestError::InvalidItem(format!("no item id in href {:?}", href))
        })?;

        Ok(Self {
            id,
            title: title.to_string(),
            href: href.to_string(),
        })
    }

    /// Build a descriptor for an id that is already known, with no card
    /// behind it.
    ///
    /// The id is taken as is; it does not go through [`Self::derive_id`].
    pub fn from_id(id: &str) -> Result<Self> {
        let id = id.trim();
        if id.is_empty() || id.contains('/') {
            return Err(HarvestError::InvalidItem(format!("not an item id: {:?}", id)));
        }

        Ok(Self {
            id: id.to_string(),
            title: String::new(),
            href: String::new(),
        })
    }

    /// Derive the item id embedded in an href.
    ///
    /// Hrefs look like `/6812345678901234567/`: every `/` is removed and the
    /// first remaining character is dropped.
    pub fn derive_id(href: &str) -> Option<String> {
        let stripped: String = href.chars().filter(|c| *c != '/').collect();
        let id: String = stripped.chars().skip(1).collect();
        (!id.is_empty()).then_some(id)
    }

    /// Title when present, otherwise the id
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.id
        } else {
            &self.title
        }
    }
}

/// A media URL resolved from an item's detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLink {
    pub item_id: String,
    pub media_url: String,
}

/// Turn an arbitrary title into a single path component.
pub fn sanitize_file_stem(stem: &str) -> String {
    stem.chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect()
}
