use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("Browser session error: {0}")]
    Session(String),

    #[error("Item {item_id}: element {element} not found")]
    ElementNotFound { item_id: String, element: String },

    #[error("Item {item_id}: element {element} has no {attribute} attribute")]
    MissingAttribute {
        item_id: String,
        element: String,
        attribute: String,
    },

    #[error("Invalid feed item: {0}")]
    InvalidItem(String),

    #[error("Unsupported media source: [{0}]")]
    UnsupportedScheme(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<ConfigError> for HarvestError {
    fn from(e: ConfigError) -> Self {
        HarvestError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HarvestError>;
