pub mod item;
pub mod layout;

pub use item::{ItemDescriptor, ResolvedLink};
pub use layout::FeedLayout;
