//! Confluence API types.

mod content;
mod page;
mod space;

pub use content::ContentList;
pub use page::{Body, Links, Page, Storage, Version};
pub use space::{Space, SpacesResponse};
