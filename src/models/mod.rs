//! Data models for Tusk

mod link;
mod post;

pub use link::Link;
pub use post::{MediaAttachment, MediaType, Post};
