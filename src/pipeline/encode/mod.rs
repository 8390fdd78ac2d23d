//! Event→transcript encoder.
//!
//! `builder::build` runs the full pipeline: per-variant type projection,
//! turn-boundary gap annotation, then side-channel injection. Everything in
//! here is synchronous and pure; feed contents are resolved by the caller.

pub mod builder;
pub mod inject;
pub mod notice;
pub mod project;
pub mod timegap;

pub use builder::build;
pub use inject::{resolve_feeds, ContextFeed, FeedError, ResolvedFeed};
pub use project::{project, EncodeOptions};
