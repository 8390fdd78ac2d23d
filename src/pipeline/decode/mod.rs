//! Reply→fragment decoder.
//!
//! `splitter::split` runs the full pipeline: sanitization, then
//! priority-ordered instruction extraction with a recursion bound, then
//! the line-split fallback. Total over arbitrary input; never panics.

pub mod extract;
pub mod sanitize;
pub mod splitter;

pub use sanitize::sanitize;
pub use splitter::split;
