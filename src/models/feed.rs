use serde::{Deserialize, Serialize};

/// Identity tag for a side-channel feed. Injected transcript entries carry
/// their feed's marker so dedup can compare identity instead of searching
/// for a substring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedMarker {
    SocialPosts,
    PersonalUpdates,
}

impl FeedMarker {
    /// Header line of the folded system entry for this feed.
    pub fn header(&self) -> &'static str {
        match self {
            FeedMarker::SocialPosts => "Recent social feed (background, reference only):",
            FeedMarker::PersonalUpdates => "Recent personal updates (background, reference only):",
        }
    }
}

/// One item of an external feed, already resolved by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    pub text: String,
    pub image_count: u32,
    pub like_count: u32,
    pub comment_count: u32,
}
