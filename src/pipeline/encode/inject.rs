//! Side-channel feed injection.
//!
//! Background feeds (social posts, personal updates) are folded into a
//! single system entry and spliced at the head of the transcript. Each
//! block carries the marker of the feed that produced it; a feed whose
//! marker is already present anywhere in the transcript is skipped, so
//! re-encoding the same history never duplicates a block.

use thiserror::Error;
use tracing::debug;

use crate::models::enums::Role;
use crate::models::{FeedItem, FeedMarker, TranscriptEntry};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Feed unavailable: {0}")]
    Unavailable(String),
}

/// A source of background feed items. Implementations resolve their own
/// storage; the encoder only sees the resolved items.
pub trait ContextFeed {
    fn marker(&self) -> FeedMarker;
    fn recent_items(&self, window: usize) -> Result<Vec<FeedItem>, FeedError>;
}

/// A feed snapshot taken before encoding. Resolution happens outside the
/// pure pipeline so that `build` stays free of I/O.
#[derive(Debug, Clone)]
pub struct ResolvedFeed {
    pub marker: FeedMarker,
    pub items: Vec<FeedItem>,
}

/// Resolve every feed, dropping the ones that fail or come back empty.
/// A broken feed degrades the context, it never fails the encode.
pub fn resolve_feeds(feeds: &[&dyn ContextFeed], window: usize) -> Vec<ResolvedFeed> {
    let mut resolved = Vec::new();
    for feed in feeds {
        match feed.recent_items(window) {
            Ok(items) if items.is_empty() => {}
            Ok(items) => resolved.push(ResolvedFeed {
                marker: feed.marker(),
                items,
            }),
            Err(e) => {
                debug!(marker = ?feed.marker(), "Skipping feed: {e}");
            }
        }
    }
    resolved
}

/// Splice feed blocks at the head of the transcript, in the order the
/// feeds were resolved. Dedup is by marker identity, not text.
pub fn inject(entries: &mut Vec<TranscriptEntry>, feeds: &[ResolvedFeed]) {
    let mut blocks = Vec::new();
    for feed in feeds {
        if entries.iter().any(|e| e.marker == Some(feed.marker)) {
            continue;
        }
        let mut entry = TranscriptEntry::new(Role::System, &feed_block(feed), 0);
        entry.marker = Some(feed.marker);
        blocks.push(entry);
    }
    entries.splice(0..0, blocks);
}

fn feed_block(feed: &ResolvedFeed) -> String {
    let mut text = feed.marker.header().to_string();
    for item in &feed.items {
        text.push_str("\n- ");
        text.push_str(&item.text);
        let counts = count_clauses(item);
        if !counts.is_empty() {
            text.push_str(&format!(" ({})", counts.join(", ")));
        }
    }
    text
}

/// Non-zero counts only. An item with no images and no engagement reads
/// as bare text.
fn count_clauses(item: &FeedItem) -> Vec<String> {
    let mut clauses = Vec::new();
    if item.image_count > 0 {
        clauses.push(plural(item.image_count, "image"));
    }
    if item.like_count > 0 {
        clauses.push(plural(item.like_count, "like"));
    }
    if item.comment_count > 0 {
        clauses.push(plural(item.comment_count, "comment"));
    }
    clauses
}

fn plural(n: u32, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(text: &str, images: u32, likes: u32, comments: u32) -> FeedItem {
        FeedItem {
            text: text.to_string(),
            image_count: images,
            like_count: likes,
            comment_count: comments,
        }
    }

    fn social(items: Vec<FeedItem>) -> ResolvedFeed {
        ResolvedFeed {
            marker: FeedMarker::SocialPosts,
            items,
        }
    }

    struct FixedFeed {
        marker: FeedMarker,
        items: Vec<FeedItem>,
    }

    impl ContextFeed for FixedFeed {
        fn marker(&self) -> FeedMarker {
            self.marker
        }
        fn recent_items(&self, window: usize) -> Result<Vec<FeedItem>, FeedError> {
            Ok(self.items.iter().take(window).cloned().collect())
        }
    }

    struct BrokenFeed;

    impl ContextFeed for BrokenFeed {
        fn marker(&self) -> FeedMarker {
            FeedMarker::PersonalUpdates
        }
        fn recent_items(&self, _window: usize) -> Result<Vec<FeedItem>, FeedError> {
            Err(FeedError::Unavailable("store offline".into()))
        }
    }

    // ====== BLOCK FORMAT ======

    #[test]
    fn block_carries_header_and_items() {
        let feed = social(vec![
            item("Hiked the west ridge", 3, 12, 2),
            item("Quiet day", 0, 0, 0),
        ]);
        assert_eq!(
            feed_block(&feed),
            "Recent social feed (background, reference only):\n\
             - Hiked the west ridge (3 images, 12 likes, 2 comments)\n\
             - Quiet day"
        );
    }

    #[test]
    fn zero_counts_are_omitted_individually() {
        let feed = social(vec![item("New recipe", 1, 0, 4)]);
        let block = feed_block(&feed);
        assert!(block.contains("(1 image, 4 comments)"), "{block}");
        assert!(!block.contains("like"));
    }

    // ====== INJECTION ======

    #[test]
    fn blocks_splice_at_head_in_feed_order() {
        let mut entries = vec![TranscriptEntry::new(Role::User, "hi", 0)];
        let feeds = vec![
            social(vec![item("post", 0, 0, 0)]),
            ResolvedFeed {
                marker: FeedMarker::PersonalUpdates,
                items: vec![item("update", 0, 0, 0)],
            },
        ];
        inject(&mut entries, &feeds);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].marker, Some(FeedMarker::SocialPosts));
        assert_eq!(entries[1].marker, Some(FeedMarker::PersonalUpdates));
        assert_eq!(entries[2].text, "hi");
        assert_eq!(entries[0].role, Role::System);
    }

    #[test]
    fn marker_already_present_skips_that_feed_only() {
        let mut stale = TranscriptEntry::new(Role::System, "old block", 0);
        stale.marker = Some(FeedMarker::SocialPosts);
        let mut entries = vec![stale, TranscriptEntry::new(Role::User, "hi", 0)];

        let feeds = vec![
            social(vec![item("fresh post", 0, 0, 0)]),
            ResolvedFeed {
                marker: FeedMarker::PersonalUpdates,
                items: vec![item("update", 0, 0, 0)],
            },
        ];
        inject(&mut entries, &feeds);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].marker, Some(FeedMarker::PersonalUpdates));
        assert_eq!(entries[1].text, "old block");
    }

    #[test]
    fn injecting_twice_is_a_no_op() {
        let mut entries = vec![TranscriptEntry::new(Role::User, "hi", 0)];
        let feeds = vec![social(vec![item("post", 0, 0, 0)])];
        inject(&mut entries, &feeds);
        inject(&mut entries, &feeds);
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn no_feeds_leaves_transcript_untouched() {
        let mut entries = vec![TranscriptEntry::new(Role::User, "hi", 0)];
        inject(&mut entries, &[]);
        assert_eq!(entries.len(), 1);
    }

    // ====== RESOLUTION ======

    #[test]
    fn resolve_respects_window_and_drops_failures() {
        let good = FixedFeed {
            marker: FeedMarker::SocialPosts,
            items: vec![
                item("a", 0, 0, 0),
                item("b", 0, 0, 0),
                item("c", 0, 0, 0),
            ],
        };
        let resolved = resolve_feeds(&[&good, &BrokenFeed], 2);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].items.len(), 2);
        assert_eq!(resolved[0].marker, FeedMarker::SocialPosts);
    }

    #[test]
    fn empty_feed_resolves_to_nothing() {
        let empty = FixedFeed {
            marker: FeedMarker::SocialPosts,
            items: vec![],
        };
        assert!(resolve_feeds(&[&empty], 5).is_empty());
    }
}
