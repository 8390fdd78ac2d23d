//! Encoder orchestration.
//!
//! Fixed stage order: project each event, keep only the latest photo
//! attachment, annotate turn boundaries, then inject feed blocks.
//! Annotation runs before injection so synthetic feed entries never enter
//! the role-switch cursor.

use crate::models::{Event, TranscriptEntry};

use super::inject::{inject, ResolvedFeed};
use super::project::{project, EncodeOptions};
use super::timegap::annotate;

/// Encode a full event history into a model-ready transcript.
pub fn build(
    events: &[Event],
    feeds: &[ResolvedFeed],
    opts: &EncodeOptions,
) -> Vec<TranscriptEntry> {
    let mut entries: Vec<TranscriptEntry> =
        events.iter().filter_map(|e| project(e, opts)).collect();

    restrict_to_latest_photo(&mut entries);

    if opts.include_time_gaps {
        annotate(&mut entries, opts.now_ms);
    }
    inject(&mut entries, feeds);
    entries
}

/// Only the most recent photo keeps its attachment; older entries keep
/// their textual description but lose the image reference. One image per
/// request bounds the payload the completion client has to carry.
fn restrict_to_latest_photo(entries: &mut [TranscriptEntry]) {
    let last = entries.iter().rposition(|e| e.image_ref.is_some());
    if let Some(last) = last {
        for entry in &mut entries[..last] {
            entry.image_ref = None;
        }
    }
}
