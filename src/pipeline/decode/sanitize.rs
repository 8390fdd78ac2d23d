//! Raw reply sanitization.
//!
//! Two token classes are trust-boundary metadata the model must never be
//! allowed to emit as content: reasoning blocks and gap annotations. The
//! gap regex mirrors the annotator grammar exactly; each match becomes a
//! single newline so multi-sentence replies keep their paragraph breaks.
//! `sanitize` is idempotent.

use std::sync::LazyLock;

use regex::Regex;

static THINK_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>.*?</think>").unwrap());

/// An opened but never closed reasoning block swallows the rest of the
/// reply; a truncated stream must not leak half a reasoning trace.
static THINK_TAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>.*\z").unwrap());

static GAP_ANNOTATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\((?:(?:today|yesterday|\d{4}-\d{2}-\d{2}) (?:dawn|morning|forenoon|noon|afternoon|evening|late night) \d{2}:\d{2}, )?\d+ (?:second|minute|hour|day)s?(?: \d+ minutes?)? later\)",
    )
    .unwrap()
});

static NEWLINE_PADDING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]*\n[ \t]*").unwrap());

/// Strip reasoning blocks and gap-annotation mimicry from raw model text.
pub fn sanitize(raw: &str) -> String {
    let mut text = raw.to_string();

    // Removing a block can butt two halves of a marker together, so run
    // to a fixpoint. Each pass shrinks the text; termination is bounded.
    loop {
        let next = THINK_BLOCK_RE.replace_all(&text, "").into_owned();
        if next == text {
            break;
        }
        text = next;
    }
    text = THINK_TAIL_RE.replace_all(&text, "").into_owned();
    text = GAP_ANNOTATION_RE.replace_all(&text, "\n").into_owned();
    text = NEWLINE_PADDING_RE.replace_all(&text, "\n").into_owned();
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::encode::timegap::gap_phrase;

    // ====== REASONING BLOCKS ======

    #[test]
    fn think_block_is_removed_entirely() {
        assert_eq!(
            sanitize("hello <think>I should be warm</think>there"),
            "hello there"
        );
    }

    #[test]
    fn multiline_think_block_is_removed() {
        assert_eq!(sanitize("<think>line one\nline two</think>ok"), "ok");
    }

    #[test]
    fn unterminated_think_swallows_the_tail() {
        assert_eq!(sanitize("sure!\n<think>now I will plan"), "sure!");
    }

    #[test]
    fn interleaved_blocks_cannot_reassemble_a_marker() {
        // Removing the inner block joins the outer halves into a new block.
        assert_eq!(sanitize("<th<think>x</think>ink>y</think>z"), "z");
    }

    // ====== GAP MIMICRY ======

    #[test]
    fn relative_gap_marker_becomes_a_newline() {
        assert_eq!(sanitize("missed you (5 minutes later) hi"), "missed you\nhi");
    }

    #[test]
    fn anchored_gap_marker_is_stripped() {
        let raw = "back (yesterday evening 21:04, 2 hours 10 minutes later) now";
        assert_eq!(sanitize(raw), "back\nnow");
    }

    #[test]
    fn dated_anchor_is_stripped() {
        let raw = "hello (2026-07-01 forenoon 09:30, 3 days later)";
        assert_eq!(sanitize(raw), "hello");
    }

    #[test]
    fn ordinary_parentheses_survive() {
        assert_eq!(sanitize("see you later (maybe)"), "see you later (maybe)");
    }

    #[test]
    fn every_annotator_phrase_is_recognized() {
        let now = 1_700_000_000_000;
        for gap in [
            15_000,
            125_000,
            3_661_000,
            2 * 3_600_000,
            86_400_000,
            3 * 86_400_000,
        ] {
            let phrase = gap_phrase(gap, now, now).unwrap();
            let sanitized = sanitize(&format!("hi {phrase} there"));
            assert_eq!(sanitized, "hi\nthere", "phrase not stripped: {phrase}");
        }
    }

    // ====== IDEMPOTENCE ======

    #[test]
    fn sanitize_is_idempotent() {
        for raw in [
            "",
            "plain text",
            "a <think>b</think> c (3 minutes later) d",
            "<think>unterminated",
            "(today noon 12:00, 1 hour later)",
            "<th<think>x</think>ink>y</think>z",
        ] {
            let once = sanitize(raw);
            assert_eq!(sanitize(&once), once, "not idempotent on: {raw:?}");
        }
    }
}
