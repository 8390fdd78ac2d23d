//! Priority-ordered instruction extraction.
//!
//! Each embedded instruction is a (matcher, handler) pair; the table is
//! walked top to bottom and the first match wins for the whole string.
//! Handlers re-enter the splitter for the remainders they produce, except
//! where a rule deliberately emits its neighbors verbatim. Rules are
//! unit-testable in isolation and reorderable only by editing the table.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::Fragment;

use super::splitter::{fallback_lines, split_depth};

pub const VIDEO_CALL_MARKER: &str = "[video call]";

static DOC_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<!doctype html|<html[\s>]").unwrap());

static BUSY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\[busy:\s*.*\]$").unwrap());

static CARD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[card\].*?\[/card\]").unwrap());

static DRAW_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[draw:[^\]]*\]").unwrap());

static PARAGRAPH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());

pub struct Rule {
    pub name: &'static str,
    pub matches: fn(&str) -> bool,
    pub apply: fn(&str, usize, &mut Vec<Fragment>),
}

/// Priority order is part of the contract: a busy notice inside a
/// document stays part of the document, a draw instruction inside a card
/// stays part of the card.
pub const RULES: &[Rule] = &[
    Rule {
        name: "raw_document",
        matches: is_document,
        apply: apply_document,
    },
    Rule {
        name: "busy_notice",
        matches: is_busy_notice,
        apply: apply_busy_notice,
    },
    Rule {
        name: "theatre_block",
        matches: has_card_block,
        apply: apply_card_block,
    },
    Rule {
        name: "draw_instruction",
        matches: has_draw_instruction,
        apply: apply_draw_instruction,
    },
    Rule {
        name: "video_call_opening",
        matches: has_video_call_marker,
        apply: apply_video_call,
    },
];

// ====== RAW DOCUMENT ======

fn is_document(text: &str) -> bool {
    DOC_OPEN_RE.is_match(text) && text.to_lowercase().contains("</html>")
}

/// A complete markup document is one bubble, embedded newlines included.
fn apply_document(text: &str, _depth: usize, out: &mut Vec<Fragment>) {
    out.push(Fragment::RawDocument(text.trim().to_string()));
}

// ====== BUSY NOTICE ======

/// A busy notice is by convention never mixed with other content, so the
/// bracket expression must span the whole input.
fn is_busy_notice(text: &str) -> bool {
    BUSY_RE.is_match(text.trim())
}

fn apply_busy_notice(text: &str, _depth: usize, out: &mut Vec<Fragment>) {
    out.push(Fragment::BusyNotice(text.trim().to_string()));
}

// ====== THEATRE BLOCK ======

fn has_card_block(text: &str) -> bool {
    CARD_RE.is_match(text)
}

fn apply_card_block(text: &str, depth: usize, out: &mut Vec<Fragment>) {
    let m = match CARD_RE.find(text) {
        Some(m) => m,
        None => return fallback_lines(text, out),
    };
    split_depth(&text[..m.start()], depth + 1, out);
    out.push(Fragment::HtmlTheatreBlock(m.as_str().to_string()));
    split_depth(&text[m.end()..], depth + 1, out);
}

// ====== DRAW INSTRUCTION ======

fn has_draw_instruction(text: &str) -> bool {
    DRAW_RE.is_match(text)
}

/// At most three fragments: before, instruction, after. The neighbors are
/// emitted verbatim rather than line-split, which caps the bubble count
/// around a drawing.
fn apply_draw_instruction(text: &str, _depth: usize, out: &mut Vec<Fragment>) {
    let m = match DRAW_RE.find(text) {
        Some(m) => m,
        None => return fallback_lines(text, out),
    };
    let before = text[..m.start()].trim();
    if !before.is_empty() {
        out.push(Fragment::Plain(before.to_string()));
    }
    out.push(Fragment::DrawInstruction(m.as_str().to_string()));
    let after = text[m.end()..].trim();
    if !after.is_empty() {
        out.push(Fragment::Plain(after.to_string()));
    }
}

// ====== VIDEO CALL OPENING ======

fn has_video_call_marker(text: &str) -> bool {
    text.contains(VIDEO_CALL_MARKER)
}

/// The first paragraph after the marker is the call opening and rides in
/// the same fragment; later paragraphs are ordinary chat lines.
fn apply_video_call(text: &str, _depth: usize, out: &mut Vec<Fragment>) {
    let at = match text.find(VIDEO_CALL_MARKER) {
        Some(at) => at,
        None => return fallback_lines(text, out),
    };
    fallback_lines(&text[..at], out);

    let after = &text[at + VIDEO_CALL_MARKER.len()..];
    let mut paragraphs = PARAGRAPH_RE.split(after);
    let opening = paragraphs.next().unwrap_or("").trim().to_string();
    out.push(Fragment::VideoCallOpening {
        marker: VIDEO_CALL_MARKER.to_string(),
        opening,
    });
    for paragraph in paragraphs {
        fallback_lines(paragraph, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ====== MATCHERS IN ISOLATION ======

    #[test]
    fn document_needs_both_open_and_close() {
        assert!(is_document("<!DOCTYPE html><html><body>x</body></html>"));
        assert!(is_document("<html>\n<p>hi</p>\n</html>"));
        assert!(!is_document("<html> never closed"));
        assert!(!is_document("plain </html> tail only"));
    }

    #[test]
    fn busy_notice_must_span_the_whole_input() {
        assert!(is_busy_notice("[busy: stepped out]"));
        assert!(is_busy_notice("[busy: stepped out,\nback in 10 min]"));
        assert!(!is_busy_notice("sure! [busy: stepped out]"));
        assert!(!is_busy_notice("[busy: stepped out] see you"));
    }

    #[test]
    fn draw_matcher_ignores_unclosed_brackets() {
        assert!(has_draw_instruction("ok [draw: a cat] done"));
        assert!(!has_draw_instruction("ok [draw: a cat with no close"));
    }

    // ====== HANDLERS IN ISOLATION ======

    #[test]
    fn draw_handler_caps_at_three_fragments() {
        let mut out = Vec::new();
        apply_draw_instruction("one\ntwo\n[draw: a cat]\nthree\nfour", 0, &mut out);
        assert_eq!(
            out,
            vec![
                Fragment::Plain("one\ntwo".to_string()),
                Fragment::DrawInstruction("[draw: a cat]".to_string()),
                Fragment::Plain("three\nfour".to_string()),
            ]
        );
    }

    #[test]
    fn video_call_merges_first_paragraph_only() {
        let mut out = Vec::new();
        apply_video_call(
            "let's talk\n[video call]\nhey, can you hear me?\n\nso anyway\nbye",
            0,
            &mut out,
        );
        assert_eq!(
            out,
            vec![
                Fragment::Plain("let's talk".to_string()),
                Fragment::VideoCallOpening {
                    marker: VIDEO_CALL_MARKER.to_string(),
                    opening: "hey, can you hear me?".to_string(),
                },
                Fragment::Plain("so anyway".to_string()),
                Fragment::Plain("bye".to_string()),
            ]
        );
    }

    #[test]
    fn bare_video_call_marker_has_empty_opening() {
        let mut out = Vec::new();
        apply_video_call("[video call]", 0, &mut out);
        assert_eq!(
            out,
            vec![Fragment::VideoCallOpening {
                marker: VIDEO_CALL_MARKER.to_string(),
                opening: String::new(),
            }]
        );
    }

    // ====== TABLE ORDER ======

    #[test]
    fn rule_order_is_the_documented_priority() {
        let names: Vec<&str> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "raw_document",
                "busy_notice",
                "theatre_block",
                "draw_instruction",
                "video_call_opening",
            ]
        );
    }
}
