//! Decoder orchestration and fallback splitting.

use crate::config::MAX_SPLIT_DEPTH;
use crate::models::Fragment;

use super::extract::RULES;
use super::sanitize::sanitize;

/// Decode a raw model reply into ordered fragments. Total: any input,
/// including empty and adversarial marker soups, terminates in the
/// line-split fallback.
pub fn split(raw: &str) -> Vec<Fragment> {
    let text = sanitize(raw);
    let mut out = Vec::new();
    split_depth(&text, 0, &mut out);
    out
}

/// One extraction step. First matching rule wins for the whole string;
/// handlers recurse through here with `depth + 1`.
pub(crate) fn split_depth(text: &str, depth: usize, out: &mut Vec<Fragment>) {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return;
    }
    if depth >= MAX_SPLIT_DEPTH {
        return fallback_lines(trimmed, out);
    }
    for rule in RULES {
        if (rule.matches)(trimmed) {
            return (rule.apply)(trimmed, depth, out);
        }
    }
    fallback_lines(trimmed, out);
}

/// One `Plain` fragment per trimmed non-empty line, order preserved.
pub(crate) fn fallback_lines(text: &str, out: &mut Vec<Fragment>) {
    for line in text.lines() {
        let line = line.trim();
        if !line.is_empty() {
            out.push(Fragment::Plain(line.to_string()));
        }
    }
}
