//! Turn-boundary gap annotation.
//!
//! A derived phrase describing elapsed time is appended to an entry only
//! when the speaking role changes. Annotating every message would teach the
//! model to fabricate these markers inside multi-message bursts; turn
//! boundaries convey pacing with minimal exposure. The grammar here is a
//! fixed contract: the decoder-side sanitizer strips exactly these forms.

use chrono::{Local, TimeZone, Timelike};

use crate::models::TranscriptEntry;

const SECOND_MS: i64 = 1_000;
const MINUTE_MS: i64 = 60 * SECOND_MS;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Single forward pass: append a gap phrase at each role switch. The
/// (prev role, prev timestamp) cursor lives only for the duration of the
/// call.
pub fn annotate(entries: &mut [TranscriptEntry], now_ms: i64) {
    let mut prev: Option<(crate::models::enums::Role, i64)> = None;
    for entry in entries.iter_mut() {
        if let Some((prev_role, prev_ts)) = prev {
            if entry.role != prev_role {
                if let Some(phrase) =
                    gap_phrase(entry.timestamp_ms - prev_ts, entry.timestamp_ms, now_ms)
                {
                    entry.text.push(' ');
                    entry.text.push_str(&phrase);
                }
            }
        }
        prev = Some((entry.role, entry.timestamp_ms));
    }
}

/// Tiered gap phrase. Division truncates; never rounds.
pub fn gap_phrase(gap_ms: i64, entry_ts_ms: i64, now_ms: i64) -> Option<String> {
    if gap_ms < 10 * SECOND_MS {
        return None;
    }
    if gap_ms < MINUTE_MS {
        return Some(format!("({} later)", count(gap_ms / SECOND_MS, "second")));
    }
    if gap_ms < HOUR_MS {
        return Some(format!("({} later)", count(gap_ms / MINUTE_MS, "minute")));
    }

    let anchor = time_anchor(entry_ts_ms, now_ms)?;
    if gap_ms < DAY_MS {
        let hours = count(gap_ms / HOUR_MS, "hour");
        let minutes = (gap_ms % HOUR_MS) / MINUTE_MS;
        if minutes == 0 {
            return Some(format!("({anchor}, {hours} later)"));
        }
        return Some(format!(
            "({anchor}, {hours} {} later)",
            count(minutes, "minute")
        ));
    }
    Some(format!("({anchor}, {} later)", count(gap_ms / DAY_MS, "day")))
}

fn count(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

/// Absolute wall-clock anchor for the entry: date word, period-of-day
/// bucket, and zero-padded clock time, all in local time.
fn time_anchor(ts_ms: i64, now_ms: i64) -> Option<String> {
    let ts = Local.timestamp_millis_opt(ts_ms).single()?;
    let now = Local.timestamp_millis_opt(now_ms).single()?;

    let date_word = if ts.date_naive() == now.date_naive() {
        "today".to_string()
    } else if ts.date_naive().succ_opt() == Some(now.date_naive()) {
        "yesterday".to_string()
    } else {
        ts.format("%Y-%m-%d").to_string()
    };

    Some(format!(
        "{date_word} {} {}",
        period_of_day(ts.hour()),
        ts.format("%H:%M")
    ))
}

/// Hour bucket of the local clock.
pub fn period_of_day(hour: u32) -> &'static str {
    match hour {
        0..=5 => "dawn",
        6..=8 => "morning",
        9..=11 => "forenoon",
        12..=13 => "noon",
        14..=17 => "afternoon",
        18..=21 => "evening",
        _ => "late night",
    }
}
