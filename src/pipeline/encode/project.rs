//! Type projection: one event → zero-or-one transcript entry.
//!
//! Pure per-variant rules. Filtered events (offline scene in online mode,
//! hidden card history, unimportant notices) yield `None`; malformed card
//! data degrades to a generic phrase, never an error.

use serde_json::Value;

use crate::config::PAYMENT_VALIDITY_MS;
use crate::models::enums::{ForwardedKind, JudgmentKind, PaymentStatus, Role, Scene};
use crate::models::{CallTurn, Event, EventPayload, ForwardedTurn, TranscriptEntry};

use super::notice::is_important_notice;

/// Caller-supplied knobs for one `build` pass.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    pub scene_mode: Scene,
    pub hide_card_history: bool,
    pub include_time_gaps: bool,
    /// Wall-clock of the build, epoch milliseconds. Drives payment expiry
    /// and the today/yesterday wording of time anchors.
    pub now_ms: i64,
    pub extra_notice_keywords: Vec<String>,
}

impl EncodeOptions {
    /// Online-mode defaults: gaps annotated, card history hidden.
    pub fn online(now_ms: i64) -> Self {
        Self {
            scene_mode: Scene::Online,
            hide_card_history: true,
            include_time_gaps: true,
            now_ms,
            extra_notice_keywords: Vec::new(),
        }
    }
}

/// Project one event into at most one transcript entry.
pub fn project(event: &Event, opts: &EncodeOptions) -> Option<TranscriptEntry> {
    // Online transcripts never see raw offline content; only the
    // summarized offline event is eligible.
    if opts.scene_mode == Scene::Online
        && event.scene == Scene::Offline
        && !event.is_offline_summary()
    {
        return None;
    }

    if let Some(original) = &event.recalled {
        return Some(TranscriptEntry::new(
            event.direction.role(),
            format!("[Recalled a message: \"{original}\"]"),
            event.timestamp_ms,
        ));
    }

    let role = event.direction.role();
    let ts = event.timestamp_ms;

    match &event.payload {
        EventPayload::Text { text } => Some(TranscriptEntry::new(role, text.clone(), ts)),

        EventPayload::SystemNotice { text } => {
            if is_important_notice(text, &opts.extra_notice_keywords) {
                Some(TranscriptEntry::new(Role::System, text.clone(), ts))
            } else {
                tracing::debug!(event_id = event.id, "dropping unimportant system notice");
                None
            }
        }

        EventPayload::Transfer {
            amount,
            note,
            status,
        } => {
            let text = if note.is_empty() {
                format!("[Transfer of {amount:.2} ({})]", status.as_str())
            } else {
                format!("[Transfer of {amount:.2}: {note} ({})]", status.as_str())
            };
            Some(TranscriptEntry::new(role, text, ts))
        }

        EventPayload::PaymentRequest {
            item,
            amount,
            status,
            created_at_ms,
        } => {
            // Expiry is derived at projection time; the stored status stays
            // pending.
            let expired = *status == PaymentStatus::Pending
                && opts.now_ms - created_at_ms > PAYMENT_VALIDITY_MS;
            let word = if expired { "expired" } else { status.as_str() };
            Some(TranscriptEntry::new(
                role,
                format!("[Payment request: {item}, {amount:.2} ({word})]"),
                ts,
            ))
        }

        EventPayload::Voice { transcribed_text } => Some(TranscriptEntry::new(
            role,
            format!("[Voice message: {transcribed_text}]"),
            ts,
        )),

        EventPayload::Location { name, address } => Some(TranscriptEntry::new(
            role,
            format!("[Location: {name} - {address}]"),
            ts,
        )),

        EventPayload::Photo {
            description,
            image_ref,
        } => {
            let mut entry =
                TranscriptEntry::new(role, format!("[Sent a photo: {description}]"), ts);
            // Only outbound photos may carry an attachment downstream.
            if role == Role::User {
                entry.image_ref = image_ref.clone();
            }
            Some(entry)
        }

        EventPayload::Emoji { description } => Some(TranscriptEntry::new(
            role,
            format!("[Sticker: {description}]"),
            ts,
        )),

        EventPayload::TheatreCard {
            template_id,
            raw_data,
        } => {
            if opts.hide_card_history {
                return None;
            }
            Some(TranscriptEntry::new(
                role,
                card_phrase(template_id, raw_data),
                ts,
            ))
        }

        EventPayload::Judgment { kind, content } => {
            let role = match kind {
                JudgmentKind::Request => Role::User,
                JudgmentKind::Response => Role::Assistant,
                _ => Role::System,
            };
            Some(TranscriptEntry::new(role, content.clone(), ts))
        }

        EventPayload::VideoCallRecord {
            duration_sec,
            turns,
        } => Some(TranscriptEntry::new(
            Role::System,
            call_record_text(*duration_sec, turns),
            ts,
        )),

        EventPayload::ForwardedChat { title, turns } => Some(TranscriptEntry::new(
            role,
            forwarded_chat_text(title, turns),
            ts,
        )),
    }
}

/// Natural-language paraphrase of a theatre card, keyed by template id.
///
/// Deliberately avoids any bracket/tag syntax so the model never learns the
/// card's machine-structured form. Unknown templates and unparseable
/// `raw_data` fall back to generic phrases.
fn card_phrase(template_id: &str, raw_data: &str) -> String {
    let data: Value = serde_json::from_str(raw_data).unwrap_or(Value::Null);
    let field = |key: &str| data.get(key).and_then(Value::as_str).map(str::to_string);

    match template_id {
        "poll" => match field("title") {
            Some(t) => format!("Started a poll: {t}"),
            None => "Started a poll".to_string(),
        },
        "payment-success" => match data.get("amount").and_then(Value::as_f64) {
            Some(a) => format!("Shared a payment receipt of {a:.2}"),
            None => "Shared a payment receipt".to_string(),
        },
        "red-packet" => match field("blessing") {
            Some(b) => format!("Sent a red packet: {b}"),
            None => "Sent a red packet".to_string(),
        },
        "feed-post" => match field("excerpt").or_else(|| field("text")) {
            Some(t) => format!("Shared a feed post: {t}"),
            None => "Shared a feed post".to_string(),
        },
        "weather" => match field("city") {
            Some(c) => format!("Shared the weather for {c}"),
            None => "Shared a weather card".to_string(),
        },
        "forwarded-chat" => match field("title") {
            Some(t) => format!("Shared a forwarded chat: {t}"),
            None => "Shared a forwarded chat".to_string(),
        },
        "generic-card" => match field("title") {
            Some(t) => format!("Sent a card: {t}"),
            None => "Sent a card".to_string(),
        },
        "checklist" => match field("title") {
            Some(t) => format!("Shared a checklist: {t}"),
            None => "Shared a checklist".to_string(),
        },
        _ => "Sent an interactive card".to_string(),
    }
}

/// Reconstruct a recorded call as a labeled dialogue transcript.
fn call_record_text(duration_sec: u32, turns: &[CallTurn]) -> String {
    let mut text = format!(
        "[Video call record - duration {}m{}s]\nCall transcript:",
        duration_sec / 60,
        duration_sec % 60
    );
    for turn in turns {
        text.push('\n');
        if turn.narration {
            text.push_str(&format!("(narration) {}", turn.text));
        } else {
            text.push_str(&format!("{}: {}", turn.speaker, turn.text));
        }
    }
    text
}

/// Reconstruct a forwarded chat bundle as `sender: text` lines, with
/// non-text turns replaced by a placeholder tag.
fn forwarded_chat_text(title: &str, turns: &[ForwardedTurn]) -> String {
    let mut text = format!("[Forwarded chat: {title}]");
    for turn in turns {
        let body = match turn.kind {
            ForwardedKind::Text => turn.text.as_str(),
            ForwardedKind::Photo => "[photo]",
            ForwardedKind::Voice => "[voice]",
            ForwardedKind::Location => "[location]",
            ForwardedKind::Card => "[card]",
        };
        text.push_str(&format!("\n{}: {}", turn.sender, body));
    }
    text
}
