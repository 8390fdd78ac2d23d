use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{Direction, ForwardedKind, JudgmentKind, PaymentStatus, Scene, TransferStatus};

/// One immutable record in the append-only conversation log.
///
/// Events are created once by host-app actions; the only later mutation is
/// setting `recalled` to the original text of a withdrawn message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique, monotonically increasing within a conversation.
    pub id: i64,
    pub conversation_id: Uuid,
    pub direction: Direction,
    /// Partition tag: online-mode transcripts never see raw offline content.
    pub scene: Scene,
    /// Epoch milliseconds, non-decreasing across the log (duplicates allowed).
    pub timestamp_ms: i64,
    /// Original content of a recalled message, set post-hoc by the host app.
    pub recalled: Option<String>,
    pub payload: EventPayload,
}

/// Variant-specific event data. Exhaustive by construction: adding a variant
/// forces every projection site to handle it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    Text {
        text: String,
    },
    SystemNotice {
        text: String,
    },
    Transfer {
        amount: f64,
        note: String,
        status: TransferStatus,
    },
    PaymentRequest {
        item: String,
        amount: f64,
        status: PaymentStatus,
        created_at_ms: i64,
    },
    Voice {
        transcribed_text: String,
    },
    Location {
        name: String,
        address: String,
    },
    Photo {
        description: String,
        image_ref: Option<String>,
    },
    Emoji {
        description: String,
    },
    TheatreCard {
        template_id: String,
        raw_data: String,
    },
    Judgment {
        kind: JudgmentKind,
        content: String,
    },
    VideoCallRecord {
        duration_sec: u32,
        turns: Vec<CallTurn>,
    },
    ForwardedChat {
        title: String,
        turns: Vec<ForwardedTurn>,
    },
}

/// One turn of a recorded video call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallTurn {
    pub speaker: String,
    pub text: String,
    /// Narration turns are rendered as bracketed stage directions.
    pub narration: bool,
}

/// One line of a forwarded chat bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardedTurn {
    pub sender: String,
    pub kind: ForwardedKind,
    pub text: String,
}

impl Event {
    /// Whether this event is the summarized offline record that stays
    /// eligible for online-mode transcripts.
    pub fn is_offline_summary(&self) -> bool {
        matches!(
            self.payload,
            EventPayload::Judgment {
                kind: JudgmentKind::OfflineSummary,
                ..
            }
        )
    }
}
