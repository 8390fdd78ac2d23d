use serde::{Deserialize, Serialize};

use super::enums::Role;
use super::feed::FeedMarker;

/// One role-tagged line of the encoded transcript. Derived and ephemeral:
/// never persisted, rebuilt from the event log on every send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: Role,
    pub text: String,
    /// Source event timestamp, carried for gap annotation only.
    pub timestamp_ms: i64,
    /// Image attachment reference, populated only for the latest outbound
    /// photo so the completion client can attach it.
    pub image_ref: Option<String>,
    /// Identity marker for injected side-channel entries; dedup compares
    /// this, never text content.
    pub marker: Option<FeedMarker>,
}

impl TranscriptEntry {
    pub fn new(role: Role, text: impl Into<String>, timestamp_ms: i64) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp_ms,
            image_ref: None,
            marker: None,
        }
    }
}

/// One typed unit of decoder output, eventually rendered as a message
/// bubble. Order-preserving relative to the source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Fragment {
    Plain(String),
    BusyNotice(String),
    DrawInstruction(String),
    HtmlTheatreBlock(String),
    VideoCallOpening { marker: String, opening: String },
    RawDocument(String),
}

impl Fragment {
    /// The literal text of the fragment as it should be stored or rendered.
    pub fn text(&self) -> String {
        match self {
            Fragment::Plain(t)
            | Fragment::BusyNotice(t)
            | Fragment::DrawInstruction(t)
            | Fragment::HtmlTheatreBlock(t)
            | Fragment::RawDocument(t) => t.clone(),
            Fragment::VideoCallOpening { marker, opening } => {
                if opening.is_empty() {
                    marker.clone()
                } else {
                    format!("{marker}\n{opening}")
                }
            }
        }
    }
}
