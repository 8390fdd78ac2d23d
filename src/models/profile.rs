use serde::{Deserialize, Serialize};

/// Per-conversation contact profile. Carries the metadata the encoder needs
/// for notice filtering; everything else about characters lives in the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub display_name: String,
    /// Contact-specific additions to the notice importance allow-list.
    pub extra_notice_keywords: Vec<String>,
}
