//! Importance allow-list for system notices.
//!
//! The host app emits a constant stream of UI chatter as SystemNotice
//! events. Only notices the model must react to (status changes,
//! relationship actions, notable operations) are projected into the
//! transcript; everything else is dropped. The keyword set is a fixed
//! contract: tests and the host renderer both rely on it.

/// Case-insensitive substrings that mark a system notice as important.
pub const IMPORTANT_NOTICE_KEYWORDS: &[&str] = &[
    // Intimacy / financial permissions granted or revoked
    "intimacy pay",
    "spending limit",
    "allowance",
    // Relationship-space changes
    "couple space",
    "relationship space",
    // Diary / journal events
    "diary",
    // Approvals, rejections, edits
    "approved",
    "rejected",
    "edited",
    // Call events and attempts
    "video call",
    "voice call",
    "missed call",
    "call ended",
    "tried to call",
    // Block / unblock
    "blocked",
    "unblocked",
    // Pats / nudges
    "patted",
    // Avatar, nickname, signature changes
    "avatar",
    "nickname",
    "signature",
    // Device-operation logs
    "logged in on",
    "new device",
    // Remark changes
    "remark",
    // Do-not-disturb, pin, special care settings
    "do not disturb",
    "pinned",
    "special care",
    // Photo-save events
    "saved your photo",
    "saved the photo",
    // Friend-request lifecycle
    "friend request",
    // Feed post / delete events
    "posted an update",
    "deleted an update",
];

/// Whether a system notice passes the importance filter. `extra` carries the
/// contact profile's own keywords.
pub fn is_important_notice(text: &str, extra: &[String]) -> bool {
    let lower = text.to_lowercase();
    IMPORTANT_NOTICE_KEYWORDS
        .iter()
        .any(|k| lower.contains(k))
        || extra.iter().any(|k| !k.is_empty() && lower.contains(&k.to_lowercase()))
}
