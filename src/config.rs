use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Banter";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// How long a pending payment request stays valid before projection
/// reports it as expired (24 hours). The stored status is never mutated.
pub const PAYMENT_VALIDITY_MS: i64 = 24 * 60 * 60 * 1_000;

/// How many recent items each side-channel feed contributes.
pub const FEED_WINDOW: usize = 5;

/// Recursion bound for instruction extraction; past this the remainder
/// is line-split as plain content.
pub const MAX_SPLIT_DEPTH: usize = 16;

/// Get the application data directory
/// ~/Banter/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Banter")
}

/// Get the conversation database path
pub fn database_path() -> PathBuf {
    app_data_dir().join("banter.db")
}

/// Default tracing filter when RUST_LOG is unset
pub fn default_log_filter() -> &'static str {
    "info"
}
