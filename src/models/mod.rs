pub mod conversation;
pub mod enums;
pub mod event;
pub mod feed;
pub mod profile;
pub mod transcript;

pub use conversation::Conversation;
pub use event::{CallTurn, Event, EventPayload, ForwardedTurn};
pub use feed::{FeedItem, FeedMarker};
pub use profile::Profile;
pub use transcript::{Fragment, TranscriptEntry};
