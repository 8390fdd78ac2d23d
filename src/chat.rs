//! Chat session orchestration.
//!
//! Builds on top of:
//! - `models::Event` / `models::Fragment` (data structs)
//! - `pipeline::encode::build` / `pipeline::decode::split` (the codec)
//! - `db::repository` (low-level insert/query)
//!
//! One `send` call is the full loop: persist the outbound message, encode
//! the event log, obtain the raw reply, decode it, persist each fragment
//! as an inbound event.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use rusqlite::Connection;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::models::enums::{Direction, Scene};
use crate::models::{Conversation, Event, EventPayload, Fragment, Profile};
use crate::pipeline::encode::{build, EncodeOptions, ResolvedFeed};
use crate::pipeline::decode::split;
use crate::pipeline::llm::{CompletionClient, LlmError};

#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Conversation not found: {0}")]
    ConversationNotFound(Uuid),
}

/// Event persistence as the session sees it.
pub trait MessageStore {
    fn load_events(&self, conversation_id: Uuid) -> Result<Vec<Event>, DatabaseError>;
    fn append_event(&self, event: &Event) -> Result<(), DatabaseError>;
    fn mark_recalled(&self, event_id: i64, original: &str) -> Result<(), DatabaseError>;
    fn max_event_id(&self) -> Result<i64, DatabaseError>;
}

/// Contact profile lookup, used for notice filtering.
pub trait ProfileProvider {
    fn get(&self, conversation_id: Uuid) -> Result<Option<Profile>, DatabaseError>;
}

/// SQLite-backed store over an open connection.
pub struct SqliteMessageStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteMessageStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a conversation with its profile. The title is filled in
    /// later from the first outbound message.
    pub fn start_conversation(&self, profile: &Profile) -> Result<Conversation, DatabaseError> {
        let conversation = Conversation {
            id: Uuid::new_v4(),
            started_at: Utc::now().naive_utc(),
            title: None,
        };
        db::insert_conversation(self.conn, &conversation)?;
        db::upsert_profile(self.conn, &conversation.id, profile)?;
        info!(conversation_id = %conversation.id, "started conversation");
        Ok(conversation)
    }

    pub fn list_conversations(&self) -> Result<Vec<Conversation>, DatabaseError> {
        db::list_conversations(self.conn)
    }
}

impl MessageStore for SqliteMessageStore<'_> {
    fn load_events(&self, conversation_id: Uuid) -> Result<Vec<Event>, DatabaseError> {
        db::get_events_by_conversation(self.conn, &conversation_id)
    }

    fn append_event(&self, event: &Event) -> Result<(), DatabaseError> {
        db::insert_event(self.conn, event)
    }

    fn mark_recalled(&self, event_id: i64, original: &str) -> Result<(), DatabaseError> {
        db::mark_recalled(self.conn, event_id, original)
    }

    fn max_event_id(&self) -> Result<i64, DatabaseError> {
        db::max_event_id(self.conn)
    }
}

impl ProfileProvider for SqliteMessageStore<'_> {
    fn get(&self, conversation_id: Uuid) -> Result<Option<Profile>, DatabaseError> {
        db::get_profile(self.conn, &conversation_id)
    }
}

/// Monotonic event-id source, shared by every appender in the process.
/// Seeded once from the store's high-water mark.
pub struct EventIdGenerator {
    next: AtomicI64,
}

impl EventIdGenerator {
    pub fn seeded_from(store: &impl MessageStore) -> Result<Self, DatabaseError> {
        let max = store.max_event_id()?;
        Ok(Self {
            next: AtomicI64::new(max + 1),
        })
    }

    pub fn next(&self) -> i64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}

/// One conversation's send loop, generic over the store and the
/// completion client so tests run against in-memory fakes.
pub struct ChatSession<'a, S, C>
where
    S: MessageStore + ProfileProvider,
    C: CompletionClient,
{
    store: &'a S,
    client: &'a C,
    ids: EventIdGenerator,
}

impl<'a, S, C> ChatSession<'a, S, C>
where
    S: MessageStore + ProfileProvider,
    C: CompletionClient,
{
    pub fn new(store: &'a S, client: &'a C) -> Result<Self, ChatError> {
        let ids = EventIdGenerator::seeded_from(store)?;
        Ok(Self { store, client, ids })
    }

    /// Send one outbound message and persist the decoded reply.
    pub fn send(
        &self,
        conversation_id: Uuid,
        text: &str,
        feeds: &[ResolvedFeed],
    ) -> Result<Vec<Fragment>, ChatError> {
        let profile = self
            .store
            .get(conversation_id)?
            .ok_or(ChatError::ConversationNotFound(conversation_id))?;

        let now_ms = Utc::now().timestamp_millis();

        // 1. Persist the outbound message before anything can fail.
        self.store.append_event(&Event {
            id: self.ids.next(),
            conversation_id,
            direction: Direction::Outbound,
            scene: Scene::Online,
            timestamp_ms: now_ms,
            recalled: None,
            payload: EventPayload::Text {
                text: text.to_string(),
            },
        })?;

        // 2. Encode the full event log.
        let events = self.store.load_events(conversation_id)?;
        let mut opts = EncodeOptions::online(now_ms);
        opts.extra_notice_keywords = profile.extra_notice_keywords.clone();
        let transcript = build(&events, feeds, &opts);
        debug!(
            conversation_id = %conversation_id,
            entries = transcript.len(),
            "encoded transcript"
        );

        // 3. Obtain and decode the reply.
        let raw = self.client.complete(&transcript)?;
        let fragments = split(&raw);

        // 4. Persist each fragment as its own inbound event.
        let reply_ts = Utc::now().timestamp_millis();
        for fragment in &fragments {
            self.store.append_event(&Event {
                id: self.ids.next(),
                conversation_id,
                direction: Direction::Inbound,
                scene: Scene::Online,
                timestamp_ms: reply_ts,
                recalled: None,
                payload: fragment_payload(fragment),
            })?;
        }
        info!(
            conversation_id = %conversation_id,
            fragments = fragments.len(),
            "reply persisted"
        );

        Ok(fragments)
    }

    /// Flag an existing event as recalled, keeping its original text.
    pub fn recall(&self, event_id: i64, original: &str) -> Result<(), ChatError> {
        self.store.mark_recalled(event_id, original)?;
        Ok(())
    }
}

/// How each fragment kind is stored. Markup fragments become theatre
/// cards so that re-encoding the history drops them by default.
fn fragment_payload(fragment: &Fragment) -> EventPayload {
    match fragment {
        Fragment::HtmlTheatreBlock(text) => EventPayload::TheatreCard {
            template_id: "html-block".to_string(),
            raw_data: text.clone(),
        },
        Fragment::RawDocument(text) => EventPayload::TheatreCard {
            template_id: "html-document".to_string(),
            raw_data: text.clone(),
        },
        other => EventPayload::Text { text: other.text() },
    }
}

/// Generate a conversation title from the first outbound message.
/// Truncates at 50 characters with "..." if longer, handling UTF-8
/// correctly.
pub fn generate_title(first_message: &str) -> String {
    let trimmed = first_message.trim();
    if trimmed.is_empty() {
        return "New conversation".to_string();
    }

    let boundary = trimmed
        .char_indices()
        .take_while(|(i, _)| *i < 50)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(trimmed.len());

    if boundary >= trimmed.len() {
        trimmed.to_string()
    } else {
        format!("{}...", &trimmed[..boundary])
    }
}
