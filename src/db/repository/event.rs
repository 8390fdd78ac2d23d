use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::{Direction, Scene};
use crate::models::{Event, EventPayload};

pub fn insert_event(conn: &Connection, event: &Event) -> Result<(), DatabaseError> {
    let payload = serde_json::to_string(&event.payload)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;
    conn.execute(
        "INSERT INTO events (id, conversation_id, direction, scene, timestamp_ms, recalled_original, payload)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            event.id,
            event.conversation_id.to_string(),
            event.direction.as_str(),
            event.scene.as_str(),
            event.timestamp_ms,
            event.recalled,
            payload,
        ],
    )?;
    Ok(())
}

pub fn get_events_by_conversation(
    conn: &Connection,
    conversation_id: &Uuid,
) -> Result<Vec<Event>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, conversation_id, direction, scene, timestamp_ms, recalled_original, payload
         FROM events WHERE conversation_id = ?1 ORDER BY id ASC",
    )?;

    let rows = stmt.query_map(params![conversation_id.to_string()], |row| {
        Ok(EventRow {
            id: row.get(0)?,
            conversation_id: row.get(1)?,
            direction: row.get(2)?,
            scene: row.get(3)?,
            timestamp_ms: row.get(4)?,
            recalled_original: row.get(5)?,
            payload: row.get(6)?,
        })
    })?;

    let mut events = Vec::new();
    for row in rows {
        events.push(event_from_row(row?)?);
    }
    Ok(events)
}

/// Set the recall flag on an existing event. The single allowed mutation of
/// the append-only log.
pub fn mark_recalled(conn: &Connection, id: i64, original: &str) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE events SET recalled_original = ?1 WHERE id = ?2",
        params![original, id],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "event".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Highest event id across all conversations (0 on an empty log). Seeds the
/// id generator at startup.
pub fn max_event_id(conn: &Connection) -> Result<i64, DatabaseError> {
    let max = conn.query_row("SELECT COALESCE(MAX(id), 0) FROM events", [], |row| {
        row.get::<_, i64>(0)
    })?;
    Ok(max)
}

struct EventRow {
    id: i64,
    conversation_id: String,
    direction: String,
    scene: String,
    timestamp_ms: i64,
    recalled_original: Option<String>,
    payload: String,
}

fn event_from_row(row: EventRow) -> Result<Event, DatabaseError> {
    let payload: EventPayload = serde_json::from_str(&row.payload)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;
    Ok(Event {
        id: row.id,
        conversation_id: Uuid::parse_str(&row.conversation_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        direction: Direction::from_str(&row.direction)?,
        scene: Scene::from_str(&row.scene)?,
        timestamp_ms: row.timestamp_ms,
        recalled: row.recalled_original,
        payload,
    })
}
