use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Conversation, Profile};

pub fn insert_conversation(conn: &Connection, conv: &Conversation) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO conversations (id, started_at, title) VALUES (?1, ?2, ?3)",
        params![
            conv.id.to_string(),
            conv.started_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            conv.title
        ],
    )?;
    Ok(())
}

pub fn get_conversation(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<Conversation>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, started_at, title FROM conversations WHERE id = ?1",
        params![id.to_string()],
        |row| {
            Ok(Conversation {
                id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
                started_at: NaiveDateTime::parse_from_str(
                    &row.get::<_, String>(1)?,
                    "%Y-%m-%d %H:%M:%S",
                )
                .unwrap_or_default(),
                title: row.get(2)?,
            })
        },
    );

    match result {
        Ok(conv) => Ok(Some(conv)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_conversations(conn: &Connection) -> Result<Vec<Conversation>, DatabaseError> {
    let mut stmt = conn
        .prepare("SELECT id, started_at, title FROM conversations ORDER BY started_at DESC")?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
        ))
    })?;

    let mut conversations = Vec::new();
    for row in rows {
        let (id, started_at, title) = row?;
        conversations.push(Conversation {
            id: Uuid::parse_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            started_at: NaiveDateTime::parse_from_str(&started_at, "%Y-%m-%d %H:%M:%S")
                .unwrap_or_default(),
            title,
        });
    }
    Ok(conversations)
}

pub fn upsert_profile(
    conn: &Connection,
    conversation_id: &Uuid,
    profile: &Profile,
) -> Result<(), DatabaseError> {
    let keywords = serde_json::to_string(&profile.extra_notice_keywords)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;
    conn.execute(
        "INSERT INTO profiles (conversation_id, display_name, extra_notice_keywords)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(conversation_id) DO UPDATE SET
             display_name = excluded.display_name,
             extra_notice_keywords = excluded.extra_notice_keywords",
        params![
            conversation_id.to_string(),
            profile.display_name,
            keywords
        ],
    )?;
    Ok(())
}

pub fn get_profile(
    conn: &Connection,
    conversation_id: &Uuid,
) -> Result<Option<Profile>, DatabaseError> {
    let result = conn.query_row(
        "SELECT display_name, extra_notice_keywords FROM profiles WHERE conversation_id = ?1",
        params![conversation_id.to_string()],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
            ))
        },
    );

    match result {
        Ok((display_name, keywords)) => Ok(Some(Profile {
            display_name,
            extra_notice_keywords: serde_json::from_str(&keywords).unwrap_or_default(),
        })),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use chrono::Local;

    fn sample_conversation() -> Conversation {
        Conversation {
            id: Uuid::new_v4(),
            started_at: Local::now().naive_local(),
            title: Some("Evening chat".into()),
        }
    }

    #[test]
    fn insert_and_get_conversation() {
        let conn = open_memory_database().unwrap();
        let conv = sample_conversation();
        insert_conversation(&conn, &conv).unwrap();

        let loaded = get_conversation(&conn, &conv.id).unwrap().unwrap();
        assert_eq!(loaded.id, conv.id);
        assert_eq!(loaded.title.as_deref(), Some("Evening chat"));
    }

    #[test]
    fn missing_conversation_is_none() {
        let conn = open_memory_database().unwrap();
        let loaded = get_conversation(&conn, &Uuid::new_v4()).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn profile_round_trips() {
        let conn = open_memory_database().unwrap();
        let conv = sample_conversation();
        insert_conversation(&conn, &conv).unwrap();

        let profile = Profile {
            display_name: "Lin".into(),
            extra_notice_keywords: vec!["anniversary".into()],
        };
        upsert_profile(&conn, &conv.id, &profile).unwrap();

        let loaded = get_profile(&conn, &conv.id).unwrap().unwrap();
        assert_eq!(loaded, profile);
    }

    #[test]
    fn profile_upsert_replaces() {
        let conn = open_memory_database().unwrap();
        let conv = sample_conversation();
        insert_conversation(&conn, &conv).unwrap();

        let first = Profile {
            display_name: "Lin".into(),
            extra_notice_keywords: vec![],
        };
        upsert_profile(&conn, &conv.id, &first).unwrap();

        let second = Profile {
            display_name: "Lin Wei".into(),
            extra_notice_keywords: vec!["birthday".into()],
        };
        upsert_profile(&conn, &conv.id, &second).unwrap();

        let loaded = get_profile(&conn, &conv.id).unwrap().unwrap();
        assert_eq!(loaded.display_name, "Lin Wei");
        assert_eq!(loaded.extra_notice_keywords, vec!["birthday".to_string()]);
    }

    #[test]
    fn list_orders_by_start_time() {
        let conn = open_memory_database().unwrap();
        let mut older = sample_conversation();
        older.started_at = NaiveDateTime::parse_from_str("2024-01-01 10:00:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        let mut newer = sample_conversation();
        newer.started_at = NaiveDateTime::parse_from_str("2024-06-01 10:00:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        insert_conversation(&conn, &older).unwrap();
        insert_conversation(&conn, &newer).unwrap();

        let all = list_conversations(&conn).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, newer.id);
    }
}
