use crate::Database;
use crate::models::{MessageRow, Order, UserRow};
use anyhow::{Result, anyhow};
use rusqlite::Connection;

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &str,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, email, password) VALUES (?1, ?2, ?3, ?4)",
                (id, username, email, password_hash),
            )?;
            Ok(())
        })
    }

    /// Login accepts either identifier, so a single lookup matches both columns.
    pub fn get_user_by_username_or_email(&self, needle: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username_or_email(conn, needle))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    // -- Messages --

    /// Insert a message and read the stored row back, so the caller sees the
    /// id and timestamp SQLite assigned. Parent existence is not checked
    /// here — that is the attachment layer's job.
    pub fn insert_message(
        &self,
        content: &str,
        author_id: &str,
        parent_id: Option<i64>,
    ) -> Result<MessageRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (content, author_id, parent_id) VALUES (?1, ?2, ?3)",
                rusqlite::params![content, author_id, parent_id],
            )?;
            let id = conn.last_insert_rowid();

            query_message(conn, id)?.ok_or_else(|| anyhow!("Inserted message {} not found", id))
        })
    }

    pub fn find_message(&self, id: i64) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| query_message(conn, id))
    }

    /// All messages whose parent is `parent_id` (the board roots when None),
    /// joined with their author, ordered by creation time in the requested
    /// direction. Full result set — no limit.
    pub fn find_children(&self, parent_id: Option<i64>, order: Order) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| query_children(conn, parent_id, order))
    }
}

fn query_user_by_username_or_email(conn: &Connection, needle: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, username, email, password, created_at FROM users
         WHERE username = ?1 OR email = ?1",
    )?;

    let row = stmt
        .query_row([needle], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                email: row.get(2)?,
                password: row.get(3)?,
                created_at: row.get(4)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_user_by_id(conn: &Connection, id: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, username, email, password, created_at FROM users WHERE id = ?1",
    )?;

    let row = stmt
        .query_row([id], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                email: row.get(2)?,
                password: row.get(3)?,
                created_at: row.get(4)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_message(conn: &Connection, id: i64) -> Result<Option<MessageRow>> {
    let mut stmt = conn.prepare(
        "SELECT m.id, m.content, m.author_id, u.username, m.parent_id, m.created_at
         FROM messages m
         LEFT JOIN users u ON m.author_id = u.id
         WHERE m.id = ?1",
    )?;

    let row = stmt.query_row([id], map_message_row).optional()?;

    Ok(row)
}

fn query_children(conn: &Connection, parent_id: Option<i64>, order: Order) -> Result<Vec<MessageRow>> {
    // Neither the NULL match nor the sort direction can be a bind parameter,
    // so the statement is assembled from fixed fragments. SQLite timestamps
    // have second granularity; the id tie-break keeps same-second siblings in
    // insertion order.
    let sql = format!(
        "SELECT m.id, m.content, m.author_id, u.username, m.parent_id, m.created_at
         FROM messages m
         LEFT JOIN users u ON m.author_id = u.id
         WHERE m.parent_id {}
         ORDER BY m.created_at {dir}, m.id {dir}",
        if parent_id.is_some() { "= ?1" } else { "IS NULL" },
        dir = order.sql(),
    );

    let mut stmt = conn.prepare(&sql)?;

    let params: Vec<&dyn rusqlite::types::ToSql> = match &parent_id {
        Some(id) => vec![id as &dyn rusqlite::types::ToSql],
        None => vec![],
    };

    let rows = stmt
        .query_map(params.as_slice(), map_message_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn map_message_row(row: &rusqlite::Row<'_>) -> std::result::Result<MessageRow, rusqlite::Error> {
    Ok(MessageRow {
        id: row.get(0)?,
        content: row.get(1)?,
        author_id: row.get(2)?,
        author_username: row
            .get::<_, Option<String>>(3)?
            .unwrap_or_else(|| "unknown".to_string()),
        parent_id: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
