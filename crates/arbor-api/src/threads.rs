//! The threaded message store: root creation, comment attachment, and
//! recursive tree assembly over the repository in arbor-db.
//!
//! These functions are synchronous; HTTP handlers run them on the blocking
//! thread pool.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use arbor_db::Database;
use arbor_db::models::{MessageRow, Order};
use arbor_types::api::MessageNode;

use crate::error::{ApiError, ApiResult};

pub const MIN_CONTENT_CHARS: usize = 3;
pub const MAX_CONTENT_CHARS: usize = 200;

fn validate_content(content: &str) -> ApiResult<()> {
    let chars = content.chars().count();
    if chars < MIN_CONTENT_CHARS || chars > MAX_CONTENT_CHARS {
        return Err(ApiError::Validation(format!(
            "content must be {} to {} characters",
            MIN_CONTENT_CHARS, MAX_CONTENT_CHARS
        )));
    }
    Ok(())
}

/// Create a top-level message. No parent, so no existence check.
pub fn create_root(db: &Database, author: Uuid, content: &str) -> ApiResult<MessageNode> {
    validate_content(content)?;

    let row = db.insert_message(content, &author.to_string(), None)?;
    Ok(node_from_row(row))
}

/// Attach a comment under an existing message. The parent lookup and the
/// insert are not one transaction: the repository is the sole writer and
/// messages are never deleted, so a parent seen here cannot vanish before
/// the insert lands.
pub fn attach_comment(
    db: &Database,
    parent_id: i64,
    author: Uuid,
    content: &str,
) -> ApiResult<MessageNode> {
    validate_content(content)?;

    let parent = db
        .find_message(parent_id)?
        .ok_or(ApiError::ParentNotFound(parent_id))?;

    let row = db.insert_message(content, &author.to_string(), Some(parent.id))?;
    Ok(node_from_row(row))
}

/// Recursively assemble the message tree under `parent_id`, or the whole
/// board when `parent_id` is None.
///
/// Roots list newest first; replies within a thread list in conversation
/// order (oldest first). Each node's subtree is populated with one child
/// query per node — fine for board-sized trees, batch at the repository if
/// that ever stops being true.
///
/// Recursion bottoms out at messages with no replies: a child always has a
/// larger id than its parent, so no node can reappear in its own subtree.
pub fn assemble(db: &Database, parent_id: Option<i64>) -> ApiResult<Vec<MessageNode>> {
    let order = if parent_id.is_some() { Order::Asc } else { Order::Desc };

    let rows = db.find_children(parent_id, order)?;

    rows.into_iter()
        .map(|row| {
            let mut node = node_from_row(row);
            node.children = assemble(db, Some(node.id))?;
            Ok(node)
        })
        .collect()
}

fn node_from_row(row: MessageRow) -> MessageNode {
    MessageNode {
        id: row.id,
        content: row.content,
        author_id: row.author_id.parse().unwrap_or_else(|e| {
            warn!("Corrupt author_id '{}' on message {}: {}", row.author_id, row.id, e);
            Uuid::default()
        }),
        author_username: row.author_username,
        parent_id: row.parent_id,
        created_at: parse_created_at(&row.created_at),
        children: Vec::new(),
    }
}

pub(crate) fn parse_created_at(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
            // Parse as naive UTC and convert.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}': {}", raw, e);
            DateTime::default()
        })
}
