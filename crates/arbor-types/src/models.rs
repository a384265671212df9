use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A stored board message. A comment is a message whose `parent_id` is set;
/// `parent_id = None` marks a root post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub content: String,
    pub author_id: Uuid,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}
