use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// -- JWT Claims --

/// JWT claims shared between the auth handlers (token issuance) and the
/// request middleware (token validation). Canonical definition lives here in
/// arbor-types to eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    #[validate(length(min = 5, max = 20))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 20))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub username: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateMessageRequest {
    pub content: String,
}

/// A message joined with its author and its recursively assembled replies.
/// This is what `GET /messages` returns: each node carries its full subtree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageNode {
    pub id: i64,
    pub content: String,
    pub author_id: Uuid,
    pub author_username: String,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub children: Vec<MessageNode>,
}

#[derive(Debug, Deserialize)]
pub struct ListMessagesQuery {
    /// When set, list the replies under this message instead of the board roots.
    pub parent: Option<i64>,
}
