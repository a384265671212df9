/// Database row types — these map directly to SQLite rows.
/// Distinct from arbor-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub created_at: String,
}

pub struct MessageRow {
    pub id: i64,
    pub content: String,
    pub author_id: String,
    pub author_username: String,
    pub parent_id: Option<i64>,
    pub created_at: String,
}

/// Sort direction for child listings. Root listings are requested newest
/// first, reply listings oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub(crate) fn sql(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}
