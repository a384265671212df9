use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use arbor_types::api::{Claims, CreateMessageRequest, ListMessagesQuery};

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::threads;

pub async fn create_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    let author = claims.sub;

    // Run blocking DB work off the async runtime
    let db = state.clone();
    let node = tokio::task::spawn_blocking(move || {
        threads::create_root(&db.db, author, &req.content)
    })
    .await
    .map_err(join_error)??;

    Ok((StatusCode::CREATED, Json(node)))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    let author = claims.sub;

    let db = state.clone();
    let node = tokio::task::spawn_blocking(move || {
        threads::attach_comment(&db.db, id, author, &req.content)
    })
    .await
    .map_err(join_error)??;

    Ok((StatusCode::CREATED, Json(node)))
}

/// The board roots (newest first), or with `?parent=<id>` the replies under
/// that message (oldest first). Either way every node arrives with its full
/// subtree attached.
pub async fn list_messages(
    State(state): State<AppState>,
    Query(query): Query<ListMessagesQuery>,
) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    let nodes = tokio::task::spawn_blocking(move || threads::assemble(&db.db, query.parent))
        .await
        .map_err(join_error)??;

    Ok(Json(nodes))
}

fn join_error(e: tokio::task::JoinError) -> ApiError {
    ApiError::Store(anyhow::anyhow!("spawn_blocking join error: {}", e))
}
