//! Progress Route - the HTTP counterpart of the level command

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use vclevel::{DurableStore, FastStore, ProgressRecord};

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub id: String,
    pub level: u64,
    pub exp: u64,
    /// Experience needed to reach the next level
    pub threshold: u64,
    pub in_voice: bool,
}

impl ProgressResponse {
    fn new(record: ProgressRecord, in_voice: bool) -> Self {
        Self {
            threshold: record.threshold(),
            id: record.id,
            level: record.level,
            exp: record.exp,
            in_voice,
        }
    }
}

/// Member ids are nonzero snowflakes
fn is_member_id(id: &str) -> bool {
    matches!(id.parse::<u64>(), Ok(n) if n != 0)
}

/// Get a member's progress
pub async fn get_progress<D: DurableStore, F: FastStore>(
    State(state): State<AppState<D, F>>,
    Path(id): Path<String>,
) -> Result<Json<ProgressResponse>, (axum::http::StatusCode, String)> {
    if !is_member_id(&id) {
        return Err((axum::http::StatusCode::NOT_FOUND, "Member not found".to_string()));
    }

    let record = state.repository.get_record(&id).await;
    let in_voice = state.membership.contains(&id);

    Ok(Json(ProgressResponse::new(record, in_voice)))
}

pub fn router<D, F>() -> Router<AppState<D, F>>
where
    D: DurableStore + 'static,
    F: FastStore + 'static,
{
    Router::new().route("/progress/:id", get(get_progress::<D, F>))
}
