//! Health Route

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use vclevel::{DurableStore, FastStore};

use crate::AppState;

#[derive(Serialize)]
pub struct HealthCheck {
    status: String,
    version: String,
    tracked_members: usize,
}

/// Liveness and membership size
pub async fn health_check<D: DurableStore, F: FastStore>(
    State(state): State<AppState<D, F>>,
) -> Json<HealthCheck> {
    Json(HealthCheck {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        tracked_members: state.membership.len(),
    })
}

pub fn router<D, F>() -> Router<AppState<D, F>>
where
    D: DurableStore + 'static,
    F: FastStore + 'static,
{
    Router::new().route("/health", get(health_check::<D, F>))
}
