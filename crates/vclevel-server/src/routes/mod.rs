//! VC Level Status Routes
//!
//! - /health - liveness and tracked member count
//! - /progress/:id - current progress of a member

pub mod health;
pub mod progress;

use axum::Router;
use tower_http::trace::TraceLayer;
use vclevel::{DurableStore, FastStore};

use crate::AppState;

/// Build the status router
pub fn router<D, F>(state: AppState<D, F>) -> Router
where
    D: DurableStore + 'static,
    F: FastStore + 'static,
{
    Router::new()
        .merge(health::router())
        .merge(progress::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;
    use vclevel::testing::{InMemoryDurableStore, InMemoryFastStore};
    use vclevel::{MembershipTracker, ProgressRecord, ProgressionRepository};

    fn test_state() -> (
        AppState<InMemoryDurableStore, InMemoryFastStore>,
        Arc<InMemoryDurableStore>,
    ) {
        let durable = Arc::new(InMemoryDurableStore::new());
        let fast = Arc::new(InMemoryFastStore::new());
        let state = AppState {
            repository: Arc::new(ProgressionRepository::new(durable.clone(), fast, None)),
            membership: MembershipTracker::new(),
        };
        (state, durable)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_members() {
        let (state, _) = test_state();
        state.membership.mark_present("u1");

        let response = router(state)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["tracked_members"], 1);
    }

    #[tokio::test]
    async fn test_progress_returns_record_and_threshold() {
        let (state, durable) = test_state();
        durable.seed(ProgressRecord {
            id: "42".into(),
            level: 2,
            exp: 0,
        });

        let response = router(state)
            .oneshot(Request::get("/progress/42").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["id"], "42");
        assert_eq!(json["level"], 2);
        assert_eq!(json["exp"], 0);
        assert_eq!(json["threshold"], 220);
        assert_eq!(json["in_voice"], false);
    }

    #[tokio::test]
    async fn test_progress_creates_unknown_member() {
        let (state, durable) = test_state();

        let response = router(state)
            .oneshot(
                Request::get("/progress/123456789012345678")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["level"], 0);
        assert!(durable.record("123456789012345678").is_some());
    }

    #[tokio::test]
    async fn test_progress_rejects_non_member_ids() {
        let (state, durable) = test_state();
        let app = router(state);

        for path in ["/progress/new", "/progress/0", "/progress/-1", "/progress/1e3"] {
            let response = app
                .clone()
                .oneshot(Request::get(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", path);
        }

        assert_eq!(durable.len(), 0);
    }
}
