use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::middleware::require_auth;
use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::events::{
    create_event, delete_event, get_event, list_categories, list_events, update_event,
};
use crate::handlers::health_check;
use crate::state::AppState;

/// Body cap, set above the 2 MiB image limit so an oversized upload reaches
/// the typed size check instead of dying inside the framework.
const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

pub fn create_routes(state: AppState) -> Router {
    // The auth gate wraps only the routes registered before `route_layer`;
    // the reads below it stay public.
    let events = Router::new()
        .route("/", post(create_event))
        .route("/:id", put(update_event).delete(delete_event))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .route("/", get(list_events))
        .route("/categories", get(list_categories))
        .route("/:id", get(get_event));

    Router::new()
        .route("/health", get(health_check))
        .nest("/events", events)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer())
        .layer(create_cors_layer())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::auth::policy::AnyAuthenticated;
    use crate::auth::AuthCodec;
    use crate::images::InlineImageSink;
    use crate::store::memory::MemoryEventStore;

    fn test_state() -> AppState {
        AppState {
            store: Arc::new(MemoryEventStore::default()),
            auth: AuthCodec::new(b"routes-test-secret"),
            images: Arc::new(InlineImageSink),
            policy: Arc::new(AnyAuthenticated),
        }
    }

    #[tokio::test]
    async fn health_endpoint_responds_with_security_headers() {
        let response = create_routes(test_state())
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("x-content-type-options").unwrap(),
            "nosniff"
        );
    }

    #[tokio::test]
    async fn unknown_paths_fall_through_to_404() {
        let response = create_routes(test_state())
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
