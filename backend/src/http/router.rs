//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Sections
        .route(
            "/sections",
            get(handlers::list_sections).post(handlers::create_sections),
        )
        .route(
            "/sections/{section}",
            get(handlers::get_section)
                .put(handlers::save_section)
                .delete(handlers::delete_section),
        )
        .route(
            "/sections/{section}/conflicts",
            get(handlers::get_section_conflicts),
        )
        // Assignments
        .route(
            "/sections/{section}/assignment",
            get(handlers::get_assignment).put(handlers::commit_assignment),
        )
        .route(
            "/sections/{section}/candidates",
            get(handlers::evaluate_candidate),
        )
        .route("/scheduler/run", post(handlers::run_scheduler))
        // Catalog
        .route("/courses", post(handlers::create_course))
        .route("/courses/{course}", get(handlers::get_course))
        .route("/prefixes", get(handlers::list_prefixes))
        .route("/buildings", get(handlers::list_buildings))
        .route("/buildings/{building}/rooms", get(handlers::list_rooms))
        .route("/instructors", get(handlers::list_instructors))
        .route("/timeslot-categories", get(handlers::list_timeslot_categories))
        .route(
            "/timeslot-categories/{category}/timeslots",
            get(handlers::list_timeslots),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::db::repositories::LocalRepository;
    use crate::db::repository::FullRepository;

    fn app() -> Router {
        let repo = Arc::new(LocalRepository::seeded()) as Arc<dyn FullRepository>;
        create_router(AppState::new(repo))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["database"], "connected");
    }

    #[tokio::test]
    async fn test_create_course_then_list() {
        let app = app();
        let request = Request::post("/v1/courses")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"prefix":"CMS","number":"171","title":"Intro","lectures":1,"labs":1}"#,
            ))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(
                Request::get("/v1/sections?prefix=CMS")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let names = body_json(response).await;
        assert_eq!(
            names,
            serde_json::json!(["CMS 171 - Lab 1", "CMS 171 - Lecture 1"])
        );
    }

    #[tokio::test]
    async fn test_malformed_and_missing_sections() {
        let app = app();
        let response = app
            .clone()
            .oneshot(
                Request::get("/v1/sections/CMS%20171")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(
                Request::get("/v1/sections/CMS%20171%20-%20Lecture%201")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_catalog_listings() {
        let response = app()
            .oneshot(
                Request::get("/v1/buildings/KEENE/rooms")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            body_json(response).await,
            serde_json::json!(["KEENE 101", "KEENE 106", "KEENE 112"])
        );
    }
}
