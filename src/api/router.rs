//! API Router configuration

use crate::api::handlers;
use crate::api::state::AppState;
use crate::utils::error::{HaasError, Result};
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main API router
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Result<Router> {
    let api_routes = Router::new()
        .route("/hardware", get(handlers::list_hardware))
        .route(
            "/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route("/projects/:project_id", get(handlers::get_project))
        .route(
            "/projects/:project_id/resources",
            get(handlers::list_resources),
        )
        .route(
            "/projects/:project_id/resources/:hwset_id/checkout",
            post(handlers::checkout),
        )
        .route(
            "/projects/:project_id/resources/:hwset_id/checkin",
            post(handlers::checkin),
        )
        .route(
            "/projects/:project_id/resources/:hwset_id/history",
            get(handlers::resource_history),
        )
        .route("/projects/:project_id/invite", post(handlers::invite))
        .route("/projects/:project_id/members", get(handlers::list_members));

    Ok(Router::new()
        .route("/", get(handlers::health))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins)?)
        .with_state(state))
}

fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed_origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|e| HaasError::InvalidConfigValueError {
                field: "server.allowed_origins".to_string(),
                value: origin.clone(),
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}
