pub mod v1;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::{api::routes::v1::ROOT, infra::app_state::AppState};

/// Create the main API router with all versions
pub fn create_api_router() -> Router<AppState> {
    Router::new().nest(ROOT, v1::create_v1_router())
}

/// Complete application with tracing, ready to serve.
pub fn create_app(state: AppState) -> Router {
    create_api_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
