use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::{
    api::routes::{utils::relative, v1},
    handlers::{admin, cleanings, health, sync},
    infra::app_state::AppState,
};

/// Create all v1 API routes
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route(relative(v1::HEALTH), get(health::health))
        .route(relative(v1::sync::RECONCILE), post(sync::reconcile_bookings))
        .merge(create_admin_routes())
        .merge(create_cleaning_routes())
}

fn create_admin_routes() -> Router<AppState> {
    Router::new()
        .route(relative(v1::admin::RECONCILE), post(admin::reconcile))
        .route(relative(v1::admin::BACKFILL), post(admin::backfill))
        .route(relative(v1::admin::AUDIT), get(admin::audit))
}

fn create_cleaning_routes() -> Router<AppState> {
    Router::new()
        .route(relative(v1::cleanings::CANCEL), post(cleanings::cancel_cleaning))
        .route(relative(v1::cleanings::MOVE), post(cleanings::move_cleaning))
        .route(
            relative(v1::cleanings::OPERATORS),
            post(cleanings::assign_operator),
        )
        .route(
            relative(v1::cleanings::OPERATOR),
            delete(cleanings::unassign_operator),
        )
        .route(
            relative(v1::cleanings::SUGGESTIONS),
            get(cleanings::operator_suggestions),
        )
}
