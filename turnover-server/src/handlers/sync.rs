use axum::{extract::State, response::Json};
use tracing::info;
use turnover_core::domain::sync::SyncReport;

use crate::{
    api::types::{ApiResponse, SyncReconcileRequest},
    infra::{app_state::AppState, errors::AppResult, middleware::RequestActor},
};

/// Reconcile a batch of booking-feed tuples into cleanings.
pub async fn reconcile_bookings(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    Json(request): Json<SyncReconcileRequest>,
) -> AppResult<Json<ApiResponse<SyncReport>>> {
    actor.require_admin()?;

    let report = state.synchronizer.reconcile(&request.tuples).await?;
    info!(
        tuples = request.tuples.len(),
        created = report.created,
        updated = report.updated,
        skipped = report.skipped,
        "booking batch reconciled"
    );
    Ok(Json(ApiResponse::success(report)))
}
