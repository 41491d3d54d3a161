//! Administrative audit and repair triggers.

use axum::{
    extract::{Query, State},
    response::Json,
};
use turnover_core::domain::audit::{AuditOptions, AuditReport};

use crate::{
    api::types::{AdminReconcileRequest, ApiResponse, AuditQuery, BackfillRequest},
    infra::{app_state::AppState, errors::AppResult, middleware::RequestActor},
};

/// Full consistency pass; repairs unless `dryRun` is set.
pub async fn reconcile(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    Json(request): Json<AdminReconcileRequest>,
) -> AppResult<Json<ApiResponse<AuditReport>>> {
    actor.require_admin()?;

    let report = state
        .auditor
        .audit(AuditOptions {
            dry_run: request.dry_run,
            property_id: request.property_id,
            from: request.from,
            to: request.to,
        })
        .await?;
    Ok(Json(ApiResponse::success(report)))
}

pub async fn backfill(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    Json(request): Json<BackfillRequest>,
) -> AppResult<Json<ApiResponse<AuditReport>>> {
    actor.require_admin()?;

    let report = state
        .auditor
        .backfill(request.days_back, request.dry_run)
        .await?;
    Ok(Json(ApiResponse::success(report)))
}

/// Read-only report; never repairs.
pub async fn audit(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    Query(query): Query<AuditQuery>,
) -> AppResult<Json<ApiResponse<AuditReport>>> {
    actor.require_admin()?;

    let report = state
        .auditor
        .audit(AuditOptions {
            dry_run: true,
            property_id: query.property_id,
            from: query.from,
            to: query.to,
        })
        .await?;
    Ok(Json(ApiResponse::success(report)))
}
