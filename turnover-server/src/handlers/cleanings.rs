//! Manual edits on a single cleaning.

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use turnover_core::domain::{
    assignment::{AssignmentOutcome, OperatorSuggestion},
    cascade::MoveOutcome,
};
use turnover_model::{CleaningId, OperatorId};

use crate::{
    api::types::{
        ApiResponse, AssignRequest, CancelRequest, CancelResponse, MoveRequest, SuggestionsQuery,
    },
    infra::{
        app_state::AppState,
        errors::{AppError, AppResult},
        middleware::RequestActor,
    },
};

/// Cancel a cleaning, or remove it entirely when `forceDelete` is set.
pub async fn cancel_cleaning(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    Path(id): Path<CleaningId>,
    Json(request): Json<CancelRequest>,
) -> AppResult<Json<ApiResponse<CancelResponse>>> {
    let reason = request.reason.trim();
    if reason.is_empty() {
        return Err(AppError::bad_request("reason must not be empty"));
    }

    let response = if request.force_delete {
        CancelResponse::Deleted(state.cascade.force_delete(id, &actor).await?)
    } else {
        CancelResponse::Cancelled(state.cascade.cancel(id, reason, &actor).await?)
    };
    Ok(Json(ApiResponse::success(response)))
}

pub async fn move_cleaning(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    Path(id): Path<CleaningId>,
    Json(request): Json<MoveRequest>,
) -> AppResult<Json<ApiResponse<MoveOutcome>>> {
    let outcome = state
        .cascade
        .move_cleaning(id, request.new_date, request.new_time, &actor)
        .await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn assign_operator(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    Path(id): Path<CleaningId>,
    Json(request): Json<AssignRequest>,
) -> AppResult<Json<ApiResponse<AssignmentOutcome>>> {
    let outcome = state
        .assignments
        .assign(id, request.operator_id, &actor)
        .await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn unassign_operator(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    Path((id, operator_id)): Path<(CleaningId, OperatorId)>,
) -> AppResult<Json<ApiResponse<AssignmentOutcome>>> {
    let outcome = state.assignments.unassign(id, operator_id, &actor).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn operator_suggestions(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    Path(id): Path<CleaningId>,
    Query(query): Query<SuggestionsQuery>,
) -> AppResult<Json<ApiResponse<Vec<OperatorSuggestion>>>> {
    let suggestions = state
        .assignments
        .suggestions(id, query.limit, &actor)
        .await?;
    Ok(Json(ApiResponse::success(suggestions)))
}
