use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use turnover_core::domain::cascade::{CancelOutcome, DeleteOutcome};
use turnover_model::{BookingTuple, OperatorId, PropertyId};

/// Standard response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            data: Some(data),
            message: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncReconcileRequest {
    pub tuples: Vec<BookingTuple>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminReconcileRequest {
    #[serde(default, alias = "dry_run")]
    pub dry_run: bool,
    #[serde(default, alias = "property_id")]
    pub property_id: Option<PropertyId>,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditQuery {
    #[serde(default, alias = "property_id")]
    pub property_id: Option<PropertyId>,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackfillRequest {
    #[serde(alias = "days_back")]
    pub days_back: u32,
    #[serde(default, alias = "dry_run")]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    pub reason: String,
    #[serde(default, alias = "force_delete")]
    pub force_delete: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    #[serde(alias = "new_date")]
    pub new_date: NaiveDate,
    #[serde(default, alias = "new_time")]
    pub new_time: Option<NaiveTime>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    #[serde(alias = "operator_id")]
    pub operator_id: OperatorId,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SuggestionsQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Result of the cancel endpoint, which doubles as force-delete.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CancelResponse {
    Cancelled(CancelOutcome),
    Deleted(DeleteOutcome),
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
