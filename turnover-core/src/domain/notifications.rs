//! Operator notification port. Delivery lives outside this crate; dispatch is
//! fire-and-forget from the caller's point of view.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};
use turnover_model::{Cleaning, CleaningId, OperatorId, PropertyId};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Assigned,
    Removed,
    Moved,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleaningNotification {
    pub kind: NotificationKind,
    pub operator_id: OperatorId,
    pub cleaning_id: CleaningId,
    pub property_id: PropertyId,
    pub scheduled_date: NaiveDate,
    pub detail: Option<String>,
}

impl CleaningNotification {
    pub fn for_cleaning(
        kind: NotificationKind,
        operator_id: OperatorId,
        cleaning: &Cleaning,
    ) -> Self {
        Self {
            kind,
            operator_id,
            cleaning_id: cleaning.id,
            property_id: cleaning.property_id,
            scheduled_date: cleaning.scheduled_date,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, notification: CleaningNotification) -> Result<()>;
}

/// Default adapter: records each notification as a structured log event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl NotificationDispatcher for TracingNotifier {
    async fn dispatch(&self, notification: CleaningNotification) -> Result<()> {
        info!(
            kind = ?notification.kind,
            operator_id = %notification.operator_id,
            cleaning_id = %notification.cleaning_id,
            date = %notification.scheduled_date,
            detail = notification.detail.as_deref().unwrap_or(""),
            "operator notification"
        );
        Ok(())
    }
}

/// Send one notification per operator. Failures are logged and skipped.
/// Returns the number delivered.
pub async fn notify_operators(
    dispatcher: &dyn NotificationDispatcher,
    kind: NotificationKind,
    operators: &[OperatorId],
    cleaning: &Cleaning,
    detail: Option<&str>,
) -> usize {
    let mut delivered = 0;
    for operator_id in operators {
        let mut notification = CleaningNotification::for_cleaning(kind, *operator_id, cleaning);
        if let Some(detail) = detail {
            notification = notification.with_detail(detail);
        }
        match dispatcher.dispatch(notification).await {
            Ok(()) => delivered += 1,
            Err(err) => warn!(
                operator_id = %operator_id,
                cleaning_id = %cleaning.id,
                error = %err,
                "notification dispatch failed"
            ),
        }
    }
    delivered
}
