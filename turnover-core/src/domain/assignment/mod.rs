//! Operator assignment on cleanings and the advisor that ranks candidates.

mod advisor;

pub use advisor::{AssignmentAdvisor, OperatorSuggestion};

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use turnover_model::{Cleaning, CleaningId, CleaningStatus, OperatorId, Property};

use super::access::Actor;
use super::notifications::{NotificationDispatcher, NotificationKind, notify_operators};
use crate::application::TurnoverUnitOfWork;
use crate::database::ports::{
    PageRequest,
    cleanings::{CleaningFilter, CleaningPatch},
};
use crate::error::{Result, TurnoverError};
use crate::settings::TurnoverSettings;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentOutcome {
    pub cleaning: Cleaning,
    /// False when the call was a no-op (already assigned / not assigned).
    pub changed: bool,
    pub notifications_sent: usize,
}

#[derive(Clone)]
pub struct AssignmentService {
    uow: Arc<TurnoverUnitOfWork>,
    notifier: Arc<dyn NotificationDispatcher>,
    advisor: AssignmentAdvisor,
    settings: TurnoverSettings,
}

impl std::fmt::Debug for AssignmentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssignmentService")
            .field("advisor", &self.advisor)
            .finish_non_exhaustive()
    }
}

impl AssignmentService {
    pub fn new(
        uow: Arc<TurnoverUnitOfWork>,
        notifier: Arc<dyn NotificationDispatcher>,
        settings: TurnoverSettings,
    ) -> Self {
        Self {
            uow,
            notifier,
            advisor: AssignmentAdvisor::new(settings.advisor_weights),
            settings,
        }
    }

    pub async fn assign(
        &self,
        cleaning_id: CleaningId,
        operator_id: OperatorId,
        actor: &Actor,
    ) -> Result<AssignmentOutcome> {
        let (cleaning, property) = self.load(cleaning_id).await?;
        actor.authorize_for(&property)?;
        ensure_assignable(&cleaning)?;

        let operator = self
            .uow
            .operators
            .get(operator_id)
            .await?
            .ok_or_else(|| TurnoverError::not_found("operator", operator_id))?;
        if !operator.is_active() {
            return Err(TurnoverError::InvalidState(format!(
                "operator {operator_id} is inactive"
            )));
        }

        if cleaning.operators.contains(&operator_id) {
            return Ok(AssignmentOutcome {
                cleaning,
                changed: false,
                notifications_sent: 0,
            });
        }

        let mut operators = cleaning.operators.clone();
        operators.push(operator_id);
        let patch = CleaningPatch {
            status: Some(CleaningStatus::Assigned),
            operators: Some(operators),
            manually_modified: Some(true),
            ..CleaningPatch::default()
        };
        let updated = self.write(&cleaning, patch).await?;
        info!(
            cleaning_id = %updated.id,
            operator_id = %operator_id,
            operators = updated.operators.len(),
            "operator assigned"
        );

        let notifications_sent = notify_operators(
            self.notifier.as_ref(),
            NotificationKind::Assigned,
            &[operator_id],
            &updated,
            None,
        )
        .await;

        Ok(AssignmentOutcome {
            cleaning: updated,
            changed: true,
            notifications_sent,
        })
    }

    pub async fn unassign(
        &self,
        cleaning_id: CleaningId,
        operator_id: OperatorId,
        actor: &Actor,
    ) -> Result<AssignmentOutcome> {
        let (cleaning, property) = self.load(cleaning_id).await?;
        actor.authorize_for(&property)?;
        ensure_assignable(&cleaning)?;

        if !cleaning.operators.contains(&operator_id) {
            return Ok(AssignmentOutcome {
                cleaning,
                changed: false,
                notifications_sent: 0,
            });
        }

        let operators: Vec<OperatorId> = cleaning
            .operators
            .iter()
            .copied()
            .filter(|id| *id != operator_id)
            .collect();
        let status = if operators.is_empty() {
            CleaningStatus::Scheduled
        } else {
            cleaning.status
        };
        let patch = CleaningPatch {
            status: Some(status),
            operators: Some(operators),
            manually_modified: Some(true),
            ..CleaningPatch::default()
        };
        let updated = self.write(&cleaning, patch).await?;
        info!(
            cleaning_id = %updated.id,
            operator_id = %operator_id,
            status = %updated.status,
            "operator removed"
        );

        let notifications_sent = notify_operators(
            self.notifier.as_ref(),
            NotificationKind::Removed,
            &[operator_id],
            &updated,
            None,
        )
        .await;

        Ok(AssignmentOutcome {
            cleaning: updated,
            changed: true,
            notifications_sent,
        })
    }

    /// Ranked operator suggestions for a cleaning. Falls back to the
    /// configured default when `limit` is not given.
    pub async fn suggestions(
        &self,
        cleaning_id: CleaningId,
        limit: Option<usize>,
        actor: &Actor,
    ) -> Result<Vec<OperatorSuggestion>> {
        let (cleaning, property) = self.load(cleaning_id).await?;
        actor.authorize_for(&property)?;

        let candidates = self.uow.operators.list_active().await?;
        let workload = self.assignments_on(&cleaning).await?;
        let limit = limit.unwrap_or(self.settings.default_suggestion_limit);

        Ok(self
            .advisor
            .suggest(&cleaning, property.location, &candidates, &workload, limit))
    }

    /// Assignment count per operator across all active cleanings sharing the
    /// cleaning's date, excluding the cleaning itself.
    async fn assignments_on(&self, cleaning: &Cleaning) -> Result<HashMap<OperatorId, usize>> {
        let filter = CleaningFilter {
            from: Some(cleaning.scheduled_date),
            to: Some(cleaning.scheduled_date),
            ..CleaningFilter::active()
        };
        let mut counts: HashMap<OperatorId, usize> = HashMap::new();
        let mut page = PageRequest::first(self.settings.audit_page_size);
        loop {
            let batch = self.uow.cleanings.list_page(&filter, page).await?;
            for other in batch.items.iter().filter(|c| c.id != cleaning.id) {
                for operator in &other.operators {
                    *counts.entry(*operator).or_default() += 1;
                }
            }
            match batch.next {
                Some(cursor) => page = page.after(cursor),
                None => break,
            }
        }
        Ok(counts)
    }

    async fn write(&self, cleaning: &Cleaning, patch: CleaningPatch) -> Result<Cleaning> {
        self.uow
            .cleanings
            .update_if_status(cleaning.id, &[cleaning.status], patch)
            .await?
            .ok_or_else(|| {
                TurnoverError::Conflict(format!(
                    "cleaning {} changed while updating its operators",
                    cleaning.id
                ))
            })
    }

    async fn load(&self, id: CleaningId) -> Result<(Cleaning, Property)> {
        let cleaning = self
            .uow
            .cleanings
            .get(id)
            .await?
            .ok_or_else(|| TurnoverError::not_found("cleaning", id))?;
        let property = self
            .uow
            .properties
            .get(cleaning.property_id)
            .await?
            .ok_or_else(|| TurnoverError::not_found("property", cleaning.property_id))?;
        Ok((cleaning, property))
    }
}

fn ensure_assignable(cleaning: &Cleaning) -> Result<()> {
    if cleaning.status.is_mutable() {
        Ok(())
    } else {
        Err(TurnoverError::InvalidState(format!(
            "cannot change operators of a {} cleaning",
            cleaning.status
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::notifications::{MockNotificationDispatcher, TracingNotifier};
    use crate::domain::test_support::{cleaning, operator, seeded};
    use turnover_model::{GeoPoint, OperatorStatus, UserId};

    fn service(uow: Arc<TurnoverUnitOfWork>) -> AssignmentService {
        AssignmentService::new(uow, Arc::new(TracingNotifier), TurnoverSettings::default())
    }

    fn admin() -> Actor {
        Actor::Admin { id: UserId::new() }
    }

    #[tokio::test]
    async fn assign_moves_to_assigned_and_marks_manual() {
        let (store, uow, property) = seeded().await;
        let target = cleaning(&property, "2026-02-08");
        store.put_cleaning(target.clone()).await;
        let giulia = operator("Giulia", None, Some(4.5));
        store.put_operator(giulia.clone()).await;

        let giulia_id = giulia.id;
        let mut notifier = MockNotificationDispatcher::new();
        notifier
            .expect_dispatch()
            .withf(move |n| n.kind == NotificationKind::Assigned && n.operator_id == giulia_id)
            .times(1)
            .returning(|_| Ok(()));
        let service =
            AssignmentService::new(uow, Arc::new(notifier), TurnoverSettings::default());

        let outcome = service.assign(target.id, giulia.id, &admin()).await.unwrap();
        assert!(outcome.changed);
        assert_eq!(outcome.notifications_sent, 1);
        assert_eq!(outcome.cleaning.status, CleaningStatus::Assigned);
        assert_eq!(outcome.cleaning.primary_operator(), Some(giulia.id));
        assert!(outcome.cleaning.manually_modified);
    }

    #[tokio::test]
    async fn assigning_twice_keeps_one_entry() {
        let (store, uow, property) = seeded().await;
        let target = cleaning(&property, "2026-02-08");
        store.put_cleaning(target.clone()).await;
        let giulia = operator("Giulia", None, None);
        store.put_operator(giulia.clone()).await;
        let service = service(uow);

        service.assign(target.id, giulia.id, &admin()).await.unwrap();
        let again = service.assign(target.id, giulia.id, &admin()).await.unwrap();
        assert!(!again.changed);
        assert_eq!(again.cleaning.operators, vec![giulia.id]);
    }

    #[tokio::test]
    async fn second_operator_is_appended_after_primary() {
        let (store, uow, property) = seeded().await;
        let target = cleaning(&property, "2026-02-08");
        store.put_cleaning(target.clone()).await;
        let first = operator("Giulia", None, None);
        let second = operator("Marco", None, None);
        store.put_operator(first.clone()).await;
        store.put_operator(second.clone()).await;
        let service = service(uow);

        service.assign(target.id, first.id, &admin()).await.unwrap();
        let outcome = service.assign(target.id, second.id, &admin()).await.unwrap();
        assert_eq!(outcome.cleaning.operators, vec![first.id, second.id]);
        assert_eq!(outcome.cleaning.primary_operator(), Some(first.id));
    }

    #[tokio::test]
    async fn inactive_or_unknown_operator_is_rejected() {
        let (store, uow, property) = seeded().await;
        let target = cleaning(&property, "2026-02-08");
        store.put_cleaning(target.clone()).await;
        let mut retired = operator("Piero", None, None);
        retired.status = OperatorStatus::Inactive;
        store.put_operator(retired.clone()).await;
        let service = service(uow);

        let err = service.assign(target.id, retired.id, &admin()).await.unwrap_err();
        assert!(matches!(err, TurnoverError::InvalidState(_)));
        let err = service
            .assign(target.id, OperatorId::new(), &admin())
            .await
            .unwrap_err();
        assert!(matches!(err, TurnoverError::NotFound(_)));
    }

    #[tokio::test]
    async fn completed_cleaning_cannot_be_assigned() {
        let (store, uow, property) = seeded().await;
        let mut done = cleaning(&property, "2026-02-08");
        done.status = CleaningStatus::Completed;
        store.put_cleaning(done.clone()).await;
        let giulia = operator("Giulia", None, None);
        store.put_operator(giulia.clone()).await;

        let err = service(uow)
            .assign(done.id, giulia.id, &admin())
            .await
            .unwrap_err();
        assert!(matches!(err, TurnoverError::InvalidState(_)));
    }

    #[tokio::test]
    async fn owner_of_another_property_is_forbidden() {
        let (store, uow, property) = seeded().await;
        let target = cleaning(&property, "2026-02-08");
        store.put_cleaning(target.clone()).await;
        let giulia = operator("Giulia", None, None);
        store.put_operator(giulia.clone()).await;

        let stranger = Actor::Owner { id: UserId::new() };
        let err = service(uow.clone())
            .assign(target.id, giulia.id, &stranger)
            .await
            .unwrap_err();
        assert!(matches!(err, TurnoverError::Forbidden(_)));
        let stored = uow.cleanings.get(target.id).await.unwrap().unwrap();
        assert!(stored.operators.is_empty());
    }

    #[tokio::test]
    async fn removing_last_operator_reverts_to_scheduled() {
        let (store, uow, property) = seeded().await;
        let giulia = operator("Giulia", None, None);
        let marco = operator("Marco", None, None);
        let mut target = cleaning(&property, "2026-02-08");
        target.status = CleaningStatus::Assigned;
        target.operators = vec![giulia.id, marco.id];
        store.put_cleaning(target.clone()).await;
        let service = service(uow);

        let outcome = service.unassign(target.id, giulia.id, &admin()).await.unwrap();
        assert_eq!(outcome.cleaning.status, CleaningStatus::Assigned);
        assert_eq!(outcome.cleaning.primary_operator(), Some(marco.id));

        let outcome = service.unassign(target.id, marco.id, &admin()).await.unwrap();
        assert_eq!(outcome.cleaning.status, CleaningStatus::Scheduled);
        assert!(outcome.cleaning.operators.is_empty());

        let noop = service.unassign(target.id, marco.id, &admin()).await.unwrap();
        assert!(!noop.changed);
    }

    #[tokio::test]
    async fn suggestions_count_same_day_workload() {
        let (store, uow, property) = seeded().await;
        let target = cleaning(&property, "2026-02-08");
        store.put_cleaning(target.clone()).await;

        let here = property.location;
        let busy = operator("Anna", here, Some(4.0));
        let idle = operator("Luca", here, Some(4.0));
        store.put_operator(busy.clone()).await;
        store.put_operator(idle.clone()).await;

        let mut other_property = crate::domain::test_support::property();
        other_property.location = Some(GeoPoint::new(41.9, 12.5));
        store.put_property(other_property.clone()).await;
        for day in ["2026-02-08", "2026-02-08", "2026-02-09"] {
            let mut job = cleaning(&other_property, day);
            job.status = CleaningStatus::Assigned;
            job.operators = vec![busy.id];
            store.put_cleaning(job).await;
        }

        let ranked = service(uow)
            .suggestions(target.id, None, &admin())
            .await
            .unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].operator_id, idle.id);
        assert_eq!(ranked[0].assignments_today, 0);
        assert_eq!(ranked[1].assignments_today, 2);
    }
}
