//! Read-only operator ranking for a cleaning.

use std::cmp::Reverse;
use std::collections::HashMap;

use ordered_float::OrderedFloat;
use serde::Serialize;
use turnover_model::{Cleaning, GeoPoint, Operator, OperatorId};

use crate::settings::AdvisorWeights;

/// Distance at which the proximity score halves.
const PROXIMITY_HALF_KM: f64 = 10.0;
const MAX_RATING: f64 = 5.0;
const NEUTRAL: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperatorSuggestion {
    pub operator_id: OperatorId,
    pub name: String,
    pub score: f64,
    pub distance_km: Option<f64>,
    pub assignments_today: usize,
    pub rating: Option<f32>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AssignmentAdvisor {
    weights: AdvisorWeights,
}

impl AssignmentAdvisor {
    pub fn new(weights: AdvisorWeights) -> Self {
        Self { weights }
    }

    /// Rank `candidates` for `cleaning`, best first. Inactive operators and
    /// those already on the cleaning are left out; ties go to the lower id.
    pub fn suggest(
        &self,
        cleaning: &Cleaning,
        site: Option<GeoPoint>,
        candidates: &[Operator],
        todays_assignments: &HashMap<OperatorId, usize>,
        limit: usize,
    ) -> Vec<OperatorSuggestion> {
        let mut ranked: Vec<OperatorSuggestion> = candidates
            .iter()
            .filter(|operator| operator.is_active())
            .filter(|operator| !cleaning.operators.contains(&operator.id))
            .map(|operator| {
                let assignments_today =
                    todays_assignments.get(&operator.id).copied().unwrap_or(0);
                let distance_km = site
                    .zip(operator.last_known_location)
                    .map(|(site, here)| site.distance_km(&here));
                OperatorSuggestion {
                    operator_id: operator.id,
                    name: operator.name.clone(),
                    score: self.score(distance_km, assignments_today, operator.rating),
                    distance_km,
                    assignments_today,
                    rating: operator.rating,
                }
            })
            .collect();

        ranked.sort_by_key(|s| (Reverse(OrderedFloat(s.score)), s.operator_id));
        ranked.truncate(limit);
        ranked
    }

    fn score(&self, distance_km: Option<f64>, assignments: usize, rating: Option<f32>) -> f64 {
        let proximity = distance_km
            .map(|km| 1.0 / (1.0 + km.max(0.0) / PROXIMITY_HALF_KM))
            .unwrap_or(NEUTRAL);
        let workload = 1.0 / (1.0 + assignments as f64);
        let rating = rating
            .map(|r| (f64::from(r) / MAX_RATING).clamp(0.0, 1.0))
            .unwrap_or(NEUTRAL);

        self.weights.proximity * proximity
            + self.weights.workload * workload
            + self.weights.rating * rating
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{cleaning, operator, property};
    use turnover_model::OperatorStatus;

    fn advisor() -> AssignmentAdvisor {
        AssignmentAdvisor::new(AdvisorWeights::default())
    }

    #[test]
    fn nearer_operator_ranks_first() {
        let property = property();
        let cleaning = cleaning(&property, "2026-02-08");
        let near = operator("Giulia", Some(GeoPoint::new(41.8902, 12.4922)), Some(4.0));
        let far = operator("Marco", Some(GeoPoint::new(45.4642, 9.1900)), Some(4.0));

        let ranked = advisor().suggest(
            &cleaning,
            property.location,
            &[far.clone(), near.clone()],
            &HashMap::new(),
            5,
        );
        assert_eq!(ranked[0].operator_id, near.id);
        assert!(ranked[0].distance_km.unwrap() < 5.0);
        assert!(ranked[1].distance_km.unwrap() > 400.0);
    }

    #[test]
    fn missing_coordinates_are_neutral_not_excluded() {
        let property = property();
        let cleaning = cleaning(&property, "2026-02-08");
        let unknown = operator("Sara", None, None);

        let ranked = advisor().suggest(
            &cleaning,
            property.location,
            &[unknown.clone()],
            &HashMap::new(),
            5,
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].distance_km, None);
        let weights = AdvisorWeights::default();
        let expected = weights.proximity * 0.5 + weights.workload + weights.rating * 0.5;
        assert!((ranked[0].score - expected).abs() < 1e-9);
    }

    #[test]
    fn busier_operator_ranks_lower() {
        let property = property();
        let cleaning = cleaning(&property, "2026-02-08");
        let idle = operator("Luca", None, None);
        let busy = operator("Anna", None, None);
        let workload = HashMap::from([(busy.id, 3)]);

        let ranked = advisor().suggest(
            &cleaning,
            None,
            &[busy.clone(), idle.clone()],
            &workload,
            5,
        );
        assert_eq!(ranked[0].operator_id, idle.id);
        assert_eq!(ranked[1].assignments_today, 3);
    }

    #[test]
    fn inactive_and_already_assigned_are_skipped() {
        let property = property();
        let mut cleaning = cleaning(&property, "2026-02-08");
        let mut inactive = operator("Piero", None, None);
        inactive.status = OperatorStatus::Inactive;
        let assigned = operator("Elena", None, None);
        let free = operator("Franco", None, None);
        cleaning.operators.push(assigned.id);

        let ranked = advisor().suggest(
            &cleaning,
            None,
            &[inactive, assigned, free.clone()],
            &HashMap::new(),
            5,
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].operator_id, free.id);
    }

    #[test]
    fn equal_scores_break_ties_by_id_and_respect_limit() {
        let property = property();
        let cleaning = cleaning(&property, "2026-02-08");
        let mut pool: Vec<Operator> = (0..4)
            .map(|i| operator(&format!("op-{i}"), None, Some(3.0)))
            .collect();
        pool.reverse();

        let ranked = advisor().suggest(&cleaning, None, &pool, &HashMap::new(), 2);
        let mut ids: Vec<OperatorId> = pool.iter().map(|o| o.id).collect();
        ids.sort();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].operator_id, ids[0]);
        assert_eq!(ranked[1].operator_id, ids[1]);
    }
}
