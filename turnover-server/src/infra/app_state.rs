use std::{fmt, sync::Arc};

use turnover_core::{
    TurnoverSettings, TurnoverUnitOfWork,
    domain::{
        assignment::AssignmentService, audit::ConsistencyAuditor, cascade::CascadeManager,
        notifications::NotificationDispatcher, sync::CleaningSynchronizer,
    },
};

use crate::infra::config::Config;

/// Shared handler state. Cloned per request; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub unit_of_work: Arc<TurnoverUnitOfWork>,
    pub config: Arc<Config>,
    pub synchronizer: CleaningSynchronizer,
    pub cascade: CascadeManager,
    pub auditor: ConsistencyAuditor,
    pub assignments: AssignmentService,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        unit_of_work: Arc<TurnoverUnitOfWork>,
        config: Arc<Config>,
        notifier: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        let settings: TurnoverSettings = config.turnover_settings();
        Self {
            synchronizer: CleaningSynchronizer::new(unit_of_work.clone(), settings.clone()),
            cascade: CascadeManager::new(unit_of_work.clone(), notifier.clone()),
            auditor: ConsistencyAuditor::new(unit_of_work.clone(), settings.clone()),
            assignments: AssignmentService::new(unit_of_work.clone(), notifier, settings),
            unit_of_work,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
