use async_trait::async_trait;
use turnover_model::{Operator, OperatorId};

use crate::error::Result;

/// Operator directory.
#[async_trait]
pub trait OperatorsRepository: Send + Sync {
    async fn get(&self, id: OperatorId) -> Result<Option<Operator>>;

    async fn list_active(&self) -> Result<Vec<Operator>>;
}
