use async_trait::async_trait;
use turnover_model::{Property, PropertyId};

use crate::error::Result;

/// Read-only view of the property catalogue.
#[async_trait]
pub trait PropertiesRepository: Send + Sync {
    async fn get(&self, id: PropertyId) -> Result<Option<Property>>;
}
