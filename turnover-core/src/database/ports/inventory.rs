use async_trait::async_trait;
use turnover_model::PriceList;

use crate::error::Result;

#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Current unit price of every stocked linen item.
    async fn price_list(&self) -> Result<PriceList>;
}
