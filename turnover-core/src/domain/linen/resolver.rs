use std::sync::Arc;

use tracing::{debug, info};
use turnover_model::{
    Cleaning, CleaningStatus, LinenOrder, LinenOrderStatus, OrderItem, Property,
};

use super::manifest::manifest_for;
use crate::application::TurnoverUnitOfWork;
use crate::database::ports::linen_orders::NewLinenOrder;
use crate::error::{Result, TurnoverError};

/// How the resolver satisfied a cleaning's order requirement.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderResolution {
    /// An order already carried the cleaning id.
    Matched(LinenOrder),
    /// A legacy unbound order on the same slot was bound to the cleaning.
    Bound(LinenOrder),
    Created(LinenOrder),
}

impl OrderResolution {
    pub fn order(&self) -> &LinenOrder {
        match self {
            OrderResolution::Matched(order)
            | OrderResolution::Bound(order)
            | OrderResolution::Created(order) => order,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, OrderResolution::Created(_))
    }
}

/// Existing order found for a cleaning without writing anything.
#[derive(Debug, Clone, PartialEq)]
pub enum ExistingOrder {
    ById(LinenOrder),
    /// Unbound row on the cleaning's slot, still to be bound.
    LegacySlot(LinenOrder),
}

#[derive(Clone)]
pub struct OrderLinkageResolver {
    uow: Arc<TurnoverUnitOfWork>,
}

impl std::fmt::Debug for OrderLinkageResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderLinkageResolver").finish_non_exhaustive()
    }
}

impl OrderLinkageResolver {
    pub fn new(uow: Arc<TurnoverUnitOfWork>) -> Self {
        Self { uow }
    }

    /// Make sure `cleaning` has exactly one live order. Returns `None` when
    /// the cleaning needs none.
    pub async fn ensure_order(&self, cleaning: &Cleaning) -> Result<Option<OrderResolution>> {
        if cleaning.status == CleaningStatus::Cancelled {
            return Ok(None);
        }
        let property = self
            .uow
            .properties
            .get(cleaning.property_id)
            .await?
            .ok_or_else(|| TurnoverError::not_found("property", cleaning.property_id))?;
        self.ensure_order_for(cleaning, &property).await
    }

    /// Same as [`ensure_order`](Self::ensure_order) with the property already
    /// loaded by the caller.
    pub async fn ensure_order_for(
        &self,
        cleaning: &Cleaning,
        property: &Property,
    ) -> Result<Option<OrderResolution>> {
        if !Self::needs_order(cleaning, property) {
            return Ok(None);
        }

        match self.find_existing(cleaning).await? {
            Some(ExistingOrder::ById(order)) => {
                return Ok(Some(OrderResolution::Matched(order)));
            }
            Some(ExistingOrder::LegacySlot(order)) => {
                if let Some(bound) = self
                    .uow
                    .linen_orders
                    .bind_cleaning(order.id, cleaning.id)
                    .await?
                {
                    info!(
                        order_id = %bound.id,
                        cleaning_id = %cleaning.id,
                        "bound legacy linen order to cleaning"
                    );
                    return Ok(Some(OrderResolution::Bound(bound)));
                }
                // Lost the race for the legacy row; whoever won may have
                // bound it to this very cleaning.
                if let Some(ExistingOrder::ById(order)) = self.find_existing(cleaning).await? {
                    return Ok(Some(OrderResolution::Matched(order)));
                }
            }
            None => {}
        }

        let created = self.create_order(cleaning, property).await?;
        Ok(Some(OrderResolution::Created(created)))
    }

    pub fn needs_order(cleaning: &Cleaning, property: &Property) -> bool {
        cleaning.status != CleaningStatus::Cancelled && !property.uses_own_linen
    }

    /// Read-only lookup: by cleaning id first, then a legacy unbound row on
    /// the same `(property, date)`. Cancelled orders never match.
    pub async fn find_existing(&self, cleaning: &Cleaning) -> Result<Option<ExistingOrder>> {
        let by_id = self.uow.linen_orders.find_by_cleaning(cleaning.id).await?;
        if let Some(order) = by_id.into_iter().find(|order| order.status.is_active()) {
            return Ok(Some(ExistingOrder::ById(order)));
        }

        let slot = self
            .uow
            .linen_orders
            .find_for_slot(cleaning.property_id, cleaning.scheduled_date)
            .await?;
        Ok(slot
            .into_iter()
            .find(|order| order.cleaning_id.is_none() && order.status.is_active())
            .map(ExistingOrder::LegacySlot))
    }

    async fn create_order(&self, cleaning: &Cleaning, property: &Property) -> Result<LinenOrder> {
        let prices = self.uow.inventory.price_list().await?;
        let items: Vec<OrderItem> = manifest_for(property, cleaning.guests_count)
            .into_iter()
            .map(|line| OrderItem {
                unit_price: prices.get(&line.item_id),
                item_id: line.item_id,
                quantity: line.quantity,
            })
            .collect();

        let order = self
            .uow
            .linen_orders
            .insert(NewLinenOrder {
                property_id: cleaning.property_id,
                cleaning_id: Some(cleaning.id),
                scheduled_date: cleaning.scheduled_date,
                status: LinenOrderStatus::Pending,
                items,
                total_price_override: None,
            })
            .await?;

        debug!(
            order_id = %order.id,
            cleaning_id = %cleaning.id,
            items = order.items.len(),
            total = %order.total(&prices),
            "linen order created"
        );
        Ok(order)
    }
}
