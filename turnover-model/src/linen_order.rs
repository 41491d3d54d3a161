use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::ids::{CleaningId, LinenOrderId, PropertyId};
use crate::macros::storage_labels;

/// Delivery lifecycle of a linen order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum LinenOrderStatus {
    Pending,
    Assigned,
    InTransit,
    Delivered,
    Completed,
    Cancelled,
}

storage_labels!(LinenOrderStatus, "linen order status", {
    Pending => "PENDING",
    Assigned => "ASSIGNED",
    InTransit => "IN_TRANSIT",
    Delivered => "DELIVERED",
    Completed => "COMPLETED",
    Cancelled => "CANCELLED",
});

impl LinenOrderStatus {
    /// Orders that have not left the warehouse; the only ones a cascade may
    /// cancel or reschedule.
    pub const NOT_DISPATCHED: &'static [LinenOrderStatus] =
        &[LinenOrderStatus::Pending, LinenOrderStatus::Assigned];

    pub fn is_active(&self) -> bool {
        !matches!(self, LinenOrderStatus::Cancelled)
    }

    pub fn is_cancellable(&self) -> bool {
        Self::NOT_DISPATCHED.contains(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrderItem {
    pub item_id: String,
    pub quantity: u32,
    /// Price captured when the order was written. `None` defers to the
    /// current price list.
    pub unit_price: Option<Decimal>,
}

/// Inventory price list, `item id -> unit price`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PriceList(pub HashMap<String, Decimal>);

impl PriceList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, item_id: impl Into<String>, price: Decimal) -> Self {
        self.0.insert(item_id.into(), price);
        self
    }

    pub fn get(&self, item_id: &str) -> Option<Decimal> {
        self.0.get(item_id).copied()
    }
}

/// Why an order looks like a ghost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum GhostOrderKind {
    NoItems,
    AllItemsZeroPrice,
}

storage_labels!(GhostOrderKind, "ghost order kind", {
    NoItems => "NO_ITEMS",
    AllItemsZeroPrice => "ALL_ITEMS_ZERO_PRICE",
});

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinenOrder {
    pub id: LinenOrderId,
    pub property_id: PropertyId,
    /// `None` only for rows written before orders were bound to cleanings.
    pub cleaning_id: Option<CleaningId>,
    pub scheduled_date: NaiveDate,
    pub status: LinenOrderStatus,
    #[cfg_attr(feature = "serde", serde(default))]
    pub items: Vec<OrderItem>,
    pub total_price_override: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LinenOrder {
    /// Sum of `quantity x effective unit price`, ignoring any override.
    pub fn items_total(&self, prices: &PriceList) -> Decimal {
        self.items
            .iter()
            .map(|item| {
                let unit = item
                    .unit_price
                    .or_else(|| prices.get(&item.item_id))
                    .unwrap_or(Decimal::ZERO);
                unit * Decimal::from(item.quantity)
            })
            .sum()
    }

    /// The billed total: the override when present, otherwise the item sum.
    pub fn total(&self, prices: &PriceList) -> Decimal {
        self.total_price_override
            .unwrap_or_else(|| self.items_total(prices))
    }

    pub fn ghost_kind(&self, prices: &PriceList) -> Option<GhostOrderKind> {
        if self.items.is_empty() {
            return Some(GhostOrderKind::NoItems);
        }

        let has_positive_override = self
            .total_price_override
            .is_some_and(|value| value > Decimal::ZERO);
        if !has_positive_override && self.items_total(prices).is_zero() {
            return Some(GhostOrderKind::AllItemsZeroPrice);
        }

        None
    }

    /// Whether this order belongs to the given cleaning: bound by id, or a
    /// legacy unbound row on the same slot.
    pub fn is_bound_to(
        &self,
        cleaning_id: CleaningId,
        property_id: PropertyId,
        date: NaiveDate,
    ) -> bool {
        match self.cleaning_id {
            Some(bound) => bound == cleaning_id,
            None => self.property_id == property_id && self.scheduled_date == date,
        }
    }
}
