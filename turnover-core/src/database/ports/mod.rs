//! Repository ports consumed by the domain services.
//!
//! Every write is a single-document operation. Status transitions are
//! compare-and-set: the adapter applies the change only while the stored
//! status is still one of the expected values and reports `None` otherwise.

use uuid::Uuid;

pub mod bookings;
pub mod cancellations;
pub mod cleanings;
pub mod exclusions;
pub mod inventory;
pub mod linen_orders;
pub mod operators;
pub mod properties;

/// Keyset pagination over time-ordered ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub after: Option<Uuid>,
    pub limit: usize,
}

impl PageRequest {
    pub fn first(limit: usize) -> Self {
        Self {
            after: None,
            limit: limit.max(1),
        }
    }

    pub fn after(self, cursor: Uuid) -> Self {
        Self {
            after: Some(cursor),
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor for the following page, `None` once exhausted.
    pub next: Option<Uuid>,
}

impl<T> Page<T> {
    /// Builds a page from up to `limit` ordered items, deriving the cursor
    /// from the last item when the page is full.
    pub fn from_items(items: Vec<T>, limit: usize, key: impl Fn(&T) -> Uuid) -> Self {
        let next = if items.len() >= limit {
            items.last().map(key)
        } else {
            None
        };
        Self { items, next }
    }
}
