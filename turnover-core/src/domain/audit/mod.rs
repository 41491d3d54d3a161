//! Batch consistency pass over cleanings, linen orders and bookings.
//!
//! Reads go through keyset-paginated listings. Repairs reuse the same
//! single-document writes as the live paths and are skipped in dry-run mode.

pub mod report;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{Days, NaiveDate, TimeDelta, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};
use turnover_model::{
    Booking, Cleaning, CleaningStatus, LinenOrder, PriceList, Property, PropertyId,
};

pub use report::{
    AuditReport, BackfillAction, DuplicateCluster, GhostOrder, OrderBackfill, OrphanKind,
    OrphanRecord, PriceRepair,
};

use super::exclusions::ExclusionLedger;
use super::linen::{OrderLinkageResolver, OrderResolution, resolver::ExistingOrder};
use crate::application::TurnoverUnitOfWork;
use crate::database::ports::{
    PageRequest,
    cleanings::{CleaningFilter, CleaningPatch},
    linen_orders::LinenOrderFilter,
};
use crate::error::{Result, TurnoverError};
use crate::settings::TurnoverSettings;

const PRICED_STATUSES: &[CleaningStatus] = &[
    CleaningStatus::Scheduled,
    CleaningStatus::Assigned,
    CleaningStatus::InProgress,
    CleaningStatus::Completed,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditOptions {
    pub dry_run: bool,
    pub property_id: Option<PropertyId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Which checks a pass runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditChecks {
    pub duplicates: bool,
    pub orphans: bool,
    pub ghost_orders: bool,
    pub missing_orders: bool,
    pub prices: bool,
}

impl AuditChecks {
    pub const ALL: AuditChecks = AuditChecks {
        duplicates: true,
        orphans: true,
        ghost_orders: true,
        missing_orders: true,
        prices: true,
    };

    pub const BACKFILL: AuditChecks = AuditChecks {
        duplicates: false,
        orphans: false,
        ghost_orders: false,
        missing_orders: true,
        prices: true,
    };
}

#[derive(Clone)]
pub struct ConsistencyAuditor {
    uow: Arc<TurnoverUnitOfWork>,
    ledger: ExclusionLedger,
    resolver: OrderLinkageResolver,
    settings: TurnoverSettings,
}

impl std::fmt::Debug for ConsistencyAuditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsistencyAuditor")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Per-pass caches.
struct AuditPass {
    options: AuditOptions,
    checks: AuditChecks,
    properties: HashMap<PropertyId, Option<Property>>,
    prices: PriceList,
    slots: BTreeMap<(PropertyId, NaiveDate), Vec<Cleaning>>,
    report: AuditReport,
}

impl ConsistencyAuditor {
    pub fn new(uow: Arc<TurnoverUnitOfWork>, settings: TurnoverSettings) -> Self {
        Self {
            ledger: ExclusionLedger::new(uow.exclusions.clone()),
            resolver: OrderLinkageResolver::new(uow.clone()),
            uow,
            settings,
        }
    }

    /// Full pass: every check, repairs unless `dry_run`.
    pub async fn audit(&self, options: AuditOptions) -> Result<AuditReport> {
        self.run(options, AuditChecks::ALL).await
    }

    /// Missing-order and price backfill over cleanings scheduled in the last
    /// `days_back` days or later.
    pub async fn backfill(&self, days_back: u32, dry_run: bool) -> Result<AuditReport> {
        self.backfill_since(Utc::now().date_naive(), days_back, dry_run)
            .await
    }

    pub async fn backfill_since(
        &self,
        today: NaiveDate,
        days_back: u32,
        dry_run: bool,
    ) -> Result<AuditReport> {
        let from = today
            .checked_sub_days(Days::new(u64::from(days_back)))
            .ok_or_else(|| {
                TurnoverError::InvalidInput(format!("days_back {days_back} is out of range"))
            })?;
        let options = AuditOptions {
            dry_run,
            from: Some(from),
            ..AuditOptions::default()
        };
        self.run(options, AuditChecks::BACKFILL).await
    }

    pub async fn run(&self, options: AuditOptions, checks: AuditChecks) -> Result<AuditReport> {
        if let (Some(from), Some(to)) = (options.from, options.to)
            && from > to
        {
            return Err(TurnoverError::InvalidInput(format!(
                "audit range starts after it ends ({from} > {to})"
            )));
        }

        let mut pass = AuditPass {
            options,
            checks,
            properties: HashMap::new(),
            prices: self.uow.inventory.price_list().await?,
            slots: BTreeMap::new(),
            report: AuditReport::new(options.dry_run),
        };

        self.scan_cleanings(&mut pass).await?;
        if checks.orphans || checks.ghost_orders {
            self.scan_orders(&mut pass).await?;
        }
        if checks.orphans {
            self.scan_bookings(&mut pass).await?;
        }
        if checks.duplicates {
            self.collect_duplicates(&mut pass);
        }

        let report = pass.report;
        info!(
            dry_run = report.dry_run,
            cleanings = report.scanned_cleanings,
            orders = report.scanned_orders,
            bookings = report.scanned_bookings,
            duplicates = report.duplicates.len(),
            orphans = report.orphans.len(),
            ghosts = report.ghost_orders.len(),
            missing_orders = report.missing_orders.len(),
            price_repairs = report.price_repairs.len(),
            errors = report.errors.len(),
            "audit pass finished"
        );
        Ok(report)
    }

    async fn property(&self, pass: &mut AuditPass, id: PropertyId) -> Result<Option<Property>> {
        if let Some(cached) = pass.properties.get(&id) {
            return Ok(cached.clone());
        }
        let loaded = self.uow.properties.get(id).await?;
        pass.properties.insert(id, loaded.clone());
        Ok(loaded)
    }

    async fn scan_cleanings(&self, pass: &mut AuditPass) -> Result<()> {
        let filter = CleaningFilter {
            property_id: pass.options.property_id,
            from: pass.options.from,
            to: pass.options.to,
            include_cancelled: true,
        };
        let mut page = PageRequest::first(self.settings.audit_page_size);
        loop {
            let batch = self.uow.cleanings.list_page(&filter, page).await?;
            for cleaning in batch.items {
                pass.report.scanned_cleanings += 1;
                self.inspect_cleaning(pass, cleaning).await?;
            }
            match batch.next {
                Some(cursor) => page = page.after(cursor),
                None => break,
            }
        }
        Ok(())
    }

    async fn inspect_cleaning(&self, pass: &mut AuditPass, cleaning: Cleaning) -> Result<()> {
        let Some(property) = self.property(pass, cleaning.property_id).await? else {
            if pass.checks.orphans {
                let deleted = !pass.options.dry_run && {
                    let result = self.uow.cleanings.delete(cleaning.id).await;
                    settle_orphan_delete(&mut pass.report, "cleaning", result)
                };
                pass.report.orphans.push(OrphanRecord {
                    kind: OrphanKind::Cleaning,
                    id: cleaning.id.to_uuid(),
                    property_id: cleaning.property_id,
                    deleted,
                });
            }
            return Ok(());
        };

        if !cleaning.is_active() {
            return Ok(());
        }

        if pass.checks.prices && cleaning.price <= Decimal::ZERO {
            self.repair_price(pass, &cleaning, &property).await;
        }
        if pass.checks.missing_orders && OrderLinkageResolver::needs_order(&cleaning, &property) {
            self.backfill_order(pass, &cleaning, &property).await?;
        }
        if pass.checks.duplicates {
            pass.slots
                .entry((cleaning.property_id, cleaning.scheduled_date))
                .or_default()
                .push(cleaning);
        }
        Ok(())
    }

    async fn repair_price(&self, pass: &mut AuditPass, cleaning: &Cleaning, property: &Property) {
        let after = property.cleaning_base_price;
        if after <= Decimal::ZERO {
            return;
        }

        let mut applied = false;
        if !pass.options.dry_run {
            let patch = CleaningPatch {
                price: Some(after),
                ..CleaningPatch::default()
            };
            match self
                .uow
                .cleanings
                .update_if_status(cleaning.id, PRICED_STATUSES, patch)
                .await
            {
                Ok(updated) => {
                    applied = updated.is_some();
                    info!(
                        cleaning_id = %cleaning.id,
                        before = %cleaning.price,
                        after = %after,
                        "cleaning price backfilled"
                    );
                }
                Err(err) => pass
                    .report
                    .errors
                    .push(format!("price backfill for cleaning {}: {err}", cleaning.id)),
            }
        }

        pass.report.price_repairs.push(PriceRepair {
            cleaning_id: cleaning.id,
            before: cleaning.price,
            after,
            applied,
        });
    }

    async fn backfill_order(
        &self,
        pass: &mut AuditPass,
        cleaning: &Cleaning,
        property: &Property,
    ) -> Result<()> {
        // An excluded slot is skipped even when a live cleaning sits on it,
        // e.g. one moved back onto a date it had vacated.
        if let Some(source) = cleaning.booking_source
            && self
                .ledger
                .is_excluded(property.id, cleaning.scheduled_date, source)
                .await?
        {
            return Ok(());
        }

        let existing = self.resolver.find_existing(cleaning).await?;
        let (action, order_id) = match (existing, pass.options.dry_run) {
            (Some(ExistingOrder::ById(_)), _) => return Ok(()),
            (Some(ExistingOrder::LegacySlot(order)), true) => {
                (BackfillAction::WouldBind, Some(order.id))
            }
            (None, true) => (BackfillAction::WouldCreate, None),
            (_, false) => match self.resolver.ensure_order_for(cleaning, property).await {
                Ok(Some(OrderResolution::Created(order))) => {
                    (BackfillAction::Created, Some(order.id))
                }
                Ok(Some(OrderResolution::Bound(order))) => (BackfillAction::Bound, Some(order.id)),
                Ok(Some(OrderResolution::Matched(_))) | Ok(None) => return Ok(()),
                Err(err) => {
                    pass.report
                        .errors
                        .push(format!("order backfill for cleaning {}: {err}", cleaning.id));
                    return Ok(());
                }
            },
        };

        if !pass.options.dry_run {
            info!(
                cleaning_id = %cleaning.id,
                action = ?action,
                order_id = ?order_id,
                "linen order backfilled"
            );
        }
        pass.report.missing_orders.push(OrderBackfill {
            cleaning_id: cleaning.id,
            scheduled_date: cleaning.scheduled_date,
            action,
            order_id,
        });
        Ok(())
    }

    async fn scan_orders(&self, pass: &mut AuditPass) -> Result<()> {
        let filter = LinenOrderFilter {
            property_id: pass.options.property_id,
            from: pass.options.from,
            to: pass.options.to,
            include_cancelled: true,
        };
        let mut page = PageRequest::first(self.settings.audit_page_size);
        loop {
            let batch = self.uow.linen_orders.list_page(&filter, page).await?;
            for order in batch.items {
                pass.report.scanned_orders += 1;
                self.inspect_order(pass, order).await?;
            }
            match batch.next {
                Some(cursor) => page = page.after(cursor),
                None => break,
            }
        }
        Ok(())
    }

    async fn inspect_order(&self, pass: &mut AuditPass, order: LinenOrder) -> Result<()> {
        if self.property(pass, order.property_id).await?.is_none() {
            if pass.checks.orphans {
                let deleted = !pass.options.dry_run && {
                    let result = self.uow.linen_orders.delete(order.id).await;
                    settle_orphan_delete(&mut pass.report, "linen order", result)
                };
                pass.report.orphans.push(OrphanRecord {
                    kind: OrphanKind::LinenOrder,
                    id: order.id.to_uuid(),
                    property_id: order.property_id,
                    deleted,
                });
            }
            return Ok(());
        }

        if pass.checks.ghost_orders
            && let Some(kind) = order.ghost_kind(&pass.prices)
        {
            pass.report.ghost_orders.push(GhostOrder {
                order_id: order.id,
                property_id: order.property_id,
                scheduled_date: order.scheduled_date,
                kind,
            });
        }
        Ok(())
    }

    async fn scan_bookings(&self, pass: &mut AuditPass) -> Result<()> {
        let mut page = PageRequest::first(self.settings.audit_page_size);
        loop {
            let batch = self.uow.bookings.list_page(page).await?;
            for booking in batch.items {
                if !booking_in_scope(&booking, &pass.options) {
                    continue;
                }
                pass.report.scanned_bookings += 1;
                if self.property(pass, booking.property_id).await?.is_some() {
                    continue;
                }
                let deleted = !pass.options.dry_run && {
                    let result = self.uow.bookings.delete(booking.id).await;
                    settle_orphan_delete(&mut pass.report, "booking", result)
                };
                pass.report.orphans.push(OrphanRecord {
                    kind: OrphanKind::Booking,
                    id: booking.id.to_uuid(),
                    property_id: booking.property_id,
                    deleted,
                });
            }
            match batch.next {
                Some(cursor) => page = page.after(cursor),
                None => break,
            }
        }
        Ok(())
    }

    fn collect_duplicates(&self, pass: &mut AuditPass) {
        let window = TimeDelta::from_std(self.settings.duplicate_race_window)
            .unwrap_or_else(|_| TimeDelta::seconds(60));
        for members in pass.slots.values() {
            if let Some(cluster) = DuplicateCluster::from_members(members, window) {
                warn!(
                    property_id = %cluster.property_id,
                    date = %cluster.date,
                    size = cluster.size(),
                    likely_sync_race = cluster.likely_sync_race,
                    "duplicate cleanings detected"
                );
                pass.report.duplicates.push(cluster);
            }
        }
    }
}

fn settle_orphan_delete(report: &mut AuditReport, kind: &str, result: Result<bool>) -> bool {
    match result {
        Ok(deleted) => {
            info!(kind, deleted, "orphan record removed");
            deleted
        }
        Err(err) => {
            warn!(kind, error = %err, "orphan delete failed");
            report.errors.push(format!("delete orphan {kind}: {err}"));
            false
        }
    }
}

fn booking_in_scope(booking: &Booking, options: &AuditOptions) -> bool {
    options
        .property_id
        .is_none_or(|id| booking.property_id == id)
        && options.from.is_none_or(|from| booking.check_out >= from)
        && options.to.is_none_or(|to| booking.check_out <= to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::access::Actor;
    use crate::domain::cascade::CascadeManager;
    use crate::domain::notifications::TracingNotifier;
    use crate::domain::test_support::{cleaning, date, order, property, seeded};
    use turnover_model::{
        BookingId, BookingSource, ExclusionReason, GhostOrderKind, LinenOrderStatus, OrderItem,
        UserId,
    };

    fn auditor(uow: Arc<TurnoverUnitOfWork>) -> ConsistencyAuditor {
        ConsistencyAuditor::new(uow, TurnoverSettings::default())
    }

    fn dry_run() -> AuditOptions {
        AuditOptions {
            dry_run: true,
            ..AuditOptions::default()
        }
    }

    #[tokio::test]
    async fn two_live_cleanings_on_one_slot_form_a_cluster() {
        let (store, uow, property) = seeded().await;
        let first = cleaning(&property, "2026-02-08");
        let second = cleaning(&property, "2026-02-08");
        let mut cancelled = cleaning(&property, "2026-02-08");
        cancelled.status = CleaningStatus::Cancelled;
        for c in [&first, &second, &cancelled] {
            store.put_cleaning(c.clone()).await;
        }

        let report = auditor(uow).audit(dry_run()).await.unwrap();

        assert_eq!(report.duplicates.len(), 1);
        let cluster = &report.duplicates[0];
        assert_eq!(cluster.size(), 2);
        assert_eq!(cluster.date, date("2026-02-08"));
        assert_eq!(cluster.shared_source, Some(BookingSource::Airbnb));
        assert!(cluster.likely_sync_race);
        assert!(!cluster.cleaning_ids.contains(&cancelled.id));
        assert_eq!(store.all_cleanings().await.len(), 3);
    }

    #[tokio::test]
    async fn ghost_orders_are_flagged_but_kept() {
        let (store, uow, property) = seeded().await;
        let mut zero_priced = order(&property, None, "2026-02-08", LinenOrderStatus::Pending);
        zero_priced.items = vec![OrderItem {
            item_id: "towel".into(),
            quantity: 3,
            unit_price: Some(Decimal::ZERO),
        }];
        let mut overridden = zero_priced.clone();
        overridden.id = turnover_model::LinenOrderId::new();
        overridden.total_price_override = Some(Decimal::new(15, 0));
        let mut empty = order(&property, None, "2026-02-09", LinenOrderStatus::Pending);
        empty.items.clear();
        for o in [&zero_priced, &overridden, &empty] {
            store.put_order(o.clone()).await;
        }

        let report = auditor(uow)
            .audit(AuditOptions::default())
            .await
            .unwrap();

        let kind_of = |id| {
            report
                .ghost_orders
                .iter()
                .find(|ghost| ghost.order_id == id)
                .map(|ghost| ghost.kind)
        };
        assert_eq!(kind_of(zero_priced.id), Some(GhostOrderKind::AllItemsZeroPrice));
        assert_eq!(kind_of(empty.id), Some(GhostOrderKind::NoItems));
        assert_eq!(kind_of(overridden.id), None);
        assert_eq!(store.all_orders().await.len(), 3);
    }

    fn booking_on(property: &Property, checkout: &str, uid: &str) -> Booking {
        let now = Utc::now();
        Booking {
            id: BookingId::new(),
            property_id: property.id,
            source: BookingSource::Airbnb,
            external_uid: uid.into(),
            check_in: date(checkout) - Days::new(2),
            check_out: date(checkout),
            guests_count: Some(2),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn consistent_store_yields_a_clean_report() {
        let (store, uow, property) = seeded().await;
        let live = cleaning(&property, "2026-02-08");
        store.put_cleaning(live.clone()).await;
        store
            .put_order(order(&property, Some(&live), "2026-02-08", LinenOrderStatus::Pending))
            .await;
        store.put_booking(booking_on(&property, "2026-02-08", "HM-1")).await;

        let report = auditor(uow).audit(AuditOptions::default()).await.unwrap();

        assert!(report.is_clean(), "{report:?}");
        assert_eq!(report.scanned_cleanings, 1);
        assert_eq!(report.scanned_orders, 1);
        assert_eq!(report.scanned_bookings, 1);
    }

    #[tokio::test]
    async fn orphans_are_reported_in_dry_run_and_deleted_otherwise() {
        let (store, uow, _property) = seeded().await;
        let gone = property();
        store.put_property(gone.clone()).await;
        store.put_cleaning(cleaning(&gone, "2026-02-08")).await;
        store
            .put_order(order(&gone, None, "2026-02-08", LinenOrderStatus::Pending))
            .await;
        store.put_booking(booking_on(&gone, "2026-02-08", "HM-9")).await;
        store.remove_property(gone.id).await;

        let auditor = auditor(uow.clone());
        let preview = auditor.audit(dry_run()).await.unwrap();
        assert_eq!(preview.orphans.len(), 3);
        assert!(preview.orphans.iter().all(|orphan| !orphan.deleted));
        assert!(
            preview
                .orphans
                .iter()
                .any(|orphan| orphan.kind == OrphanKind::Booking)
        );
        assert_eq!(store.all_cleanings().await.len(), 1);

        let applied = auditor.audit(AuditOptions::default()).await.unwrap();
        assert_eq!(applied.orphans.len(), 3);
        assert!(applied.orphans.iter().all(|orphan| orphan.deleted));
        assert!(store.all_cleanings().await.is_empty());
        assert!(store.all_orders().await.is_empty());
        let bookings = uow.bookings.list_page(PageRequest::first(10)).await.unwrap();
        assert!(bookings.items.is_empty());
    }

    #[tokio::test]
    async fn spread_out_duplicates_are_not_a_sync_race() {
        let (store, uow, property) = seeded().await;
        let first = cleaning(&property, "2026-02-08");
        let mut later = cleaning(&property, "2026-02-08");
        later.created_at = first.created_at + TimeDelta::minutes(5);
        store.put_cleaning(first).await;
        store.put_cleaning(later).await;

        let report = auditor(uow).audit(dry_run()).await.unwrap();

        let cluster = &report.duplicates[0];
        assert_eq!(cluster.creation_spread_ms, 300_000);
        assert!(!cluster.likely_sync_race);
    }

    #[tokio::test]
    async fn cluster_signals_reflect_shared_and_mixed_bookings() {
        let (store, uow, property) = seeded().await;
        let booking = BookingId::new();
        let mut same_a = cleaning(&property, "2026-02-08");
        same_a.booking_id = Some(booking);
        let mut same_b = cleaning(&property, "2026-02-08");
        same_b.booking_id = Some(booking);
        let mut mixed_a = cleaning(&property, "2026-02-09");
        mixed_a.booking_id = Some(BookingId::new());
        let mut mixed_b = cleaning(&property, "2026-02-09");
        mixed_b.booking_id = Some(BookingId::new());
        mixed_b.booking_source = Some(BookingSource::Booking);
        for c in [same_a, same_b, mixed_a, mixed_b] {
            store.put_cleaning(c).await;
        }

        let report = auditor(uow).audit(dry_run()).await.unwrap();
        let on = |day: &str| {
            report
                .duplicates
                .iter()
                .find(|cluster| cluster.date == date(day))
                .expect("cluster for date")
        };

        let shared = on("2026-02-08");
        assert_eq!(shared.shared_booking_id, Some(booking));
        assert_eq!(shared.shared_source, Some(BookingSource::Airbnb));

        let mixed = on("2026-02-09");
        assert_eq!(mixed.shared_booking_id, None);
        assert_eq!(mixed.shared_source, None);
    }

    #[tokio::test]
    async fn cancelled_ghost_orders_are_still_flagged() {
        let (store, uow, property) = seeded().await;
        let mut cancelled = order(&property, None, "2026-02-08", LinenOrderStatus::Cancelled);
        cancelled.items.clear();
        store.put_order(cancelled.clone()).await;

        let report = auditor(uow).audit(dry_run()).await.unwrap();

        assert_eq!(report.ghost_orders.len(), 1);
        assert_eq!(report.ghost_orders[0].order_id, cancelled.id);
        assert_eq!(report.ghost_orders[0].kind, GhostOrderKind::NoItems);
    }

    #[tokio::test]
    async fn cleaning_moved_back_onto_vacated_date_gets_no_backfill() {
        let (store, uow, property) = seeded().await;
        let live = cleaning(&property, "2026-02-08");
        store.put_cleaning(live.clone()).await;
        let cascade = CascadeManager::new(uow.clone(), Arc::new(TracingNotifier));
        let admin = Actor::Admin { id: UserId::new() };
        cascade
            .move_cleaning(live.id, date("2026-02-10"), None, &admin)
            .await
            .unwrap();
        cascade
            .move_cleaning(live.id, date("2026-02-08"), None, &admin)
            .await
            .unwrap();

        let report = auditor(uow).audit(AuditOptions::default()).await.unwrap();

        assert!(report.missing_orders.is_empty());
        assert!(store.all_orders().await.is_empty());
        assert_eq!(store.all_cleanings().await[0].scheduled_date, date("2026-02-08"));
    }

    #[tokio::test]
    async fn missing_order_is_backfilled_unless_excluded() {
        let (store, uow, property) = seeded().await;
        let needs_order = cleaning(&property, "2026-02-08");
        let excluded = cleaning(&property, "2026-02-09");
        store.put_cleaning(needs_order.clone()).await;
        store.put_cleaning(excluded.clone()).await;
        ExclusionLedger::new(uow.exclusions.clone())
            .record_exclusion(
                property.id,
                date("2026-02-09"),
                BookingSource::Airbnb,
                ExclusionReason::Cancelled,
                None,
                None,
            )
            .await
            .unwrap();

        let auditor = auditor(uow);
        let preview = auditor.audit(dry_run()).await.unwrap();
        assert_eq!(preview.missing_orders.len(), 1);
        assert_eq!(preview.missing_orders[0].action, BackfillAction::WouldCreate);
        assert!(store.all_orders().await.is_empty());

        let applied = auditor.audit(AuditOptions::default()).await.unwrap();
        assert_eq!(applied.missing_orders[0].action, BackfillAction::Created);
        let orders = store.all_orders().await;
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].cleaning_id, Some(needs_order.id));

        let again = auditor.audit(AuditOptions::default()).await.unwrap();
        assert!(again.missing_orders.is_empty());
    }

    #[tokio::test]
    async fn zero_price_is_backfilled_from_property() {
        let (store, uow, property) = seeded().await;
        let mut unpriced = cleaning(&property, "2026-02-08");
        unpriced.price = Decimal::ZERO;
        store.put_cleaning(unpriced.clone()).await;

        let report = auditor(uow).audit(AuditOptions::default()).await.unwrap();

        assert_eq!(report.price_repairs.len(), 1);
        assert!(report.price_repairs[0].applied);
        assert_eq!(
            store.all_cleanings().await[0].price,
            property.cleaning_base_price
        );
    }

    #[tokio::test]
    async fn backfill_only_touches_recent_cleanings() {
        let (store, uow, property) = seeded().await;
        let mut old = cleaning(&property, "2026-01-01");
        old.price = Decimal::ZERO;
        let mut recent = cleaning(&property, "2026-02-06");
        recent.price = Decimal::ZERO;
        store.put_cleaning(old.clone()).await;
        store.put_cleaning(recent.clone()).await;

        let report = auditor(uow)
            .backfill_since(date("2026-02-08"), 7, false)
            .await
            .unwrap();

        assert_eq!(report.price_repairs.len(), 1);
        assert_eq!(report.price_repairs[0].cleaning_id, recent.id);
        assert_eq!(report.missing_orders.len(), 1);
        assert!(report.duplicates.is_empty());
        assert_eq!(report.scanned_orders, 0);
    }

    #[tokio::test]
    async fn reversed_range_is_rejected() {
        let (_store, uow, _property) = seeded().await;
        let options = AuditOptions {
            from: Some(date("2026-02-10")),
            to: Some(date("2026-02-01")),
            ..dry_run()
        };
        let err = auditor(uow).audit(options).await.unwrap_err();
        assert!(matches!(err, TurnoverError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn paging_covers_every_cleaning() {
        let (store, uow, property) = seeded().await;
        for day in 1..=7 {
            store
                .put_cleaning(cleaning(&property, &format!("2026-03-{day:02}")))
                .await;
        }
        let settings = TurnoverSettings {
            audit_page_size: 3,
            ..TurnoverSettings::default()
        };
        let report = ConsistencyAuditor::new(uow, settings)
            .audit(dry_run())
            .await
            .unwrap();
        assert_eq!(report.scanned_cleanings, 7);
    }
}
