//! Adapter behaviour against a live Postgres. Run with
//! `DATABASE_URL=... cargo test -p turnover-core -- --ignored`.

use std::sync::Arc;

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sqlx::PgPool;
use turnover_core::database::ports::{
    PageRequest,
    bookings::NewBooking,
    cleanings::{CleaningFilter, CleaningPatch, NewCleaning},
    exclusions::NewSyncExclusion,
    linen_orders::NewLinenOrder,
};
use turnover_core::domain::{access::Actor, cascade::CascadeManager, notifications::TracingNotifier};
use turnover_core::domain::audit::{AuditOptions, ConsistencyAuditor, OrphanKind};
use turnover_core::domain::sync::CleaningSynchronizer;
use turnover_core::{TurnoverSettings, TurnoverUnitOfWork};
use turnover_model::{
    BookingSource, BookingTuple, CleaningStatus, ExclusionReason, LinenOrderStatus,
    OrderItem, PropertyId, UserId,
};
use uuid::Uuid;

fn day(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

async fn seed_property(pool: &PgPool) -> Result<PropertyId> {
    let id = Uuid::now_v7();
    sqlx::query(
        r#"
        INSERT INTO properties (
            id, name, owner_id, active, cleaning_base_price,
            max_guests, bedrooms, bathrooms, checkout_time
        )
        VALUES ($1, 'Navigli flat', $2, TRUE, 55.00, 4, 2, 1, '11:00')
        "#,
    )
    .bind(id)
    .bind(Uuid::now_v7())
    .execute(pool)
    .await?;
    sqlx::query(
        "INSERT INTO inventory_items (item_id, unit_price) VALUES ('bath_towel', 2.50), ('double_sheet', 3.00)",
    )
    .execute(pool)
    .await?;
    Ok(PropertyId(id))
}

fn unit_of_work(pool: PgPool) -> Arc<TurnoverUnitOfWork> {
    Arc::new(TurnoverUnitOfWork::from_postgres(pool).unwrap())
}

fn new_cleaning(property_id: PropertyId, date: &str) -> NewCleaning {
    NewCleaning {
        property_id,
        scheduled_date: day(date),
        scheduled_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
        status: CleaningStatus::Scheduled,
        booking_source: Some(BookingSource::Booking),
        booking_id: None,
        operators: Vec::new(),
        manually_modified: false,
        price: Decimal::new(5500, 2),
        guests_count: 4,
    }
}

#[sqlx::test(migrator = "turnover_core::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn cleaning_status_guard_is_compare_and_set(pool: PgPool) -> Result<()> {
    let property_id = seed_property(&pool).await?;
    let uow = unit_of_work(pool);

    let cleaning = uow
        .cleanings
        .insert(new_cleaning(property_id, "2026-03-01"))
        .await?;

    let moved = uow
        .cleanings
        .update_if_status(
            cleaning.id,
            CleaningStatus::MUTABLE,
            CleaningPatch {
                scheduled_date: Some(day("2026-03-02")),
                original_date: Some(day("2026-03-01")),
                manually_modified: Some(true),
                ..CleaningPatch::default()
            },
        )
        .await?
        .expect("guard holds");
    assert_eq!(moved.scheduled_date, day("2026-03-02"));
    assert_eq!(moved.original_date, Some(day("2026-03-01")));

    let second = uow
        .cleanings
        .update_if_status(
            cleaning.id,
            CleaningStatus::MUTABLE,
            CleaningPatch {
                scheduled_date: Some(day("2026-03-03")),
                original_date: Some(day("2026-03-02")),
                ..CleaningPatch::default()
            },
        )
        .await?
        .expect("guard holds");
    assert_eq!(second.original_date, Some(day("2026-03-01")));

    let stale = uow
        .cleanings
        .update_if_status(
            cleaning.id,
            &[CleaningStatus::InProgress],
            CleaningPatch {
                status: Some(CleaningStatus::Completed),
                ..CleaningPatch::default()
            },
        )
        .await?;
    assert!(stale.is_none());
    Ok(())
}

#[sqlx::test(migrator = "turnover_core::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn slot_lookup_and_pages_skip_cancelled(pool: PgPool) -> Result<()> {
    let property_id = seed_property(&pool).await?;
    let uow = unit_of_work(pool);

    let kept = uow
        .cleanings
        .insert(new_cleaning(property_id, "2026-03-01"))
        .await?;
    let dropped = uow
        .cleanings
        .insert(new_cleaning(property_id, "2026-03-01"))
        .await?;
    uow.cleanings
        .update_if_status(
            dropped.id,
            CleaningStatus::MUTABLE,
            CleaningPatch {
                status: Some(CleaningStatus::Cancelled),
                ..CleaningPatch::default()
            },
        )
        .await?;

    let slot = uow
        .cleanings
        .find_active_for_slot(property_id, day("2026-03-01"))
        .await?;
    assert_eq!(slot.len(), 1);
    assert_eq!(slot[0].id, kept.id);

    let page = uow
        .cleanings
        .list_page(&CleaningFilter::active(), PageRequest::first(10))
        .await?;
    assert_eq!(page.items.len(), 1);
    assert!(page.next.is_none());
    Ok(())
}

#[sqlx::test(migrator = "turnover_core::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn exclusion_lookup_matches_source(pool: PgPool) -> Result<()> {
    let property_id = seed_property(&pool).await?;
    let uow = unit_of_work(pool);

    uow.exclusions
        .append(NewSyncExclusion {
            property_id,
            original_date: day("2026-03-01"),
            booking_source: BookingSource::Airbnb,
            reason: ExclusionReason::Cancelled,
            new_date: None,
            cleaning_id: None,
        })
        .await?;

    assert!(
        uow.exclusions
            .exists(property_id, day("2026-03-01"), BookingSource::Airbnb)
            .await?
    );
    assert!(
        !uow.exclusions
            .exists(property_id, day("2026-03-01"), BookingSource::Booking)
            .await?
    );
    Ok(())
}

#[sqlx::test(migrator = "turnover_core::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn legacy_order_binds_once(pool: PgPool) -> Result<()> {
    let property_id = seed_property(&pool).await?;
    let uow = unit_of_work(pool);

    let cleaning = uow
        .cleanings
        .insert(new_cleaning(property_id, "2026-03-01"))
        .await?;
    let legacy = uow
        .linen_orders
        .insert(NewLinenOrder {
            property_id,
            cleaning_id: None,
            scheduled_date: day("2026-03-01"),
            status: LinenOrderStatus::Pending,
            items: vec![OrderItem {
                item_id: "bath_towel".into(),
                quantity: 3,
                unit_price: Some(Decimal::new(250, 2)),
            }],
            total_price_override: None,
        })
        .await?;

    let bound = uow
        .linen_orders
        .bind_cleaning(legacy.id, cleaning.id)
        .await?
        .expect("unbound row");
    assert_eq!(bound.cleaning_id, Some(cleaning.id));
    assert_eq!(bound.items, legacy.items);

    let again = uow.linen_orders.bind_cleaning(legacy.id, cleaning.id).await?;
    assert!(again.is_none());
    assert_eq!(uow.linen_orders.find_by_cleaning(cleaning.id).await?.len(), 1);
    Ok(())
}

#[sqlx::test(migrator = "turnover_core::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn cancelled_booking_slot_stays_cancelled_across_syncs(pool: PgPool) -> Result<()> {
    let property_id = seed_property(&pool).await?;
    let uow = unit_of_work(pool);
    let sync = CleaningSynchronizer::new(uow.clone(), TurnoverSettings::default());

    let check_out = day("2026-03-05").and_hms_opt(10, 0, 0).unwrap();
    let batch = vec![BookingTuple {
        property_id,
        check_in: check_out - chrono::Duration::days(2),
        check_out,
        source: BookingSource::Booking,
        external_uid: "BK-1042".into(),
    }];

    let first = sync.reconcile(&batch).await?;
    assert_eq!(first.created, 1);
    assert_eq!(first.orders_created, 1);
    let repeat = sync.reconcile(&batch).await?;
    assert_eq!(repeat.created, 0);

    let cleaning = uow
        .cleanings
        .find_active_for_slot(property_id, day("2026-03-05"))
        .await?
        .remove(0);
    let admin = Actor::Admin { id: UserId::new() };
    let cascade = CascadeManager::new(uow.clone(), Arc::new(TracingNotifier));
    let outcome = cascade.cancel(cleaning.id, "owner blocked dates", &admin).await?;
    assert_eq!(outcome.orders_cancelled, 1);

    let after = sync.reconcile(&batch).await?;
    assert_eq!(after.created, 0);
    assert!(
        uow.cleanings
            .find_active_for_slot(property_id, day("2026-03-05"))
            .await?
            .is_empty()
    );
    Ok(())
}

#[sqlx::test(migrator = "turnover_core::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn deleted_property_leaves_orphans_for_the_audit_and_keeps_exclusions(
    pool: PgPool,
) -> Result<()> {
    let property_id = seed_property(&pool).await?;
    let uow = unit_of_work(pool.clone());

    let cleaning = uow
        .cleanings
        .insert(new_cleaning(property_id, "2026-03-01"))
        .await?;
    uow.linen_orders
        .insert(NewLinenOrder {
            property_id,
            cleaning_id: Some(cleaning.id),
            scheduled_date: day("2026-03-01"),
            status: LinenOrderStatus::Pending,
            items: Vec::new(),
            total_price_override: None,
        })
        .await?;
    uow.bookings
        .upsert(NewBooking {
            property_id,
            source: BookingSource::Booking,
            external_uid: "BK-2210".into(),
            check_in: day("2026-02-27"),
            check_out: day("2026-03-01"),
            guests_count: Some(2),
        })
        .await?;
    uow.exclusions
        .append(NewSyncExclusion {
            property_id,
            original_date: day("2026-02-20"),
            booking_source: BookingSource::Booking,
            reason: ExclusionReason::Cancelled,
            new_date: None,
            cleaning_id: None,
        })
        .await?;

    sqlx::query("DELETE FROM properties WHERE id = $1")
        .bind(property_id.0)
        .execute(&pool)
        .await?;

    let report = ConsistencyAuditor::new(uow.clone(), TurnoverSettings::default())
        .audit(AuditOptions::default())
        .await?;

    let mut kinds: Vec<OrphanKind> = report.orphans.iter().map(|orphan| orphan.kind).collect();
    kinds.sort_by_key(|kind| format!("{kind:?}"));
    assert_eq!(
        kinds,
        vec![OrphanKind::Booking, OrphanKind::Cleaning, OrphanKind::LinenOrder]
    );
    assert!(report.orphans.iter().all(|orphan| orphan.deleted));
    assert!(uow.cleanings.get(cleaning.id).await?.is_none());
    assert!(
        uow.exclusions
            .exists(property_id, day("2026-02-20"), BookingSource::Booking)
            .await?
    );
    Ok(())
}
