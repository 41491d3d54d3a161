//! # Turnover Core
//!
//! Core library for the turnover engine. It keeps short-term-rental cleanings,
//! the linen orders feeding them, and the external booking feeds that create
//! them consistent with each other.
//!
//! ## Overview
//!
//! - **Cleaning Synchronizer**: turns booking tuples into cleanings, skipping
//!   slots the exclusion ledger marks as handled
//! - **Linen Order Linkage**: binds or creates the linen order a cleaning
//!   needs, priced from the inventory price list
//! - **Cascades**: cancel, move and force-delete applied across the cleaning,
//!   its tombstone and its bound orders
//! - **Consistency Auditor**: duplicate, orphan, ghost-order, missing-order and
//!   price checks with optional repair
//! - **Assignment**: operator assignment and candidate ranking
//!
//! ## Feature Flags
//!
//! - `database`: PostgreSQL adapters (SQLx) and the embedded [`MIGRATOR`]
//! - `test-utils`: exposes the in-memory store for downstream tests
//!
//! ## Architecture
//!
//! - [`database::ports`]: repository traits, one per collection
//! - [`application`]: the [`TurnoverUnitOfWork`] bundling those ports
//! - [`domain`]: services operating over the unit of work
//! - [`settings`]: runtime knobs shared by the services
//!
//! ## Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use turnover_core::{
//!     TurnoverError, TurnoverUnitOfWork, domain::sync::CleaningSynchronizer,
//!     settings::TurnoverSettings,
//! };
//!
//! async fn reconcile(pool: sqlx::PgPool) -> turnover_core::Result<()> {
//!     let uow = TurnoverUnitOfWork::from_postgres(pool).map_err(TurnoverError::Internal)?;
//!     let uow = Arc::new(uow);
//!     let sync = CleaningSynchronizer::new(uow, TurnoverSettings::default());
//!     let report = sync.reconcile(&[]).await?;
//!     println!("created {} cleanings", report.created);
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

/// Application-level composition (unit of work)
pub mod application;

/// Repository ports and their adapters
pub mod database;

#[cfg(feature = "database")]
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Domain services
pub mod domain;

/// Error types and error handling utilities
pub mod error;

/// Runtime settings shared by the domain services
pub mod settings;

pub use application::{TurnoverUnitOfWork, TurnoverUnitOfWorkBuilder};
pub use error::{Result, TurnoverError};
pub use settings::{AdvisorWeights, TurnoverSettings};
