//! # reposit-data-sqlx — SQLx backend for the reposit data layer
//!
//! This crate provides the [SQLx](https://github.com/launchbadge/sqlx)-specific
//! implementations for reposit's data access layer. It depends on
//! [`reposit-data`] for the schema, value, and query types, and adds the
//! connection context and the CRUD engine that executes against a real
//! database (SQLite driver).
//!
//! # What's in this crate
//!
//! | Type | Description |
//! |------|-------------|
//! | [`DbContext`] | One connection pool plus a single transaction slot; begin/commit/rollback |
//! | [`SqlxRepository`] | Per-entity CRUD engine: sparse/full writes, identity routing, find/page/max/count |
//! | [`SqlxErrorExt`] | Extension trait to convert `sqlx::Error` → `DataError` (`.into_data_error()`) |
//! | [`SqlxResult<T>`] | Type alias for `Result<T, DataError>` |
//!
//! # Quick start
//!
//! ```ignore
//! use reposit_data_sqlx::DbContext;
//! use std::sync::Arc;
//!
//! let ctx = Arc::new(DbContext::connect("sqlite::memory:").await?);
//! let customers = ctx.repository::<Customer>()?;
//!
//! let key = customers.insert(&customer, true).await?; // sparse, identity-returning
//! let page = customers
//!     .page_find(1, 20, customers.query().order_by("last_name", true))
//!     .await?;
//! ```
//!
//! # Transactions
//!
//! A context owns at most one open transaction. While one is open, every
//! repository bound to the context routes its statements through it:
//!
//! ```ignore
//! ctx.begin().await?;
//! let key = invoices.insert(&invoice, true).await?;
//! lines.insert(&line, true).await?;
//! ctx.commit().await?;
//! ```
//!
//! Dropping the context with a transaction still open rolls it back, so a
//! cancelled unit of work never leaves a partial commit behind.
//!
//! # Error bridging
//!
//! Due to Rust's orphan rules, `From<sqlx::Error> for DataError` can't be
//! implemented here. Use the [`SqlxErrorExt`] trait instead:
//!
//! ```ignore
//! use reposit_data_sqlx::SqlxErrorExt;
//!
//! let row = sqlx::query("SELECT ...")
//!     .fetch_one(ctx.pool())
//!     .await
//!     .map_err(|e| e.into_data_error())?;
//! ```

pub mod context;
pub mod error;
pub mod repository;

pub use context::DbContext;
pub use error::{SqlxErrorExt, SqlxResult};
pub use repository::SqlxRepository;

/// Re-exports of the most commonly used types from both `reposit-data` and this crate.
pub mod prelude {
    pub use crate::{DbContext, SqlxErrorExt, SqlxRepository};
    pub use reposit_data::prelude::*;
}
