//! # reposit-data — data access core
//!
//! Database-agnostic building blocks for the reposit repository layer:
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Entity`] | Trait binding a record type to a table, its field schema, and its values |
//! | [`Schema`] | Validated, registration-time view of an entity's mapped columns |
//! | [`SqlValue`] | Runtime value model used for sparse writes and bind parameters |
//! | [`QueryBuilder`] | Fluent SELECT/COUNT/MAX/DELETE builder with ordering and paging |
//! | [`Page`], [`Pageable`] | 1-based pagination parameters and result envelope |
//! | [`InsertResult`] | Identity-aware insert outcome (generated key or row count) |
//! | [`DataError`] | Error taxonomy shared by all backends |
//!
//! Backend crates (e.g. `reposit-data-sqlx`) add the connection context and
//! the CRUD engine that executes what this crate describes.

pub mod crud;
pub mod entity;
pub mod error;
pub mod page;
pub mod query;
pub mod seq;
pub mod value;

pub use crud::InsertResult;
pub use entity::{Entity, FieldDef, Schema};
pub use error::DataError;
pub use page::{Page, Pageable};
pub use query::QueryBuilder;
pub use value::{FieldValue, SqlValue};

pub mod prelude {
    //! Re-exports of the most commonly used data types.
    pub use crate::{
        DataError, Entity, FieldDef, FieldValue, InsertResult, Page, Pageable, QueryBuilder,
        Schema, SqlValue,
    };
}
