//! Connection context: one pool, one transaction slot.

use crate::error::SqlxErrorExt;
use reposit_data::{DataError, Entity, SqlValue};
use sqlx::query::{Query, QueryAs};
use sqlx::sqlite::{SqliteArguments, SqlitePoolOptions, SqliteQueryResult, SqliteRow};
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Wraps one database pool and owns its transaction boundary.
///
/// Created once per logical unit of work; many repositories may share one
/// context via `Arc`. At most one transaction is open per context at a time.
/// While a transaction is open, every statement issued through the context
/// runs inside it; otherwise statements run directly on the pool.
///
/// A context must not be shared across concurrently-executing units of work:
/// it owns a single transaction slot and provides no further coordination.
/// Dropping the context with an open transaction rolls it back.
pub struct DbContext {
    pool: SqlitePool,
    tx: Mutex<Option<Transaction<'static, Sqlite>>>,
    closed: AtomicBool,
}

impl DbContext {
    /// Wrap an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            tx: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    /// Connect to the database at `url` (e.g. `sqlite://app.db`).
    ///
    /// In-memory SQLite databases are per-connection; use a single-connection
    /// pool (`max_connections(1)`) with `sqlite::memory:` so every statement
    /// sees the same database.
    pub async fn connect(url: &str) -> Result<Self, DataError> {
        let pool = SqlitePoolOptions::new()
            .connect(url)
            .await
            .map_err(|e| e.into_data_error())?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Build a repository for `T` bound to this context.
    ///
    /// Validates `T`'s schema; inconsistent declarations are rejected here
    /// rather than at first use.
    pub fn repository<T: Entity>(self: &Arc<Self>) -> Result<crate::SqlxRepository<T>, DataError> {
        crate::SqlxRepository::new(Arc::clone(self))
    }

    /// Open a transaction. Fails if one is already open on this context.
    pub async fn begin(&self) -> Result<(), DataError> {
        let mut slot = self.tx.lock().await;
        if slot.is_some() {
            return Err(DataError::Transaction(
                "a transaction is already open on this context".into(),
            ));
        }
        let tx = self.pool.begin().await.map_err(|e| e.into_data_error())?;
        *slot = Some(tx);
        debug!("transaction started");
        Ok(())
    }

    /// Commit the open transaction. Fails if none is open.
    pub async fn commit(&self) -> Result<(), DataError> {
        let tx = self.tx.lock().await.take().ok_or_else(|| {
            DataError::Transaction("no open transaction to commit".into())
        })?;
        tx.commit().await.map_err(|e| e.into_data_error())?;
        debug!("transaction committed");
        Ok(())
    }

    /// Roll back the open transaction. Fails if none is open.
    pub async fn rollback(&self) -> Result<(), DataError> {
        let tx = self.tx.lock().await.take().ok_or_else(|| {
            DataError::Transaction("no open transaction to roll back".into())
        })?;
        tx.rollback().await.map_err(|e| e.into_data_error())?;
        debug!("transaction rolled back");
        Ok(())
    }

    pub async fn in_transaction(&self) -> bool {
        self.tx.lock().await.is_some()
    }

    /// Release the underlying pool. Safe to call more than once; any open
    /// transaction is rolled back first.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.tx.lock().await.take();
        self.pool.close().await;
    }

    /// Execute a mutation, routed through the open transaction if any.
    pub async fn execute(
        &self,
        sql: &str,
        params: Vec<SqlValue>,
    ) -> Result<SqliteQueryResult, DataError> {
        debug!(sql, "execute");
        let mut slot = self.tx.lock().await;
        let query = bind_query(sqlx::query(sql), params);
        match slot.as_mut() {
            Some(tx) => query.execute(&mut **tx).await.map_err(|e| e.into_data_error()),
            None => query.execute(&self.pool).await.map_err(|e| e.into_data_error()),
        }
    }

    /// Fetch all rows mapped to `T`, routed through the open transaction if any.
    pub async fn fetch_all_as<T>(
        &self,
        sql: &str,
        params: Vec<SqlValue>,
    ) -> Result<Vec<T>, DataError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        debug!(sql, "fetch_all");
        let mut slot = self.tx.lock().await;
        let query = bind_query_as::<T>(sqlx::query_as(sql), params);
        match slot.as_mut() {
            Some(tx) => query.fetch_all(&mut **tx).await.map_err(|e| e.into_data_error()),
            None => query.fetch_all(&self.pool).await.map_err(|e| e.into_data_error()),
        }
    }

    /// Fetch at most one row mapped to `T`, routed through the open transaction if any.
    pub async fn fetch_optional_as<T>(
        &self,
        sql: &str,
        params: Vec<SqlValue>,
    ) -> Result<Option<T>, DataError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        debug!(sql, "fetch_optional");
        let mut slot = self.tx.lock().await;
        let query = bind_query_as::<T>(sqlx::query_as(sql), params);
        match slot.as_mut() {
            Some(tx) => query.fetch_optional(&mut **tx).await.map_err(|e| e.into_data_error()),
            None => query.fetch_optional(&self.pool).await.map_err(|e| e.into_data_error()),
        }
    }

    /// Fetch exactly one row (used for scalar aggregates).
    pub async fn fetch_one_row(
        &self,
        sql: &str,
        params: Vec<SqlValue>,
    ) -> Result<SqliteRow, DataError> {
        debug!(sql, "fetch_one");
        let mut slot = self.tx.lock().await;
        let query = bind_query(sqlx::query(sql), params);
        match slot.as_mut() {
            Some(tx) => query.fetch_one(&mut **tx).await.map_err(|e| e.into_data_error()),
            None => query.fetch_one(&self.pool).await.map_err(|e| e.into_data_error()),
        }
    }
}

fn bind_query<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: Vec<SqlValue>,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for value in params {
        query = match value {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Int(v) => query.bind(v),
            SqlValue::Real(v) => query.bind(v),
            SqlValue::Text(v) => query.bind(v),
            SqlValue::Blob(v) => query.bind(v),
            SqlValue::Timestamp(v) => query.bind(v),
        };
    }
    query
}

fn bind_query_as<'q, T>(
    mut query: QueryAs<'q, Sqlite, T, SqliteArguments<'q>>,
    params: Vec<SqlValue>,
) -> QueryAs<'q, Sqlite, T, SqliteArguments<'q>> {
    for value in params {
        query = match value {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Int(v) => query.bind(v),
            SqlValue::Real(v) => query.bind(v),
            SqlValue::Text(v) => query.bind(v),
            SqlValue::Blob(v) => query.bind(v),
            SqlValue::Timestamp(v) => query.bind(v),
        };
    }
    query
}
