//! Per-entity CRUD engine.

use crate::context::DbContext;
use reposit_data::seq::next_in_sequence;
use reposit_data::{DataError, Entity, InsertResult, Page, Pageable, QueryBuilder, SqlValue};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, Sqlite};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// A generic repository bound to one entity type and one [`DbContext`].
///
/// Stateless apart from the validated schema; cloning is cheap and many
/// repositories may share one context.
///
/// # Example
///
/// ```ignore
/// let customers = ctx.repository::<Customer>()?;
/// let norwegians = customers
///     .find(customers.query().where_eq("country", "NO").order_by("last_name", true))
///     .await?;
/// ```
pub struct SqlxRepository<T: Entity> {
    ctx: Arc<DbContext>,
    schema: reposit_data::Schema,
    _marker: PhantomData<T>,
}

impl<T: Entity> Clone for SqlxRepository<T> {
    fn clone(&self) -> Self {
        Self {
            ctx: Arc::clone(&self.ctx),
            schema: self.schema.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Entity> SqlxRepository<T> {
    /// Bind `T` to a context, validating its schema declaration.
    pub fn new(ctx: Arc<DbContext>) -> Result<Self, DataError> {
        Ok(Self {
            ctx,
            schema: reposit_data::Schema::of::<T>()?,
            _marker: PhantomData,
        })
    }

    pub fn context(&self) -> &Arc<DbContext> {
        &self.ctx
    }

    pub fn schema(&self) -> &reposit_data::Schema {
        &self.schema
    }

    /// A `QueryBuilder` pre-configured for this entity's table — the
    /// starting point for every criteria argument below.
    pub fn query(&self) -> QueryBuilder {
        QueryBuilder::new(self.schema.table())
    }

    fn check_criteria(&self, criteria: &QueryBuilder) -> Result<(), DataError> {
        if criteria.table() != self.schema.table() {
            return Err(DataError::InvalidArgument(format!(
                "criteria built for table '{}' used on repository for '{}'",
                criteria.table(),
                self.schema.table()
            )));
        }
        Ok(())
    }

    fn select_columns(&self) -> String {
        self.schema.columns().join(", ")
    }

    /// Insert `entity`. With `sparse`, only columns holding provided
    /// (non-null) values are written; the identity column is never written.
    ///
    /// Routing follows the schema: entity types with an identity column go
    /// through the identity-returning path and yield the generated key,
    /// otherwise the affected-row count is returned. The entity itself is
    /// not mutated.
    pub async fn insert(&self, entity: &T, sparse: bool) -> Result<InsertResult, DataError> {
        let mut columns = Vec::new();
        let mut values = Vec::new();
        for (def, value) in self.schema.zip_values(entity.values())? {
            if def.excluded || def.identity {
                continue;
            }
            if sparse && value.is_null() {
                continue;
            }
            columns.push(def.column);
            values.push(value);
        }
        if columns.is_empty() {
            return Err(DataError::InvalidArgument(format!(
                "insert into '{}' has no eligible columns",
                self.schema.table()
            )));
        }

        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.schema.table(),
            columns.join(", "),
            placeholders
        );
        let result = self.ctx.execute(&sql, values).await?;

        if self.schema.has_identity() {
            let key = result.last_insert_rowid();
            debug!(table = self.schema.table(), key, "identity insert");
            Ok(InsertResult::GeneratedKey(key))
        } else {
            Ok(InsertResult::RowsAffected(result.rows_affected()))
        }
    }

    /// Update the row matching `entity`'s primary key. With `sparse`, only
    /// columns holding provided (non-null) values are written.
    ///
    /// Returns the affected-row count (zero when no row matches the key).
    pub async fn update(&self, entity: &T, sparse: bool) -> Result<u64, DataError> {
        let id_column = self.schema.id_column();
        let mut assignments = Vec::new();
        let mut values = Vec::new();
        let mut id_value = SqlValue::Null;
        for (def, value) in self.schema.zip_values(entity.values())? {
            if def.column == id_column {
                id_value = value.clone();
            }
            if def.excluded || def.identity || def.column == id_column {
                continue;
            }
            if sparse && value.is_null() {
                continue;
            }
            assignments.push(format!("{} = ?", def.column));
            values.push(value);
        }
        if id_value.is_null() {
            return Err(DataError::InvalidArgument(format!(
                "update on '{}' requires a primary key value in '{id_column}'",
                self.schema.table()
            )));
        }
        if assignments.is_empty() {
            return Err(DataError::InvalidArgument(format!(
                "update on '{}' has no eligible columns",
                self.schema.table()
            )));
        }

        let sql = format!(
            "UPDATE {} SET {} WHERE {id_column} = ?",
            self.schema.table(),
            assignments.join(", ")
        );
        values.push(id_value);
        let result = self.ctx.execute(&sql, values).await?;
        Ok(result.rows_affected())
    }

    /// Delete the rows matching `criteria`, returning the affected count.
    ///
    /// An absent criteria never deletes all rows: `None` returns zero
    /// without touching the store. That guard is deliberate.
    pub async fn delete(&self, criteria: Option<QueryBuilder>) -> Result<u64, DataError> {
        let Some(criteria) = criteria else {
            return Ok(0);
        };
        self.check_criteria(&criteria)?;
        let (sql, params) = criteria.build_delete()?;
        let result = self.ctx.execute(&sql, params).await?;
        Ok(result.rows_affected())
    }

    /// Derive the next value of a "prefix + zero-padded integer" id held in
    /// `column`, via a MAX aggregate filtered by prefix.
    ///
    /// Non-atomic read-then-format: concurrent callers contending on the
    /// same prefix can compute the same id (see `reposit_data::seq`).
    pub async fn generate_id(
        &self,
        column: &str,
        prefix: &str,
        pad_width: usize,
    ) -> Result<String, DataError> {
        let criteria = self.query().starts_with(column, prefix);
        let previous: Option<String> = self.max(column, criteria).await?;
        Ok(next_in_sequence(previous.as_deref(), prefix, pad_width))
    }

    /// Count the rows matching `criteria`.
    pub async fn row_count(&self, criteria: QueryBuilder) -> Result<u64, DataError> {
        self.check_criteria(&criteria)?;
        let (sql, params) = criteria.build_count()?;
        let row = self.ctx.fetch_one_row(&sql, params).await?;
        let count: i64 = row.try_get(0).map_err(crate::SqlxErrorExt::into_data_error)?;
        Ok(count.max(0) as u64)
    }

    /// MAX of `column` over the rows matching `criteria`; `None` when no
    /// row matches.
    pub async fn max<V>(&self, column: &str, criteria: QueryBuilder) -> Result<Option<V>, DataError>
    where
        V: for<'r> sqlx::Decode<'r, Sqlite> + sqlx::Type<Sqlite> + Send + Unpin,
    {
        self.check_criteria(&criteria)?;
        let (sql, params) = criteria.build_max(column)?;
        let row = self.ctx.fetch_one_row(&sql, params).await?;
        row.try_get::<Option<V>, _>(0)
            .map_err(crate::SqlxErrorExt::into_data_error)
    }
}

impl<T> SqlxRepository<T>
where
    T: Entity + for<'r> FromRow<'r, SqliteRow>,
{
    /// Materialize all rows matching `criteria`, in criteria order.
    pub async fn find(&self, criteria: QueryBuilder) -> Result<Vec<T>, DataError> {
        self.check_criteria(&criteria)?;
        let (sql, params) = criteria.build_select(&self.select_columns())?;
        self.ctx.fetch_all_as(&sql, params).await
    }

    /// Materialize the unfiltered table.
    pub async fn find_all(&self) -> Result<Vec<T>, DataError> {
        self.find(self.query()).await
    }

    /// At most one row matching `criteria`, or `None`.
    pub async fn find_first(&self, criteria: QueryBuilder) -> Result<Option<T>, DataError> {
        self.check_criteria(&criteria)?;
        let (sql, params) = criteria.limit(1).build_select(&self.select_columns())?;
        self.ctx.fetch_optional_as(&sql, params).await
    }

    /// Look up one row by primary key.
    pub async fn find_by_id(&self, id: T::Id) -> Result<Option<T>, DataError> {
        self.find_first(self.query().where_eq(self.schema.id_column(), id))
            .await
    }

    /// Rows for a 1-based `page` of `page_size` rows, shaped by `criteria`.
    ///
    /// Apply an ordering in `criteria` — page boundaries are only stable
    /// over an ordered query. `page < 1` or `page_size < 1` is rejected.
    pub async fn page_find(
        &self,
        page: u64,
        page_size: u64,
        criteria: QueryBuilder,
    ) -> Result<Vec<T>, DataError> {
        Pageable::new(page, page_size).validate()?;
        self.find(criteria.paging(page, page_size)).await
    }

    /// Like [`page_find`](Self::page_find), but also counts the total and
    /// wraps the rows in a [`Page`] envelope.
    pub async fn page(&self, pageable: &Pageable, criteria: QueryBuilder) -> Result<Page<T>, DataError> {
        pageable.validate()?;
        let total = self.row_count(criteria.clone()).await?;
        let content = self
            .find(criteria.paging(pageable.page, pageable.size))
            .await?;
        Ok(Page::new(content, pageable, total))
    }
}
