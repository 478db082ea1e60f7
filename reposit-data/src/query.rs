use crate::error::DataError;
use crate::value::SqlValue;

/// Placeholder style used when rendering SQL.
#[derive(Debug, Clone, Copy)]
pub enum Dialect {
    /// `?` placeholders (default; SQLite and MySQL style).
    Generic,
    /// Postgres-style `$1, $2, ...` placeholders.
    Postgres,
}

impl Dialect {
    fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${index}"),
            Dialect::Generic => "?".to_string(),
        }
    }
}

/// A fluent query builder for composing filtered, ordered, paged reads and
/// criteria-scoped deletes.
///
/// Composition order is fixed by construction: filters render before
/// ordering, ordering before limit/offset — so appending [`paging`] to an
/// ordered builder always yields deterministic page boundaries.
///
/// # Example
///
/// ```ignore
/// let q = repo.query()
///     .where_eq("country", "NO")
///     .order_by("last_name", true)
///     .paging(2, 10);
/// let (sql, params) = q.build_select("*")?;
/// ```
///
/// [`paging`]: QueryBuilder::paging
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table: String,
    conditions: Vec<Condition>,
    order: Vec<(String, bool)>,
    limit_val: Option<u64>,
    offset_val: Option<u64>,
    dialect: Dialect,
}

#[derive(Debug, Clone)]
enum Condition {
    Eq(String, SqlValue),
    NotEq(String, SqlValue),
    Gt(String, SqlValue),
    Lt(String, SqlValue),
    Like(String, String),
    StartsWith(String, String),
    In(String, Vec<SqlValue>),
    IsNull(String),
    IsNotNull(String),
}

impl QueryBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            conditions: Vec::new(),
            order: Vec::new(),
            limit_val: None,
            offset_val: None,
            dialect: Dialect::Generic,
        }
    }

    /// Set the placeholder style (affects rendering only).
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn where_eq(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.conditions
            .push(Condition::Eq(column.to_string(), value.into()));
        self
    }

    pub fn where_not_eq(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.conditions
            .push(Condition::NotEq(column.to_string(), value.into()));
        self
    }

    pub fn where_gt(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.conditions
            .push(Condition::Gt(column.to_string(), value.into()));
        self
    }

    pub fn where_lt(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.conditions
            .push(Condition::Lt(column.to_string(), value.into()));
        self
    }

    /// Raw `LIKE` filter; the pattern is passed through unescaped.
    pub fn where_like(mut self, column: &str, pattern: &str) -> Self {
        self.conditions
            .push(Condition::Like(column.to_string(), pattern.to_string()));
        self
    }

    /// Prefix filter. The prefix is escaped, so `%` and `_` match literally.
    pub fn starts_with(mut self, column: &str, prefix: &str) -> Self {
        self.conditions
            .push(Condition::StartsWith(column.to_string(), prefix.to_string()));
        self
    }

    pub fn where_in(mut self, column: &str, values: Vec<SqlValue>) -> Self {
        self.conditions
            .push(Condition::In(column.to_string(), values));
        self
    }

    pub fn where_null(mut self, column: &str) -> Self {
        self.conditions.push(Condition::IsNull(column.to_string()));
        self
    }

    pub fn where_not_null(mut self, column: &str) -> Self {
        self.conditions
            .push(Condition::IsNotNull(column.to_string()));
        self
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order.push((column.to_string(), ascending));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit_val = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset_val = Some(offset);
        self
    }

    /// Apply skip/take windowing for a 1-based page index.
    ///
    /// Page boundaries are only deterministic when an ordering was applied
    /// first. Callers must pass `page >= 1`; the CRUD engine validates this
    /// before building the query.
    pub fn paging(self, page: u64, page_size: u64) -> Self {
        let offset = page.saturating_sub(1) * page_size;
        self.limit(page_size).offset(offset)
    }

    /// Build a SELECT query returning `(sql, bind_values)`.
    ///
    /// The `columns` parameter determines which columns to select
    /// (e.g. `"*"` or a comma-joined schema column list).
    pub fn build_select(&self, columns: &str) -> Result<(String, Vec<SqlValue>), DataError> {
        let table = checked_identifier(&self.table, "table")?;
        let mut sql = format!("SELECT {columns} FROM {table}");
        let mut params = Vec::new();
        let mut placeholder_idx = 1usize;
        self.append_where(&mut sql, &mut params, &mut placeholder_idx)?;
        self.append_order(&mut sql)?;
        self.append_limit_offset(&mut sql);
        Ok((sql, params))
    }

    /// Build a COUNT query returning `(sql, bind_values)`.
    pub fn build_count(&self) -> Result<(String, Vec<SqlValue>), DataError> {
        let table = checked_identifier(&self.table, "table")?;
        let mut sql = format!("SELECT COUNT(*) FROM {table}");
        let mut params = Vec::new();
        let mut placeholder_idx = 1usize;
        self.append_where(&mut sql, &mut params, &mut placeholder_idx)?;
        Ok((sql, params))
    }

    /// Build a MAX aggregate over one column returning `(sql, bind_values)`.
    pub fn build_max(&self, column: &str) -> Result<(String, Vec<SqlValue>), DataError> {
        let table = checked_identifier(&self.table, "table")?;
        let column = checked_identifier(column, "column")?;
        let mut sql = format!("SELECT MAX({column}) FROM {table}");
        let mut params = Vec::new();
        let mut placeholder_idx = 1usize;
        self.append_where(&mut sql, &mut params, &mut placeholder_idx)?;
        Ok((sql, params))
    }

    /// Build a criteria-scoped DELETE returning `(sql, bind_values)`.
    ///
    /// Ordering and paging state is ignored. The "delete everything" guard
    /// lives in the CRUD engine, which never calls this without criteria.
    pub fn build_delete(&self) -> Result<(String, Vec<SqlValue>), DataError> {
        let table = checked_identifier(&self.table, "table")?;
        let mut sql = format!("DELETE FROM {table}");
        let mut params = Vec::new();
        let mut placeholder_idx = 1usize;
        self.append_where(&mut sql, &mut params, &mut placeholder_idx)?;
        Ok((sql, params))
    }

    fn append_where(
        &self,
        sql: &mut String,
        params: &mut Vec<SqlValue>,
        placeholder_idx: &mut usize,
    ) -> Result<(), DataError> {
        if self.conditions.is_empty() {
            return Ok(());
        }
        sql.push_str(" WHERE ");
        let mut first = true;
        for cond in &self.conditions {
            if !first {
                sql.push_str(" AND ");
            }
            first = false;
            match cond {
                Condition::Eq(col, val) => {
                    self.push_comparison(sql, params, placeholder_idx, col, "=", val.clone())?;
                }
                Condition::NotEq(col, val) => {
                    self.push_comparison(sql, params, placeholder_idx, col, "!=", val.clone())?;
                }
                Condition::Gt(col, val) => {
                    self.push_comparison(sql, params, placeholder_idx, col, ">", val.clone())?;
                }
                Condition::Lt(col, val) => {
                    self.push_comparison(sql, params, placeholder_idx, col, "<", val.clone())?;
                }
                Condition::Like(col, pattern) => {
                    let col = checked_identifier(col, "column")?;
                    let placeholder = self.dialect.placeholder(*placeholder_idx);
                    *placeholder_idx += 1;
                    sql.push_str(&format!("{col} LIKE {placeholder}"));
                    params.push(SqlValue::Text(pattern.clone()));
                }
                Condition::StartsWith(col, prefix) => {
                    let col = checked_identifier(col, "column")?;
                    let placeholder = self.dialect.placeholder(*placeholder_idx);
                    *placeholder_idx += 1;
                    sql.push_str(&format!("{col} LIKE {placeholder} ESCAPE '\\'"));
                    params.push(SqlValue::Text(format!("{}%", escape_like(prefix))));
                }
                Condition::In(col, vals) => {
                    let col = checked_identifier(col, "column")?;
                    let placeholders: Vec<_> = vals
                        .iter()
                        .map(|_| {
                            let placeholder = self.dialect.placeholder(*placeholder_idx);
                            *placeholder_idx += 1;
                            placeholder
                        })
                        .collect();
                    sql.push_str(&format!("{col} IN ({})", placeholders.join(", ")));
                    params.extend(vals.iter().cloned());
                }
                Condition::IsNull(col) => {
                    let col = checked_identifier(col, "column")?;
                    sql.push_str(&format!("{col} IS NULL"));
                }
                Condition::IsNotNull(col) => {
                    let col = checked_identifier(col, "column")?;
                    sql.push_str(&format!("{col} IS NOT NULL"));
                }
            }
        }
        Ok(())
    }

    fn push_comparison(
        &self,
        sql: &mut String,
        params: &mut Vec<SqlValue>,
        placeholder_idx: &mut usize,
        column: &str,
        op: &str,
        value: SqlValue,
    ) -> Result<(), DataError> {
        let column = checked_identifier(column, "column")?;
        let placeholder = self.dialect.placeholder(*placeholder_idx);
        *placeholder_idx += 1;
        sql.push_str(&format!("{column} {op} {placeholder}"));
        params.push(value);
        Ok(())
    }

    fn append_order(&self, sql: &mut String) -> Result<(), DataError> {
        if self.order.is_empty() {
            return Ok(());
        }
        sql.push_str(" ORDER BY ");
        let mut clauses = Vec::with_capacity(self.order.len());
        for (col, asc) in &self.order {
            let col = checked_identifier(col, "column")?;
            if *asc {
                clauses.push(format!("{col} ASC"));
            } else {
                clauses.push(format!("{col} DESC"));
            }
        }
        sql.push_str(&clauses.join(", "));
        Ok(())
    }

    fn append_limit_offset(&self, sql: &mut String) {
        if let Some(limit) = self.limit_val {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = self.offset_val {
            sql.push_str(&format!(" OFFSET {offset}"));
        }
    }
}

/// Validate a table/column identifier against a conservative pattern.
///
/// Identifiers may be dotted (`table.column`); each segment must start with
/// a letter or underscore and contain only ASCII alphanumerics/underscores.
pub fn checked_identifier<'a>(ident: &'a str, kind: &'static str) -> Result<&'a str, DataError> {
    if ident.is_empty() || !ident.split('.').all(is_valid_segment) {
        return Err(DataError::InvalidArgument(format!(
            "invalid {kind} identifier: {ident}"
        )));
    }
    Ok(ident)
}

fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
