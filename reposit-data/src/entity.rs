use crate::error::DataError;
use crate::value::{FieldValue, SqlValue};

/// One mapped field of an entity type.
///
/// Declared once per type in [`Entity::fields`]; the column name defaults to
/// the field name unless overridden with [`FieldDef::with_column`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDef {
    pub name: &'static str,
    pub column: &'static str,
    pub identity: bool,
    pub excluded: bool,
}

impl FieldDef {
    /// A regular mapped field whose column name equals the field name.
    pub const fn column(name: &'static str) -> Self {
        Self {
            name,
            column: name,
            identity: false,
            excluded: false,
        }
    }

    /// A mapped field with an explicit column name.
    pub const fn with_column(name: &'static str, column: &'static str) -> Self {
        Self {
            name,
            column,
            identity: false,
            excluded: false,
        }
    }

    /// The store-generated primary key field. At most one per entity type.
    pub const fn identity(name: &'static str) -> Self {
        Self {
            name,
            column: name,
            identity: true,
            excluded: false,
        }
    }

    /// A field that is never persisted and skipped by introspection.
    pub const fn excluded(name: &'static str) -> Self {
        Self {
            name,
            column: name,
            identity: false,
            excluded: true,
        }
    }
}

/// Trait representing a database entity with a table name, id column, field
/// schema, and a snapshot of its current values.
///
/// Implemented manually per entity type; `fields()` and `values()` must list
/// the same fields in the same order.
///
/// # Example
///
/// ```ignore
/// impl Entity for Customer {
///     type Id = i64;
///     fn table_name() -> &'static str { "customers" }
///     fn id_column() -> &'static str { "customer_id" }
///     fn fields() -> &'static [FieldDef] {
///         &[
///             FieldDef::identity("customer_id"),
///             FieldDef::column("first_name"),
///             FieldDef::column("email"),
///         ]
///     }
///     fn id(&self) -> &i64 { &self.customer_id }
///     fn values(&self) -> Vec<FieldValue> {
///         vec![
///             FieldValue::new("customer_id", self.customer_id),
///             FieldValue::new("first_name", self.first_name.clone()),
///             FieldValue::new("email", self.email.clone()),
///         ]
///     }
/// }
/// ```
pub trait Entity: Send + Sync + Unpin + 'static {
    type Id: Clone + Send + Sync + Into<SqlValue> + 'static;

    fn table_name() -> &'static str;
    fn id_column() -> &'static str;
    fn fields() -> &'static [FieldDef];
    fn id(&self) -> &Self::Id;
    fn values(&self) -> Vec<FieldValue>;
}

/// Validated, registration-time view of an entity type's mapping.
///
/// Built once per repository via [`Schema::of`], which rejects inconsistent
/// declarations instead of silently picking a "first found" match.
#[derive(Debug, Clone)]
pub struct Schema {
    table: &'static str,
    id_column: &'static str,
    fields: &'static [FieldDef],
    identity: Option<FieldDef>,
}

impl Schema {
    /// Build and validate the schema for `T`.
    ///
    /// Rejected at registration time:
    /// - more than one identity field
    /// - an identity field marked excluded
    /// - duplicate column names
    /// - an `id_column` that is not among the mapped fields
    pub fn of<T: Entity>() -> Result<Self, DataError> {
        let table = T::table_name();
        let fields = T::fields();

        let mut identity = None;
        for def in fields {
            if def.identity {
                if identity.is_some() {
                    return Err(DataError::Schema(format!(
                        "entity '{table}' declares more than one identity field"
                    )));
                }
                if def.excluded {
                    return Err(DataError::Schema(format!(
                        "entity '{table}' marks identity field '{}' as excluded",
                        def.name
                    )));
                }
                identity = Some(*def);
            }
        }

        for (i, def) in fields.iter().enumerate() {
            if fields[..i].iter().any(|d| d.column == def.column) {
                return Err(DataError::Schema(format!(
                    "entity '{table}' maps column '{}' more than once",
                    def.column
                )));
            }
        }

        let id_column = T::id_column();
        if !fields.iter().any(|d| d.column == id_column && !d.excluded) {
            return Err(DataError::Schema(format!(
                "entity '{table}' id column '{id_column}' is not a mapped field"
            )));
        }

        Ok(Self {
            table,
            id_column,
            fields,
            identity,
        })
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn id_column(&self) -> &'static str {
        self.id_column
    }

    pub fn fields(&self) -> &'static [FieldDef] {
        self.fields
    }

    /// True iff exactly one field is marked identity.
    pub fn has_identity(&self) -> bool {
        self.identity.is_some()
    }

    pub fn identity_column(&self) -> Option<&'static str> {
        self.identity.map(|d| d.column)
    }

    /// All persisted column names (mapped, not excluded), in declaration order.
    pub fn columns(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|d| !d.excluded)
            .map(|d| d.column)
            .collect()
    }

    /// Pair each declared field with the entity's current value for it.
    ///
    /// Errors if the entity's `values()` does not line up with `fields()` —
    /// that is a declaration bug, not a runtime condition.
    pub fn zip_values(&self, values: Vec<FieldValue>) -> Result<Vec<(FieldDef, SqlValue)>, DataError> {
        if values.len() != self.fields.len() {
            return Err(DataError::Schema(format!(
                "entity '{}' returned {} values for {} declared fields",
                self.table,
                values.len(),
                self.fields.len()
            )));
        }
        let mut out = Vec::with_capacity(values.len());
        for (def, fv) in self.fields.iter().zip(values) {
            if def.column != fv.column {
                return Err(DataError::Schema(format!(
                    "entity '{}' value order mismatch: expected column '{}', got '{}'",
                    self.table, def.column, fv.column
                )));
            }
            out.push((*def, fv.value));
        }
        Ok(out)
    }

    /// The columns eligible for a sparse write: mapped, not excluded, and
    /// holding a provided (non-null) value.
    ///
    /// The scan visits every field; a null timestamp does not cut the scan
    /// short the way a never-set date column would in some legacy mappers.
    pub fn provided_columns(&self, values: Vec<FieldValue>) -> Result<Vec<&'static str>, DataError> {
        Ok(self
            .zip_values(values)?
            .into_iter()
            .filter(|(def, value)| !def.excluded && !value.is_null())
            .map(|(def, _)| def.column)
            .collect())
    }
}
