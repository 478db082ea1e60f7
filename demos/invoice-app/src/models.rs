use chrono::{DateTime, Utc};
use reposit_data::{Entity, FieldDef, FieldValue};
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow)]
pub struct Customer {
    pub customer_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub email: Option<String>,
}

impl Entity for Customer {
    type Id = i64;

    fn table_name() -> &'static str {
        "customers"
    }

    fn id_column() -> &'static str {
        "customer_id"
    }

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::identity("customer_id"),
            FieldDef::column("first_name"),
            FieldDef::column("last_name"),
            FieldDef::column("address"),
            FieldDef::column("city"),
            FieldDef::column("country"),
            FieldDef::column("email"),
        ];
        FIELDS
    }

    fn id(&self) -> &i64 {
        &self.customer_id
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::new("customer_id", self.customer_id),
            FieldValue::new("first_name", self.first_name.clone()),
            FieldValue::new("last_name", self.last_name.clone()),
            FieldValue::new("address", self.address.clone()),
            FieldValue::new("city", self.city.clone()),
            FieldValue::new("country", self.country.clone()),
            FieldValue::new("email", self.email.clone()),
        ]
    }
}

/// Catalog row referenced by invoice lines; the unit price lives here.
#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow)]
pub struct Track {
    pub track_id: i64,
    pub name: String,
    pub composer: Option<String>,
    pub unit_price: f64,
}

impl Entity for Track {
    type Id = i64;

    fn table_name() -> &'static str {
        "tracks"
    }

    fn id_column() -> &'static str {
        "track_id"
    }

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::identity("track_id"),
            FieldDef::column("name"),
            FieldDef::column("composer"),
            FieldDef::column("unit_price"),
        ];
        FIELDS
    }

    fn id(&self) -> &i64 {
        &self.track_id
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::new("track_id", self.track_id),
            FieldValue::new("name", self.name.clone()),
            FieldValue::new("composer", self.composer.clone()),
            FieldValue::new("unit_price", self.unit_price),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow)]
pub struct Invoice {
    pub invoice_id: i64,
    pub customer_id: i64,
    pub invoice_date: Option<DateTime<Utc>>,
    pub billing_address: Option<String>,
    pub billing_city: Option<String>,
    pub billing_country: Option<String>,
    pub total: f64,
}

impl Entity for Invoice {
    type Id = i64;

    fn table_name() -> &'static str {
        "invoices"
    }

    fn id_column() -> &'static str {
        "invoice_id"
    }

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::identity("invoice_id"),
            FieldDef::column("customer_id"),
            FieldDef::column("invoice_date"),
            FieldDef::column("billing_address"),
            FieldDef::column("billing_city"),
            FieldDef::column("billing_country"),
            FieldDef::column("total"),
        ];
        FIELDS
    }

    fn id(&self) -> &i64 {
        &self.invoice_id
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::new("invoice_id", self.invoice_id),
            FieldValue::new("customer_id", self.customer_id),
            FieldValue::new("invoice_date", self.invoice_date),
            FieldValue::new("billing_address", self.billing_address.clone()),
            FieldValue::new("billing_city", self.billing_city.clone()),
            FieldValue::new("billing_country", self.billing_country.clone()),
            FieldValue::new("total", self.total),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow)]
pub struct InvoiceLine {
    pub invoice_line_id: i64,
    pub invoice_id: i64,
    pub track_id: i64,
    pub unit_price: f64,
    pub quantity: i64,
}

impl Entity for InvoiceLine {
    type Id = i64;

    fn table_name() -> &'static str {
        "invoice_lines"
    }

    fn id_column() -> &'static str {
        "invoice_line_id"
    }

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::identity("invoice_line_id"),
            FieldDef::column("invoice_id"),
            FieldDef::column("track_id"),
            FieldDef::column("unit_price"),
            FieldDef::column("quantity"),
        ];
        FIELDS
    }

    fn id(&self) -> &i64 {
        &self.invoice_line_id
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::new("invoice_line_id", self.invoice_line_id),
            FieldValue::new("invoice_id", self.invoice_id),
            FieldValue::new("track_id", self.track_id),
            FieldValue::new("unit_price", self.unit_price),
            FieldValue::new("quantity", self.quantity),
        ]
    }
}
