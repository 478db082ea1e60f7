use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request to create one invoice with its line items.
///
/// Blank billing fields are backfilled from the customer's address.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoiceRequest {
    pub customer_id: i64,
    pub billing_address: Option<String>,
    pub billing_city: Option<String>,
    pub billing_country: Option<String>,
    pub lines: Vec<CreateInvoiceLine>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoiceLine {
    pub track_id: i64,
    pub quantity: i64,
}

/// Invoice joined with its customer's name, for listing.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct InvoiceReportRow {
    pub invoice_id: i64,
    pub customer_id: i64,
    pub customer_name: String,
    pub invoice_date: Option<DateTime<Utc>>,
    pub billing_address: Option<String>,
    pub billing_country: Option<String>,
    pub total: f64,
}
