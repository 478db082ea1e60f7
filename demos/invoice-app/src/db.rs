//! Demo schema setup.

use reposit_data::DataError;
use reposit_data_sqlx::DbContext;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS customers (\
        customer_id INTEGER PRIMARY KEY AUTOINCREMENT, \
        first_name TEXT NOT NULL, \
        last_name TEXT NOT NULL, \
        address TEXT, \
        city TEXT, \
        country TEXT, \
        email TEXT)",
    "CREATE TABLE IF NOT EXISTS tracks (\
        track_id INTEGER PRIMARY KEY AUTOINCREMENT, \
        name TEXT NOT NULL, \
        composer TEXT, \
        unit_price REAL NOT NULL)",
    "CREATE TABLE IF NOT EXISTS invoices (\
        invoice_id INTEGER PRIMARY KEY AUTOINCREMENT, \
        customer_id INTEGER NOT NULL REFERENCES customers(customer_id), \
        invoice_date TEXT, \
        billing_address TEXT, \
        billing_city TEXT, \
        billing_country TEXT, \
        total REAL NOT NULL)",
    "CREATE TABLE IF NOT EXISTS invoice_lines (\
        invoice_line_id INTEGER PRIMARY KEY AUTOINCREMENT, \
        invoice_id INTEGER NOT NULL REFERENCES invoices(invoice_id), \
        track_id INTEGER NOT NULL REFERENCES tracks(track_id), \
        unit_price REAL NOT NULL, \
        quantity INTEGER NOT NULL CHECK (quantity > 0))",
];

/// Create the demo tables if they do not exist yet.
pub async fn init_schema(ctx: &DbContext) -> Result<(), DataError> {
    for stmt in SCHEMA {
        ctx.execute(stmt, Vec::new()).await?;
    }
    Ok(())
}
