use invoice_app::dto::{CreateInvoiceLine, CreateInvoiceRequest};
use invoice_app::models::{Customer, Track};
use invoice_app::{db, InvoiceService};
use reposit_data::Pageable;
use reposit_data_sqlx::DbContext;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());
    // single connection so an in-memory database survives across statements
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&url)
        .await?;
    let ctx = Arc::new(DbContext::new(pool));
    db::init_schema(&ctx).await?;

    let service = InvoiceService::new(Arc::clone(&ctx))?;

    let ada = Customer {
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        address: Some("123 Main St".into()),
        city: Some("London".into()),
        country: Some("UK".into()),
        email: Some("ada@example.com".into()),
        ..Default::default()
    };
    let customer_id = service.create_customer(&ada, true).await?;

    let mut track_ids = Vec::new();
    for (name, price) in [("Prelude", 1.99), ("Nocturne", 0.99)] {
        let track = Track {
            name: name.into(),
            unit_price: price,
            ..Default::default()
        };
        let key = service
            .tracks()
            .insert(&track, true)
            .await?
            .generated_key()
            .ok_or("track insert did not return a key")?;
        track_ids.push(key);
    }

    let invoice_id = service
        .create_invoice(CreateInvoiceRequest {
            customer_id,
            billing_address: None,
            billing_city: None,
            billing_country: None,
            lines: vec![
                CreateInvoiceLine {
                    track_id: track_ids[0],
                    quantity: 2,
                },
                CreateInvoiceLine {
                    track_id: track_ids[1],
                    quantity: 1,
                },
            ],
        })
        .await?;
    info!(invoice_id, "composite write committed");

    let report = service.invoice_report(&Pageable::default()).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    ctx.close().await;
    Ok(())
}
