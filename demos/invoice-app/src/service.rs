use crate::dto::{CreateInvoiceRequest, InvoiceReportRow};
use crate::error::AppError;
use crate::models::{Customer, Invoice, InvoiceLine, Track};
use chrono::Utc;
use reposit_data::{DataError, Pageable};
use reposit_data_sqlx::{DbContext, SqlxRepository};
use std::sync::Arc;
use tracing::{info, warn};

/// Application service over the repository layer.
///
/// All repositories share one [`DbContext`], so the composite write below
/// runs every statement inside the context's single transaction.
#[derive(Clone)]
pub struct InvoiceService {
    ctx: Arc<DbContext>,
    customers: SqlxRepository<Customer>,
    tracks: SqlxRepository<Track>,
    invoices: SqlxRepository<Invoice>,
    lines: SqlxRepository<InvoiceLine>,
}

impl InvoiceService {
    pub fn new(ctx: Arc<DbContext>) -> Result<Self, DataError> {
        Ok(Self {
            customers: ctx.repository()?,
            tracks: ctx.repository()?,
            invoices: ctx.repository()?,
            lines: ctx.repository()?,
            ctx,
        })
    }

    pub fn customers(&self) -> &SqlxRepository<Customer> {
        &self.customers
    }

    pub fn tracks(&self) -> &SqlxRepository<Track> {
        &self.tracks
    }

    pub fn invoices(&self) -> &SqlxRepository<Invoice> {
        &self.invoices
    }

    pub fn lines(&self) -> &SqlxRepository<InvoiceLine> {
        &self.lines
    }

    pub async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        Ok(self
            .customers
            .find(self.customers.query().order_by("first_name", true))
            .await?)
    }

    pub async fn page_customers(&self, page: u64, show: u64) -> Result<Vec<Customer>, AppError> {
        Ok(self
            .customers
            .page_find(page, show, self.customers.query().order_by("first_name", true))
            .await?)
    }

    pub async fn create_customer(&self, customer: &Customer, sparse: bool) -> Result<i64, AppError> {
        let inserted = self.customers.insert(customer, sparse).await?;
        inserted.generated_key().ok_or_else(|| {
            AppError::Data(DataError::Other(
                "customer insert did not return a key".into(),
            ))
        })
    }

    /// Create an invoice with its lines inside one transaction.
    ///
    /// Line prices come from the track catalog; a line referencing a missing
    /// track fails the whole operation before anything is persisted. Blank
    /// billing fields are backfilled from the customer. On any failure after
    /// the transaction opens, everything is rolled back and the error is
    /// returned to the caller.
    pub async fn create_invoice(&self, req: CreateInvoiceRequest) -> Result<i64, AppError> {
        let mut resolved = Vec::with_capacity(req.lines.len());
        for line in &req.lines {
            let track = self
                .tracks
                .find_by_id(line.track_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("track {} does not exist", line.track_id)))?;
            resolved.push((track.track_id, track.unit_price, line.quantity));
        }
        let total: f64 = resolved
            .iter()
            .map(|(_, unit_price, quantity)| unit_price * *quantity as f64)
            .sum();

        let customer = self
            .customers
            .find_by_id(req.customer_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("customer {} does not exist", req.customer_id)))?;

        let invoice = Invoice {
            invoice_id: 0,
            customer_id: customer.customer_id,
            invoice_date: Some(Utc::now()),
            billing_address: fill_blank(req.billing_address, customer.address),
            billing_city: fill_blank(req.billing_city, customer.city),
            billing_country: fill_blank(req.billing_country, customer.country),
            total,
        };

        self.ctx.begin().await?;
        match self.persist_invoice(&invoice, &resolved).await {
            Ok(invoice_id) => {
                self.ctx.commit().await?;
                info!(invoice_id, total, "invoice created");
                Ok(invoice_id)
            }
            Err(err) => {
                // roll back, then surface the original failure to the caller
                if let Err(rollback_err) = self.ctx.rollback().await {
                    warn!(error = %rollback_err, "rollback after failed invoice write also failed");
                }
                Err(err)
            }
        }
    }

    async fn persist_invoice(
        &self,
        invoice: &Invoice,
        resolved: &[(i64, f64, i64)],
    ) -> Result<i64, AppError> {
        let invoice_id = self
            .invoices
            .insert(invoice, true)
            .await?
            .generated_key()
            .ok_or_else(|| {
                AppError::Data(DataError::Other("invoice insert did not return a key".into()))
            })?;

        for (track_id, unit_price, quantity) in resolved {
            let line = InvoiceLine {
                invoice_line_id: 0,
                invoice_id,
                track_id: *track_id,
                unit_price: *unit_price,
                quantity: *quantity,
            };
            self.lines.insert(&line, true).await?;
        }
        Ok(invoice_id)
    }

    /// Invoices joined with customer names, newest first page.
    pub async fn invoice_report(&self, pageable: &Pageable) -> Result<Vec<InvoiceReportRow>, AppError> {
        pageable.validate()?;
        let sql = format!(
            "SELECT i.invoice_id, i.customer_id, \
                    c.first_name || ' ' || c.last_name AS customer_name, \
                    i.invoice_date, i.billing_address, i.billing_country, i.total \
             FROM invoices i \
             JOIN customers c ON c.customer_id = i.customer_id \
             ORDER BY i.invoice_id DESC LIMIT {} OFFSET {}",
            pageable.size,
            pageable.offset()
        );
        Ok(self.ctx.fetch_all_as(&sql, Vec::new()).await?)
    }
}

/// Use `provided` unless it is absent or blank, falling back to the
/// customer's stored value.
fn fill_blank(provided: Option<String>, fallback: Option<String>) -> Option<String> {
    match provided {
        Some(s) if !s.trim().is_empty() => Some(s),
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::fill_blank;

    #[test]
    fn blank_billing_fields_fall_back() {
        assert_eq!(
            fill_blank(None, Some("123 Main St".into())),
            Some("123 Main St".into())
        );
        assert_eq!(
            fill_blank(Some("  ".into()), Some("123 Main St".into())),
            Some("123 Main St".into())
        );
        assert_eq!(
            fill_blank(Some("9 Side Rd".into()), Some("123 Main St".into())),
            Some("9 Side Rd".into())
        );
        assert_eq!(fill_blank(None, None), None);
    }
}
