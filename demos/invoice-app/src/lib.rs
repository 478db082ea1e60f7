//! Demo application for the reposit data layer.
//!
//! A small invoicing domain over a Chinook-style schema (customers, tracks,
//! invoices, invoice lines). [`service::InvoiceService`] shows the composite
//! transactional write: resolve catalog prices, backfill billing details,
//! then persist the invoice header and its lines inside one transaction.

pub mod db;
pub mod dto;
pub mod error;
pub mod models;
pub mod service;

pub use error::AppError;
pub use service::InvoiceService;
