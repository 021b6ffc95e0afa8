pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod service;

pub use crate::config::{AppConfig, ToleranceConfig};
pub use error::ReconcileError;
pub use models::{Checklist, Invoice, InvoicePrediction, InvoiceTotals, MonetaryField, TaxLine};
pub use service::ReconcileService;
