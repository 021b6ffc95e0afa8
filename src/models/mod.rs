pub mod field;
pub mod invoice;
pub mod prediction;
pub mod result;

pub use field::{array_probability, MonetaryField, TaxLine};
pub use invoice::{Invoice, InvoiceTotals, TextField};
pub use prediction::{InvoicePrediction, NOT_AVAILABLE};
pub use result::{Checklist, ReconcileReport, ReconstructedField};
