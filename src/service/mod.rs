pub mod checker;
pub mod reconciler;
pub mod reconstructor;

pub use checker::run_checklist;
pub use reconciler::{export_reports_csv, ReconcileService};
pub use reconstructor::reconstruct;
