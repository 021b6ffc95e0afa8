use crate::config::ToleranceConfig;
use crate::error::Result;
use crate::models::{Checklist, Invoice, InvoiceTotals, MonetaryField, ReconcileReport};
use crate::service::{checker, reconstructor};
use chrono::Utc;
use rayon::prelude::*;
use std::io;

/// 对账服务：先一致性校验，再推导补全
#[derive(Debug, Clone, Default)]
pub struct ReconcileService {
    tolerance: ToleranceConfig,
}

impl ReconcileService {
    pub fn new(tolerance: ToleranceConfig) -> Self {
        Self { tolerance }
    }

    /// 对金额汇总做校验 + 推导，原地更新并返回校验清单
    pub fn reconcile(&self, totals: &mut InvoiceTotals) -> Checklist {
        let checklist = checker::run_checklist(totals, &self.tolerance);
        reconstructor::reconstruct(totals);
        checklist
    }

    /// 单张发票对账
    pub fn reconcile_invoice(&self, mut invoice: Invoice) -> ReconcileReport {
        let checklist = checker::run_checklist(&mut invoice.totals, &self.tolerance);
        let reconstructed = reconstructor::reconstruct(&mut invoice.totals);
        invoice.checklist = checklist;

        tracing::debug!(
            "发票 {} 对账完成, 推导字段: {:?}",
            invoice.invoice_number.value.as_deref().unwrap_or("-"),
            reconstructed
        );

        ReconcileReport {
            invoice,
            reconstructed,
            reconciled_at: Utc::now(),
        }
    }

    /// 批量对账：记录之间相互独立，并行处理，输出顺序与输入一致
    pub fn reconcile_batch(&self, invoices: Vec<Invoice>) -> Vec<ReconcileReport> {
        let total = invoices.len();
        let reports: Vec<ReconcileReport> = invoices
            .into_par_iter()
            .map(|invoice| self.reconcile_invoice(invoice))
            .collect();

        let all_passed = reports.iter().filter(|r| r.invoice.checklist.all_passed()).count();
        let with_reconstruction = reports.iter().filter(|r| !r.reconstructed.is_empty()).count();
        tracing::info!(
            "批量对账完成: 总数: {}, 全部校验通过: {}, 含推导字段: {}",
            total,
            all_passed,
            with_reconstruction
        );
        reports
    }
}

fn amount_to_csv(field: &MonetaryField) -> [String; 3] {
    [
        field.value.map(|v| v.to_string()).unwrap_or_default(),
        field.confidence.to_string(),
        field.derived.to_string(),
    ]
}

const CSV_HEADER: [&str; 15] = [
    "index",
    "invoice_number",
    "total_incl",
    "total_incl_confidence",
    "total_incl_derived",
    "total_excl",
    "total_excl_confidence",
    "total_excl_derived",
    "total_tax",
    "total_tax_confidence",
    "total_tax_derived",
    "taxes_match_total_incl",
    "taxes_match_total_excl",
    "taxes_plus_total_excl_match_total_incl",
    "reconciled_at",
];

/// 导出对账结果到 CSV
pub fn export_reports_csv<W: io::Write>(reports: &[ReconcileReport], writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(CSV_HEADER)?;

    for (index, report) in reports.iter().enumerate() {
        let totals = &report.invoice.totals;
        let mut record = vec![
            index.to_string(),
            report.invoice.invoice_number.value.clone().unwrap_or_default(),
        ];
        record.extend(amount_to_csv(&totals.total_incl));
        record.extend(amount_to_csv(&totals.total_excl));
        record.extend(amount_to_csv(&totals.total_tax));
        record.push(report.invoice.checklist.taxes_match_total_incl.to_string());
        record.push(report.invoice.checklist.taxes_match_total_excl.to_string());
        record.push(report.invoice.checklist.taxes_plus_total_excl_match_total_incl.to_string());
        record.push(report.reconciled_at.to_rfc3339());
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}
