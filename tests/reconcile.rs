use invoice_reconcile_rust::models::{ReconcileReport, ReconstructedField};
use invoice_reconcile_rust::service::export_reports_csv;
use invoice_reconcile_rust::{InvoicePrediction, ReconcileService, ToleranceConfig};
use serde_json::{json, Value};

/// 全部字段为 "N/A" 的抽取结果
fn base_prediction() -> Value {
    json!({
        "total_incl": { "value": "N/A", "probability": 0.0 },
        "total_excl": { "value": "N/A", "probability": 0.0 },
        "date": { "value": "N/A", "probability": 0.0 },
        "due_date": { "value": "N/A", "probability": 0.0 },
        "invoice_number": { "value": "N/A", "probability": 0.0 },
        "supplier": { "value": "N/A", "probability": 0.0 },
        "taxes": [],
        "company_registration": [],
        "payment_details": []
    })
}

fn with(overrides: Value) -> Value {
    let mut prediction = base_prediction();
    let (Value::Object(base), Value::Object(extra)) = (&mut prediction, overrides) else {
        panic!("predictions must be JSON objects");
    };
    base.extend(extra);
    prediction
}

fn reconcile(prediction: Value) -> ReconcileReport {
    let invoice = InvoicePrediction::from_value(prediction).unwrap().normalize();
    ReconcileService::default().reconcile_invoice(invoice)
}

#[test]
fn all_na_prediction() {
    let report = reconcile(base_prediction());
    let totals = &report.invoice.totals;
    assert_eq!(totals.total_incl.value, None);
    assert_eq!(totals.total_excl.value, None);
    assert_eq!(totals.total_tax.value, None);
    assert!(totals.taxes.is_empty());
    assert_eq!(report.invoice.invoice_number.value, None);
    assert_eq!(report.invoice.supplier.value, None);
    assert_eq!(report.invoice.date.value, None);
    assert!(report.invoice.company_registration.is_empty());
    assert!(report.invoice.payment_details.is_empty());
    assert!(!report.invoice.checklist.taxes_match_total_incl);
    assert!(!report.invoice.checklist.taxes_match_total_excl);
    assert!(!report.invoice.checklist.taxes_plus_total_excl_match_total_incl);
    assert!(report.reconstructed.is_empty());
}

#[test]
fn full_prediction_passes_every_check() {
    let report = reconcile(with(json!({
        "invoice_number": { "value": "0042004801351", "probability": 0.99 },
        "supplier": { "value": "TURNPIKE DESIGNS", "probability": 0.9 },
        "date": { "value": "2020-02-17", "probability": 0.99 },
        "total_incl": { "value": 507.25, "probability": 0.6 },
        "total_excl": { "value": 456.15, "probability": 0.6 },
        "taxes": [
            { "rate": 20, "value": 10.99, "code": "TVA", "probability": 0.5 },
            { "rate": 10, "value": 40.12, "code": "TVA", "probability": 0.1 }
        ]
    })));
    assert!(report.invoice.checklist.all_passed());
    assert_eq!(report.invoice.date.value.as_deref(), Some("2020-02-17"));
    let totals = &report.invoice.totals;
    assert_eq!(totals.total_incl.confidence, 1.0);
    assert_eq!(totals.total_excl.confidence, 1.0);
    assert!(totals.taxes.iter().all(|tax| tax.confidence == 1.0));
    assert_eq!(totals.total_tax.value, Some(10.99 + 40.12));
    assert_eq!(totals.total_tax.confidence, 1.0);
    assert_eq!(report.reconstructed, vec![ReconstructedField::TotalTax]);

    let rendered = report.invoice.to_string();
    assert!(rendered.contains("Invoice number: 0042004801351"));
    assert!(rendered.contains("Supplier name: TURNPIKE DESIGNS"));
    assert!(rendered.contains("Taxes: TVA 20% 10.99 - TVA 10% 40.12"));
}

#[test]
fn total_incl_not_reconstructed_without_taxes() {
    let report = reconcile(with(json!({
        "total_excl": { "value": 240.5, "probability": 0.9 },
        "taxes": []
    })));
    assert_eq!(report.invoice.totals.total_incl.value, None);
}

#[test]
fn total_incl_not_reconstructed_without_total_excl() {
    let report = reconcile(with(json!({
        "taxes": [{ "rate": 20, "value": 9.5, "probability": 0.9 }]
    })));
    assert_eq!(report.invoice.totals.total_incl.value, None);
}

#[test]
fn total_incl_already_set_is_kept() {
    let report = reconcile(with(json!({
        "total_incl": { "value": 260, "probability": 0.4 },
        "total_excl": { "value": 240.5, "probability": 0.9 },
        "taxes": [{ "rate": 20, "value": 9.5, "probability": 0.9 }]
    })));
    assert_eq!(report.invoice.totals.total_incl.value, Some(260.0));
    assert_eq!(report.invoice.totals.total_incl.confidence, 0.4);
}

#[test]
fn total_incl_reconstructed() {
    let report = reconcile(with(json!({
        "total_excl": { "value": 240.5, "probability": 0.9 },
        "taxes": [{ "rate": 20, "value": 9.5, "probability": 0.9 }]
    })));
    let total_incl = report.invoice.totals.total_incl;
    assert_eq!(total_incl.value, Some(250.0));
    assert_eq!(total_incl.confidence, 0.81);
    assert!(total_incl.derived);
}

#[test]
fn total_excl_not_reconstructed_without_total_incl() {
    let report = reconcile(with(json!({
        "taxes": [{ "rate": 20, "value": 9.5, "probability": 0.9 }]
    })));
    assert_eq!(report.invoice.totals.total_excl.value, None);
}

#[test]
fn total_excl_not_reconstructed_without_taxes() {
    let report = reconcile(with(json!({
        "total_incl": { "value": 1150.2, "probability": 0.7 }
    })));
    assert_eq!(report.invoice.totals.total_excl.value, None);
}

#[test]
fn total_excl_already_set_is_kept() {
    let report = reconcile(with(json!({
        "total_incl": { "value": 1150.2, "probability": 0.7 },
        "total_excl": { "value": 1050.0, "probability": 0.4 }
    })));
    assert_eq!(report.invoice.totals.total_excl.value, Some(1050.0));
    assert_eq!(report.invoice.totals.total_excl.confidence, 0.4);
}

#[test]
fn total_excl_reconstructed() {
    let report = reconcile(with(json!({
        "total_incl": { "value": 1150.2, "probability": 0.6 },
        "taxes": [
            { "rate": 20, "value": 10.2, "probability": 0.5 },
            { "rate": 10, "value": 40.0, "probability": 0.1 }
        ]
    })));
    assert_eq!(report.invoice.totals.total_excl.value, Some(1100.0));
    assert_eq!(report.invoice.totals.total_excl.confidence, 0.03);
}

#[test]
fn total_tax_not_reconstructed_without_taxes() {
    let report = reconcile(base_prediction());
    assert_eq!(report.invoice.totals.total_tax.value, None);
}

#[test]
fn total_tax_reconstructed() {
    let report = reconcile(with(json!({
        "taxes": [
            { "rate": 20, "value": 10.2, "probability": 0.5 },
            { "rate": 10, "value": 40.0, "probability": 0.1 }
        ]
    })));
    assert_eq!(report.invoice.totals.total_tax.value, Some(50.2));
    assert_eq!(report.invoice.totals.total_tax.confidence, 0.05);
}

#[test]
fn match_on_total_incl() {
    let report = reconcile(with(json!({
        "total_incl": { "value": 507.25, "probability": 0.6 },
        "taxes": [
            { "rate": 20, "value": 10.99, "probability": 0.5 },
            { "rate": 10, "value": 40.12, "probability": 0.1 }
        ]
    })));
    assert!(report.invoice.checklist.taxes_match_total_incl);
    assert_eq!(report.invoice.totals.total_incl.confidence, 1.0);
    assert!(report.invoice.totals.taxes.iter().all(|tax| tax.confidence == 1.0));
}

#[test]
fn no_match_on_total_incl() {
    let report = reconcile(with(json!({
        "total_incl": { "value": 507.25, "probability": 0.6 },
        "taxes": [
            { "rate": 20, "value": 10.9, "probability": 0.5 },
            { "rate": 10, "value": 40.12, "probability": 0.1 }
        ]
    })));
    assert!(!report.invoice.checklist.taxes_match_total_incl);
}

#[test]
fn no_match_on_total_incl_with_zero_vat() {
    let report = reconcile(with(json!({
        "total_incl": { "value": 507.25, "probability": 0.6 },
        "taxes": [{ "rate": 20, "value": 0.0, "probability": 0.5 }]
    })));
    assert!(!report.invoice.checklist.taxes_match_total_incl);
}

#[test]
fn match_on_total_excl() {
    let report = reconcile(with(json!({
        "total_excl": { "value": 456.15, "probability": 0.6 },
        "taxes": [
            { "rate": 20, "value": 10.99, "probability": 0.5 },
            { "rate": 10, "value": 40.12, "probability": 0.1 }
        ]
    })));
    assert!(report.invoice.checklist.taxes_match_total_excl);
    assert_eq!(report.invoice.totals.total_excl.confidence, 1.0);
    assert!(report.invoice.totals.taxes.iter().all(|tax| tax.confidence == 1.0));
}

#[test]
fn no_match_on_total_excl() {
    let report = reconcile(with(json!({
        "total_excl": { "value": 507.25, "probability": 0.6 },
        "taxes": [
            { "rate": 20, "value": 10.9, "probability": 0.5 },
            { "rate": 10, "value": 40.12, "probability": 0.1 }
        ]
    })));
    assert!(!report.invoice.checklist.taxes_match_total_excl);

    let report = reconcile(with(json!({
        "total_excl": { "value": 507.25, "probability": 0.6 },
        "taxes": [{ "rate": 20, "value": 0.0, "probability": 0.5 }]
    })));
    assert!(!report.invoice.checklist.taxes_match_total_excl);
}

#[test]
fn match_on_taxes_plus_total_excl() {
    let report = reconcile(with(json!({
        "total_incl": { "value": 507.25, "probability": 0.6 },
        "total_excl": { "value": 456.15, "probability": 0.6 },
        "taxes": [
            { "rate": 20, "value": 10.99, "probability": 0.5 },
            { "rate": 10, "value": 40.12, "probability": 0.1 }
        ]
    })));
    assert!(report.invoice.checklist.taxes_plus_total_excl_match_total_incl);
    assert_eq!(report.invoice.totals.total_incl.confidence, 1.0);
    assert_eq!(report.invoice.totals.total_excl.confidence, 1.0);
    assert!(report.invoice.totals.taxes.iter().all(|tax| tax.confidence == 1.0));
}

#[test]
fn no_match_on_taxes_plus_total_excl() {
    let report = reconcile(with(json!({
        "total_incl": { "value": 507.2, "probability": 0.6 },
        "total_excl": { "value": 456.15, "probability": 0.6 },
        "taxes": [
            { "rate": 20, "value": 10.99, "probability": 0.5 },
            { "rate": 10, "value": 40.12, "probability": 0.1 }
        ]
    })));
    assert!(!report.invoice.checklist.taxes_plus_total_excl_match_total_incl);

    let report = reconcile(with(json!({
        "total_incl": { "value": 507.25, "probability": 0.6 },
        "total_excl": { "value": 456.15, "probability": 0.6 },
        "taxes": [{ "rate": 20, "value": 0, "probability": 0.5 }]
    })));
    assert!(!report.invoice.checklist.taxes_plus_total_excl_match_total_incl);
}

#[test]
fn wider_tolerance_accepts_looser_sums() {
    let prediction = with(json!({
        "total_incl": { "value": 507.2, "probability": 0.6 },
        "total_excl": { "value": 456.15, "probability": 0.6 },
        "taxes": [
            { "rate": 20, "value": 10.99, "probability": 0.5 },
            { "rate": 10, "value": 40.12, "probability": 0.1 }
        ]
    }));
    let invoice = InvoicePrediction::from_value(prediction).unwrap().normalize();
    let service = ReconcileService::new(ToleranceConfig {
        amount_slack: 0.02,
        sum_slack: 0.1,
    });
    let report = service.reconcile_invoice(invoice);
    assert!(report.invoice.checklist.taxes_plus_total_excl_match_total_incl);
}

#[test]
fn batch_reports_export_to_csv() {
    let predictions = vec![
        with(json!({
            "invoice_number": { "value": "A-1", "probability": 0.9 },
            "total_excl": { "value": 240.5, "probability": 0.9 },
            "taxes": [{ "rate": 20, "value": 9.5, "probability": 0.9 }]
        })),
        base_prediction(),
    ];
    let invoices = predictions
        .into_iter()
        .map(|p| InvoicePrediction::from_value(p).unwrap().normalize())
        .collect();
    let reports = ReconcileService::default().reconcile_batch(invoices);
    assert_eq!(reports[0].invoice.invoice_number.value.as_deref(), Some("A-1"));
    assert_eq!(reports[0].invoice.totals.total_incl.value, Some(250.0));
    assert_eq!(reports[1].invoice.totals.total_incl.value, None);

    let mut buffer = Vec::new();
    export_reports_csv(&reports, &mut buffer).unwrap();
    let output = String::from_utf8(buffer).unwrap();
    assert_eq!(output.lines().count(), 3);
    assert!(output.lines().nth(1).unwrap().starts_with("0,A-1,250,"));
}
