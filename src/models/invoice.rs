use crate::models::field::{MonetaryField, TaxLine};
use crate::models::result::Checklist;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 发票金额汇总：三个合计字段 + 税额行
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub total_incl: MonetaryField,
    pub total_excl: MonetaryField,
    pub total_tax: MonetaryField,
    #[serde(default)]
    pub taxes: Vec<TaxLine>,
}

impl InvoiceTotals {
    pub fn new(total_incl: MonetaryField, total_excl: MonetaryField, taxes: Vec<TaxLine>) -> Self {
        Self {
            total_incl,
            total_excl,
            total_tax: MonetaryField::absent(),
            taxes,
        }
    }
}

/// 透传文本字段（发票号、供应商、日期等），不做解析
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextField {
    pub value: Option<String>,
    pub confidence: f64,
}

impl TextField {
    pub fn new(value: Option<String>, confidence: f64) -> Self {
        Self { value, confidence }
    }
}

/// 发票文档
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_number: TextField,
    pub supplier: TextField,
    pub date: TextField,
    pub due_date: TextField,
    #[serde(default)]
    pub company_registration: Vec<TextField>,
    #[serde(default)]
    pub payment_details: Vec<TextField>,
    pub totals: InvoiceTotals,
    #[serde(default)]
    pub checklist: Checklist,
}

impl Invoice {
    /// 手工构造：税额行以 (税额, 税率) 给出
    pub fn from_parts(
        total_incl: Option<f64>,
        total_excl: Option<f64>,
        taxes: &[(Option<f64>, Option<f64>)],
    ) -> Self {
        let taxes = taxes
            .iter()
            .map(|&(value, rate)| TaxLine::new(value, rate, 1.0))
            .collect();
        Self {
            totals: InvoiceTotals::new(
                MonetaryField::new(total_incl, 0.0),
                MonetaryField::new(total_excl, 0.0),
                taxes,
            ),
            ..Self::default()
        }
    }
}

fn text(field: &TextField) -> &str {
    field.value.as_deref().unwrap_or_default()
}

fn amount(field: &MonetaryField) -> String {
    field.value.map(|v| v.to_string()).unwrap_or_default()
}

impl fmt::Display for Invoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let taxes = self
            .totals
            .taxes
            .iter()
            .map(|tax| tax.to_string())
            .collect::<Vec<_>>()
            .join(" - ");
        writeln!(f, "-----Invoice data-----")?;
        writeln!(f, "Invoice number: {}", text(&self.invoice_number))?;
        writeln!(f, "Total amount including taxes: {}", amount(&self.totals.total_incl))?;
        writeln!(f, "Total amount excluding taxes: {}", amount(&self.totals.total_excl))?;
        writeln!(f, "Invoice Date: {}", text(&self.date))?;
        writeln!(f, "Supplier name: {}", text(&self.supplier))?;
        writeln!(f, "Taxes: {}", taxes)?;
        write!(f, "Total taxes: {}", amount(&self.totals.total_tax))
    }
}
