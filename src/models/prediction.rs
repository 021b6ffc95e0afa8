use crate::error::Result;
use crate::models::field::{MonetaryField, TaxLine};
use crate::models::invoice::{Invoice, InvoiceTotals, TextField};
use serde::Deserialize;

/// 缺失值占位符
pub const NOT_AVAILABLE: &str = "N/A";

/// 抽取结果中的原始值：数字或字符串（可能为 "N/A"）
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    fn as_number(&self) -> Option<f64> {
        let number = match self {
            RawValue::Number(n) => Some(*n),
            RawValue::Text(s) if s == NOT_AVAILABLE => None,
            RawValue::Text(s) => s.trim().parse::<f64>().ok(),
        };
        number.filter(|n| n.is_finite())
    }

    fn as_text(&self) -> Option<String> {
        match self {
            RawValue::Number(n) => Some(n.to_string()),
            RawValue::Text(s) if s == NOT_AVAILABLE || s.is_empty() => None,
            RawValue::Text(s) => Some(s.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAmount {
    #[serde(default)]
    pub value: Option<RawValue>,
    #[serde(default)]
    pub probability: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTax {
    #[serde(default)]
    pub value: Option<RawValue>,
    #[serde(default)]
    pub rate: Option<RawValue>,
    #[serde(default)]
    pub code: Option<RawValue>,
    #[serde(default)]
    pub probability: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawText {
    #[serde(default)]
    pub value: Option<RawValue>,
    #[serde(default)]
    pub probability: Option<f64>,
}

/// 上游抽取结果 (单页预测)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoicePrediction {
    #[serde(default)]
    pub total_incl: RawAmount,
    #[serde(default)]
    pub total_excl: RawAmount,
    #[serde(default)]
    pub taxes: Vec<RawTax>,
    #[serde(default)]
    pub invoice_number: RawText,
    #[serde(default)]
    pub supplier: RawText,
    #[serde(default)]
    pub date: RawText,
    #[serde(default)]
    pub due_date: RawText,
    #[serde(default)]
    pub company_registration: Vec<RawText>,
    #[serde(default)]
    pub payment_details: Vec<RawText>,
}

/// 置信度裁剪到 [0,1]，NaN 视为 0
fn confidence(probability: Option<f64>, default: f64) -> f64 {
    match probability {
        Some(p) if p.is_nan() => 0.0,
        Some(p) => p.clamp(0.0, 1.0),
        None => default,
    }
}

impl InvoicePrediction {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// 归一化为强类型发票：所有 "N/A" 在此处转换为缺失
    pub fn normalize(self) -> Invoice {
        let taxes = self.taxes.iter().map(normalize_tax).collect();
        Invoice {
            invoice_number: normalize_text(&self.invoice_number),
            supplier: normalize_text(&self.supplier),
            date: normalize_text(&self.date),
            due_date: normalize_text(&self.due_date),
            company_registration: self.company_registration.iter().map(normalize_text).collect(),
            payment_details: self.payment_details.iter().map(normalize_text).collect(),
            totals: InvoiceTotals::new(
                normalize_amount(&self.total_incl),
                normalize_amount(&self.total_excl),
                taxes,
            ),
            ..Invoice::default()
        }
    }
}

fn normalize_amount(raw: &RawAmount) -> MonetaryField {
    MonetaryField::new(
        raw.value.as_ref().and_then(RawValue::as_number),
        confidence(raw.probability, 0.0),
    )
}

fn normalize_tax(raw: &RawTax) -> TaxLine {
    TaxLine {
        value: raw.value.as_ref().and_then(RawValue::as_number),
        rate: raw.rate.as_ref().and_then(RawValue::as_number),
        code: raw.code.as_ref().and_then(RawValue::as_text),
        confidence: confidence(raw.probability, 1.0),
    }
}

fn normalize_text(raw: &RawText) -> TextField {
    TextField::new(
        raw.value.as_ref().and_then(RawValue::as_text),
        confidence(raw.probability, 0.0),
    )
}
