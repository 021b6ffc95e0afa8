use serde::{Deserialize, Serialize};
use std::fmt;

/// 金额字段：可缺失的数值 + 置信度
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MonetaryField {
    pub value: Option<f64>,
    pub confidence: f64,
    /// 由其他字段推导得到（非抽取结果），仅作标记
    #[serde(default)]
    pub derived: bool,
}

impl MonetaryField {
    pub fn new(value: Option<f64>, confidence: f64) -> Self {
        Self {
            value,
            confidence,
            derived: false,
        }
    }

    /// 缺失字段 ("N/A")
    pub fn absent() -> Self {
        Self::new(None, 0.0)
    }

    /// 推导字段
    pub fn reconstructed(value: f64, confidence: f64) -> Self {
        Self {
            value: Some(value),
            confidence,
            derived: true,
        }
    }

    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }

    /// 校验通过后置信度提升为 1.0
    pub fn certain(self) -> Self {
        Self {
            confidence: 1.0,
            ..self
        }
    }
}

/// 税额行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxLine {
    pub value: Option<f64>,
    pub rate: Option<f64>,
    pub code: Option<String>,
    pub confidence: f64,
}

impl TaxLine {
    pub fn new(value: Option<f64>, rate: Option<f64>, confidence: f64) -> Self {
        Self {
            value,
            rate,
            code: None,
            confidence,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// 可用于按税率反推税基的行：税额存在且税率非零
    pub fn usable_for_base(&self) -> Option<(f64, f64)> {
        match (self.value, self.rate) {
            (Some(value), Some(rate)) if rate != 0.0 => Some((value, rate)),
            _ => None,
        }
    }
}

impl fmt::Display for TaxLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.value.map(|v| v.to_string()).unwrap_or_default();
        let rate = self.rate.map(|r| format!("{}%", r)).unwrap_or_default();
        match &self.code {
            Some(code) => write!(f, "{} {} {}", code, rate, value),
            None => write!(f, "{} {}", rate, value),
        }
    }
}

/// 税额行置信度连乘（空列表为 1.0，未定义的置信度视为 1.0）
///
/// 归一化层已过滤 NaN；此处的 NaN 分支针对 `Invoice::from_parts` 等直接构造的记录
pub fn array_probability(taxes: &[TaxLine]) -> f64 {
    taxes.iter().fold(1.0, |acc, tax| {
        if tax.confidence.is_nan() {
            acc
        } else {
            acc * tax.confidence
        }
    })
}

/// 税额合计：缺失税额按 0 计
pub fn sum_present(taxes: &[TaxLine]) -> f64 {
    taxes.iter().fold(0.0, |acc, tax| match tax.value {
        Some(value) => acc + value,
        None => acc,
    })
}

/// 税额合计：仅累加存在且非零的税额
///
/// NaN 与 0 一样不参与累加，同样只针对未经归一化直接构造的记录
pub fn sum_non_zero(taxes: &[TaxLine]) -> f64 {
    taxes.iter().fold(0.0, |acc, tax| match tax.value {
        Some(value) if value != 0.0 && !value.is_nan() => acc + value,
        _ => acc,
    })
}

/// 全部税额行置信度提升为 1.0（生成新序列）
pub fn certain_taxes(taxes: &[TaxLine]) -> Vec<TaxLine> {
    taxes
        .iter()
        .map(|tax| TaxLine {
            confidence: 1.0,
            ..tax.clone()
        })
        .collect()
}
