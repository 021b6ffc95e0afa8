use crate::models::invoice::Invoice;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 一致性校验清单
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Checklist {
    pub taxes_match_total_incl: bool,
    pub taxes_match_total_excl: bool,
    pub taxes_plus_total_excl_match_total_incl: bool,
}

impl Checklist {
    /// 三项校验全部通过
    pub fn all_passed(&self) -> bool {
        self.taxes_match_total_incl
            && self.taxes_match_total_excl
            && self.taxes_plus_total_excl_match_total_incl
    }
}

/// 被推导补全的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconstructedField {
    TotalTax,
    TotalExcl,
    TotalIncl,
}

/// 单张发票对账结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// 校验清单随发票一起返回 (`invoice.checklist`)
    pub invoice: Invoice,
    pub reconstructed: Vec<ReconstructedField>,
    pub reconciled_at: DateTime<Utc>,
}
