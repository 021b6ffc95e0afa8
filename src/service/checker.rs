use crate::config::ToleranceConfig;
use crate::models::field::{certain_taxes, sum_present};
use crate::models::{Checklist, InvoiceTotals};

/// 校验通过后需要提升置信度的合计字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Corroborated {
    TotalIncl,
    TotalExcl,
}

/// 按税率逐行反推：返回 (税额合计, 反推金额合计)
///
/// 税额或税率缺失、税率为 0 的行直接跳过
fn rebuild_from_rates(totals: &InvoiceTotals, include_tax: bool) -> (f64, f64) {
    let mut total_vat = 0.0;
    let mut reconstructed = 0.0;
    for (value, rate) in totals.taxes.iter().filter_map(|tax| tax.usable_for_base()) {
        total_vat += value;
        reconstructed += if include_tax {
            value + (100.0 * value) / rate
        } else {
            (100.0 * value) / rate
        };
    }
    (total_vat, reconstructed)
}

/// 相对误差随税额合计收紧，外加固定绝对误差
fn within_vat_band(expected: f64, reconstructed: f64, total_vat: f64, slack: f64) -> bool {
    let eps = 1.0 / (100.0 * total_vat);
    expected * (1.0 - eps) - slack <= reconstructed && reconstructed <= expected * (1.0 + eps) + slack
}

/// 校验 A：各行 (税额 + 税基) 之和 ≈ 含税合计
pub fn taxes_match_total_incl(totals: &InvoiceTotals, tolerance: &ToleranceConfig) -> bool {
    let Some(total_incl) = totals.total_incl.value else {
        return false;
    };
    if totals.taxes.is_empty() {
        return false;
    }

    let (total_vat, reconstructed) = rebuild_from_rates(totals, true);
    if total_vat <= 0.0 {
        return false;
    }
    within_vat_band(total_incl, reconstructed, total_vat, tolerance.amount_slack)
}

/// 校验 B：各行税基之和 ≈ 不含税合计
pub fn taxes_match_total_excl(totals: &InvoiceTotals, tolerance: &ToleranceConfig) -> bool {
    let Some(total_excl) = totals.total_excl.value else {
        return false;
    };
    if totals.taxes.is_empty() {
        return false;
    }

    let (total_vat, reconstructed) = rebuild_from_rates(totals, false);
    if total_vat <= 0.0 {
        return false;
    }
    within_vat_band(total_excl, reconstructed, total_vat, tolerance.amount_slack)
}

/// 校验 C：税额合计 + 不含税合计 ≈ 含税合计（固定绝对误差）
pub fn taxes_plus_total_excl_match_total_incl(
    totals: &InvoiceTotals,
    tolerance: &ToleranceConfig,
) -> bool {
    let (Some(total_excl), Some(total_incl)) = (totals.total_excl.value, totals.total_incl.value)
    else {
        return false;
    };
    if totals.taxes.is_empty() {
        return false;
    }

    // 缺失税额按 0 计（与 A/B 的跳过逻辑不同）
    let total_vat = sum_present(&totals.taxes);
    if total_vat <= 0.0 {
        return false;
    }
    let reconstructed = total_vat + total_excl;
    total_incl - tolerance.sum_slack <= reconstructed
        && reconstructed <= total_incl + tolerance.sum_slack
}

fn upgrade(totals: InvoiceTotals, field: Corroborated) -> InvoiceTotals {
    let mut upgraded = InvoiceTotals {
        taxes: certain_taxes(&totals.taxes),
        total_tax: totals.total_tax.certain(),
        ..totals
    };
    match field {
        Corroborated::TotalIncl => upgraded.total_incl = upgraded.total_incl.certain(),
        Corroborated::TotalExcl => upgraded.total_excl = upgraded.total_excl.certain(),
    }
    upgraded
}

/// 一致性校验：三项校验均只读取抽取值，通过的校验再统一提升置信度
pub fn run_checklist(totals: &mut InvoiceTotals, tolerance: &ToleranceConfig) -> Checklist {
    let checklist = Checklist {
        taxes_match_total_incl: taxes_match_total_incl(totals, tolerance),
        taxes_match_total_excl: taxes_match_total_excl(totals, tolerance),
        taxes_plus_total_excl_match_total_incl: taxes_plus_total_excl_match_total_incl(
            totals, tolerance,
        ),
    };

    let mut upgraded = std::mem::take(totals);
    if checklist.taxes_match_total_incl {
        upgraded = upgrade(upgraded, Corroborated::TotalIncl);
    }
    if checklist.taxes_match_total_excl {
        upgraded = upgrade(upgraded, Corroborated::TotalExcl);
    }
    if checklist.taxes_plus_total_excl_match_total_incl {
        upgraded = upgrade(upgraded, Corroborated::TotalIncl);
    }
    *totals = upgraded;

    tracing::debug!(
        "校验结果: 含税匹配={}, 不含税匹配={}, 税额+不含税=含税={}",
        checklist.taxes_match_total_incl,
        checklist.taxes_match_total_excl,
        checklist.taxes_plus_total_excl_match_total_incl
    );
    checklist
}
