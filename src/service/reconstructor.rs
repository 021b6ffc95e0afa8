use crate::models::field::{sum_non_zero, sum_present};
use crate::models::{array_probability, InvoiceTotals, MonetaryField, ReconstructedField};

/// 推导步骤：输入当前记录，返回更新后的记录及补全的字段
pub type Step = fn(InvoiceTotals) -> (InvoiceTotals, Option<ReconstructedField>);

/// 推导顺序固定，后续步骤可见前序步骤补全的值
pub const RECONSTRUCTION_STEPS: [Step; 4] = [
    total_tax_from_taxes,
    total_excl_from_total_incl,
    total_incl_from_total_excl,
    total_tax_from_totals,
];

/// 1. 税额行合计 -> 税额合计（已有值也重新计算，合计 <= 0 时不写入）
pub fn total_tax_from_taxes(totals: InvoiceTotals) -> (InvoiceTotals, Option<ReconstructedField>) {
    if totals.taxes.is_empty() {
        return (totals, None);
    }
    let value = sum_present(&totals.taxes);
    if value <= 0.0 {
        return (totals, None);
    }
    let total_tax = MonetaryField::reconstructed(value, array_probability(&totals.taxes));
    (
        InvoiceTotals { total_tax, ..totals },
        Some(ReconstructedField::TotalTax),
    )
}

/// 2. 含税合计 - 税额行合计 -> 不含税合计
pub fn total_excl_from_total_incl(
    totals: InvoiceTotals,
) -> (InvoiceTotals, Option<ReconstructedField>) {
    let Some(total_incl) = totals.total_incl.value else {
        return (totals, None);
    };
    if totals.taxes.is_empty() || totals.total_excl.is_present() {
        return (totals, None);
    }
    let total_excl = MonetaryField::reconstructed(
        total_incl - sum_present(&totals.taxes),
        array_probability(&totals.taxes) * totals.total_incl.confidence,
    );
    (
        InvoiceTotals { total_excl, ..totals },
        Some(ReconstructedField::TotalExcl),
    )
}

/// 3. 不含税合计 + 税额行合计 -> 含税合计（税额为 0 的行不参与累加）
pub fn total_incl_from_total_excl(
    totals: InvoiceTotals,
) -> (InvoiceTotals, Option<ReconstructedField>) {
    let Some(total_excl) = totals.total_excl.value else {
        return (totals, None);
    };
    if totals.taxes.is_empty() || totals.total_incl.is_present() {
        return (totals, None);
    }
    let total_incl = MonetaryField::reconstructed(
        total_excl + sum_non_zero(&totals.taxes),
        array_probability(&totals.taxes) * totals.total_excl.confidence,
    );
    (
        InvoiceTotals { total_incl, ..totals },
        Some(ReconstructedField::TotalIncl),
    )
}

/// 4. 含税合计 - 不含税合计 -> 税额合计（兜底）
pub fn total_tax_from_totals(totals: InvoiceTotals) -> (InvoiceTotals, Option<ReconstructedField>) {
    if totals.total_tax.is_present() {
        return (totals, None);
    }
    let (Some(total_incl), Some(total_excl)) = (totals.total_incl.value, totals.total_excl.value)
    else {
        return (totals, None);
    };
    if total_incl <= 0.0 || total_excl <= 0.0 || total_excl > total_incl {
        return (totals, None);
    }
    let value = total_incl - total_excl;
    if value <= 0.0 {
        return (totals, None);
    }
    let total_tax = MonetaryField::reconstructed(
        value,
        totals.total_incl.confidence * totals.total_excl.confidence,
    );
    (
        InvoiceTotals { total_tax, ..totals },
        Some(ReconstructedField::TotalTax),
    )
}

/// 按固定顺序执行全部推导步骤，返回补全的字段
pub fn reconstruct(totals: &mut InvoiceTotals) -> Vec<ReconstructedField> {
    let mut filled = Vec::new();
    let mut current = std::mem::take(totals);
    for step in RECONSTRUCTION_STEPS {
        let (next, field) = step(current);
        current = next;
        if let Some(field) = field {
            tracing::debug!("推导补全字段: {:?}", field);
            filled.push(field);
        }
    }
    *totals = current;
    filled
}
