use crate::models::{Invoice, InvoicePrediction, ReconcileReport};
use crate::service::ReconcileService;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 请求体: 批量抽取结果
#[derive(Debug, Deserialize)]
pub struct BatchReconcileRequest {
    pub predictions: Vec<InvoicePrediction>,
}

/// 单张发票响应体
#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    pub success: bool,
    pub message: String,
    pub report: ReconcileReport,
}

/// 批量响应体
#[derive(Debug, Serialize)]
pub struct BatchReconcileResponse {
    pub success: bool,
    pub message: String,
    pub reports: Vec<ReconcileReport>,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 单张发票对账接口
pub async fn reconcile_invoice(
    State(service): State<Arc<ReconcileService>>,
    Json(prediction): Json<InvoicePrediction>,
) -> Response {
    let report = service.reconcile_invoice(prediction.normalize());
    let response = ReconcileResponse {
        success: true,
        message: format!(
            "Reconciled invoice, {} field(s) reconstructed",
            report.reconstructed.len()
        ),
        report,
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// 批量对账接口
pub async fn reconcile_batch(
    State(service): State<Arc<ReconcileService>>,
    Json(req): Json<BatchReconcileRequest>,
) -> Response {
    let total = req.predictions.len();
    let invoices: Vec<Invoice> = req
        .predictions
        .into_iter()
        .map(InvoicePrediction::normalize)
        .collect();

    // rayon 并行计算，避免阻塞 tokio 工作线程
    let reports = match tokio::task::spawn_blocking(move || service.reconcile_batch(invoices)).await {
        Ok(reports) => reports,
        Err(e) => {
            tracing::error!("Batch reconciliation failed: {}", e);
            let response = BatchReconcileResponse {
                success: false,
                message: format!("Error: {}", e),
                reports: Vec::new(),
            };
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response();
        }
    };

    let all_passed = reports.iter().filter(|r| r.invoice.checklist.all_passed()).count();
    let response = BatchReconcileResponse {
        success: true,
        message: format!(
            "Successfully reconciled {} invoices, {} passed every check",
            total, all_passed
        ),
        reports,
    };
    (StatusCode::OK, Json(response)).into_response()
}
