use axum::{routing::{get, post}, Router};
use invoice_reconcile_rust::{api, AppConfig, ReconcileService};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    let service = Arc::new(ReconcileService::new(config.tolerance));

    // 构建路由
    let reconcile_routes = Router::new()
        .route("/api/invoice/reconcile", post(api::reconcile_invoice))
        .route("/api/invoice/reconcile/batch", post(api::reconcile_batch))
        .with_state(service);

    let app = Router::new()
        .route("/health", get(api::health_check))
        .merge(reconcile_routes)
        .layer(ServiceBuilder::new());

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/invoice/reconcile        - single prediction");
    info!("  POST /api/invoice/reconcile/batch  - batch of predictions");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
