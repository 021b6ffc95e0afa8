use thiserror::Error;

/// 对账外围层错误（输入解析、导出、配置）；对账核心本身不产生错误
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] ::config::ConfigError),
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
