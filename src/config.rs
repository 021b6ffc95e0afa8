use ::config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub tolerance: ToleranceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// 对账容差
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceConfig {
    /// 校验 A/B 的绝对误差
    pub amount_slack: f64,
    /// 校验 C 的绝对误差
    pub sum_slack: f64,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            amount_slack: 0.02,
            sum_slack: 0.01,
        }
    }
}

impl AppConfig {
    /// 默认值 + 环境变量覆盖 (如 RECONCILE__SERVER__PORT=9000)
    pub fn load() -> crate::error::Result<Self> {
        let env = Environment::with_prefix("RECONCILE")
            .separator("__")
            .try_parsing(true);
        Ok(Self::load_from(env)?)
    }

    fn load_from(env: Environment) -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();
        Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("tolerance.amount_slack", defaults.tolerance.amount_slack)?
            .set_default("tolerance.sum_slack", defaults.tolerance.sum_slack)?
            .add_source(env)
            .build()?
            .try_deserialize()
    }
}
