//! 应用配置
//!
//! 默认值 <- `REQDATA_CONFIG` 指向的 YAML 文件 <- `REQDATA_ADDR` 环境变量

use anyhow::Context;
use reqdata_server::ParseConfig;
use serde::{Deserialize, Serialize};

/// YAML 配置文件路径的环境变量
pub const CONFIG_ENV: &str = "REQDATA_CONFIG";
/// 监听地址的环境变量
pub const ADDR_ENV: &str = "REQDATA_ADDR";

/// 应用配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 监听地址
    #[serde(default = "default_addr")]
    pub addr: String,
    /// 请求参数解析配置
    #[serde(default)]
    pub parse: ParseConfig,
}

fn default_addr() -> String {
    "127.0.0.1:8787".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            parse: ParseConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从环境变量加载
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(std::env::var(CONFIG_ENV).ok(), std::env::var(ADDR_ENV).ok())
    }

    fn load_from(config_path: Option<String>, addr: Option<String>) -> anyhow::Result<Self> {
        let mut config = match config_path {
            Some(path) => {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("读取配置文件失败: {}", path))?;
                Self::from_yaml(&content).with_context(|| format!("解析配置文件失败: {}", path))?
            }
            None => Self::default(),
        };
        if let Some(addr) = addr {
            config.addr = addr;
        }
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }
}
