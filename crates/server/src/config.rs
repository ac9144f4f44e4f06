//! 请求参数解析配置
//!
//! 限制请求体大小和 multipart 非文件字段的内存占用

use serde::{Deserialize, Serialize};

/// 解析配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseConfig {
    /// 最大请求体大小（字节），默认 10MB
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
    /// multipart 非文件字段可缓存的总字节数，默认 2048
    #[serde(default = "default_multipart_max_memory")]
    pub multipart_max_memory: usize,
}

fn default_max_body_size() -> usize {
    10 * 1024 * 1024 // 10MB
}

fn default_multipart_max_memory() -> usize {
    2048
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            max_body_size: default_max_body_size(),
            multipart_max_memory: default_multipart_max_memory(),
        }
    }
}
