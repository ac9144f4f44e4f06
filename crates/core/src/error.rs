//! 错误类型
//!
//! - `AccessError`：类型化访问失败（键不存在、值无法转换）
//! - `FormError`：url-encoded 数据格式错误

/// 类型化访问错误
///
/// `get_int` / `get_bool` 会把 `NotFound` 折叠为零值，只有格式错误会返回给调用方；
/// `lookup_int` / `lookup_bool` 则原样返回 `NotFound`。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("参数不存在: {key}")]
    NotFound { key: String },

    #[error("参数 {key} 不是整数: {value:?}")]
    NotAnInteger { key: String, value: String },

    #[error("参数 {key} 不是布尔值: {value:?}")]
    NotABool { key: String, value: String },
}

impl AccessError {
    /// 出错的参数名
    pub fn key(&self) -> &str {
        match self {
            AccessError::NotFound { key }
            | AccessError::NotAnInteger { key, .. }
            | AccessError::NotABool { key, .. } => key,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AccessError::NotFound { .. })
    }
}

/// url-encoded 解析错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("无效的 URL 转义: {0:?}")]
    InvalidEscape(String),

    #[error("不支持分号分隔符: {0:?}")]
    SemicolonSeparator(String),
}
