//! 请求参数解析错误

use reqdata_core::FormError;

/// 请求体解析失败
///
/// 只有请求体无法按声明的 Content-Type 解码时才会出现；查询串中的错误片段会被丢弃。
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("multipart 解析失败: {0}")]
    Multipart(#[from] multer::Error),

    #[error("读取请求体失败: {0}")]
    Body(#[source] axum::Error),

    #[error("请求体超过 {limit} 字节限制")]
    BodyTooLarge { limit: usize },

    #[error("multipart 非文件字段超过 {limit} 字节内存限制")]
    MemoryLimit { limit: usize },

    #[error("表单格式错误: {0}")]
    Form(#[from] FormError),
}

impl ParseError {
    /// 是否因为大小限制而失败
    pub fn is_too_large(&self) -> bool {
        matches!(
            self,
            ParseError::BodyTooLarge { .. }
                | ParseError::MemoryLimit { .. }
                | ParseError::Multipart(multer::Error::StreamSizeExceeded { .. })
                | ParseError::Multipart(multer::Error::FieldSizeExceeded { .. })
        )
    }
}
