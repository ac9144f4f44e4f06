//! axum 提取器
//!
//! `Params` 在 handler 中直接拿到合并后的 `RequestData`：
//!
//! ```ignore
//! async fn search(Params(data): Params) -> String {
//!     data.get("q").to_string()
//! }
//! ```
//!
//! 解析配置从请求扩展中读取（`Extension(ParseConfig)` layer），没有时使用默认值。

use std::ops::{Deref, DerefMut};

use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reqdata_core::RequestData;
use tracing::warn;

use crate::config::ParseConfig;
use crate::error::ParseError;
use crate::parse::parse;

/// 合并了请求体和查询串的请求参数
#[derive(Debug, Clone, Default)]
pub struct Params(pub RequestData);

impl Params {
    pub fn into_inner(self) -> RequestData {
        self.0
    }
}

impl Deref for Params {
    type Target = RequestData;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Params {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[axum::async_trait]
impl<S> FromRequest<S> for Params
where
    S: Send + Sync,
{
    type Rejection = ParamsRejection;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let config = req
            .extensions()
            .get::<ParseConfig>()
            .cloned()
            .unwrap_or_default();
        let data = parse(req, &config).await?;
        Ok(Params(data))
    }
}

/// 参数解析失败时的拒绝响应
///
/// 大小超限返回 413，其余返回 400。
#[derive(Debug)]
pub struct ParamsRejection(ParseError);

impl ParamsRejection {
    pub fn error(&self) -> &ParseError {
        &self.0
    }

    pub fn status(&self) -> StatusCode {
        if self.0.is_too_large() {
            StatusCode::PAYLOAD_TOO_LARGE
        } else {
            StatusCode::BAD_REQUEST
        }
    }
}

impl From<ParseError> for ParamsRejection {
    fn from(error: ParseError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ParamsRejection {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!(status = %status, error = %self.0, "拒绝请求参数");
        (status, self.0.to_string()).into_response()
    }
}
