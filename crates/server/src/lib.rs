//! reqdata-server - 基于 axum 的请求参数解析
//!
//! 把 HTTP 请求的请求体字段和 URL 查询参数合并为 `RequestData`。
//!
//! ## 模块结构
//!
//! - `parse` - 按 Content-Type 读取请求体，再追加查询参数
//! - `extract` - axum 提取器 `Params`
//! - `config` - 请求体大小与 multipart 内存限制
//! - `error` - 解析错误

pub mod config;
pub mod error;
pub mod extract;
pub mod parse;

pub use config::ParseConfig;
pub use error::ParseError;
pub use extract::{Params, ParamsRejection};
pub use parse::parse;
