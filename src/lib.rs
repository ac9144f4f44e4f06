//! reqdata - 统一的请求参数访问
//!
//! 把请求体（url-encoded 表单或 multipart）和 URL 查询串合并成一个有序多值映射，
//! 请求体的值优先。核心类型在 `reqdata-core`，axum 集成在 `reqdata-server`。

pub mod app;

pub use reqdata_core::{
    form, AccessError, FormError, RequestData, ValidationErrors, ValidationResult, Validator,
};
pub use reqdata_server::{parse, Params, ParamsRejection, ParseConfig, ParseError};
