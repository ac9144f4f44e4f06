//! reqdata-core - 请求参数核心库
//!
//! 把请求体和 URL 查询串中的参数合并成一个有序的多值映射，并在其上提供
//! 类型化访问和参数校验。不依赖具体的 HTTP 框架。
//!
//! ## 模块结构
//!
//! - `data` - `RequestData` 多值映射及类型化访问
//! - `form` - 严格的 url-encoded 键值对解析
//! - `validator` - 借用 `RequestData` 的校验器
//! - `error` - 错误类型

pub mod data;
pub mod error;
pub mod form;
pub mod validator;

pub use data::RequestData;
pub use error::{AccessError, FormError};
pub use validator::{ValidationErrors, ValidationResult, Validator};
