//! reqdata-echo 应用
//!
//! 演示服务：解析请求参数并原样返回。

pub mod config;
pub mod routes;

pub use config::AppConfig;
pub use routes::router;
