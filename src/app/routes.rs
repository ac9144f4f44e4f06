//! 路由
//!
//! `/echo` 接受任意方法，返回合并后的参数和规范编码。
//! 查询或表单中的 `_require=a,b` 会要求这些字段必填，缺失时返回 422。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Extension, Json, Router};
use reqdata_server::{Params, ParseConfig};
use serde_json::json;
use tracing::debug;

/// 必填字段列表的参数名
pub const REQUIRE_KEY: &str = "_require";

pub fn router(parse_config: ParseConfig) -> Router {
    Router::new()
        .route("/echo", any(echo))
        .layer(Extension(parse_config))
}

async fn echo(Params(data): Params) -> Response {
    let required = data
        .get_strings_split(REQUIRE_KEY, ",")
        .unwrap_or_default();

    let mut validator = data.validator();
    for field in required.iter().map(|f| f.trim()).filter(|f| !f.is_empty()) {
        validator.require(field);
    }
    if validator.has_errors() {
        debug!(fields = ?validator.fields(), "必填字段缺失");
        let body = json!({ "errors": validator.error_map() });
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
    }

    Json(json!({
        "encoded": data.encode(),
        "params": data,
    }))
    .into_response()
}
