//! 从 HTTP 请求构造 `RequestData`
//!
//! 先按 Content-Type 读取请求体字段（multipart 或 url-encoded 表单），
//! 再追加 URL 查询参数。请求体的值排在前面，因此对同名参数具有优先级。

use axum::body::Body;
use axum::extract::Request;
use axum::http::{header::CONTENT_TYPE, Method};
use bytes::{Bytes, BytesMut};
use http_body_util::LengthLimitError;
use reqdata_core::{form, RequestData};
use tracing::{debug, trace, warn};

use crate::config::ParseConfig;
use crate::error::ParseError;

/// 请求体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Multipart,
    Form,
    None,
}

impl BodyKind {
    fn detect(content_type: &str) -> Self {
        let content_type = content_type.to_ascii_lowercase();
        if content_type.contains("multipart/form-data") {
            BodyKind::Multipart
        } else if content_type.contains("form-urlencoded") {
            BodyKind::Form
        } else {
            BodyKind::None
        }
    }
}

/// 解析请求体和查询参数
///
/// 请求被整体消费，之后无法再读取原始请求体。请求体解码失败时返回 `ParseError`；
/// 查询串中格式错误的参数会被丢弃，不会导致失败。
pub async fn parse(request: Request, config: &ParseConfig) -> Result<RequestData, ParseError> {
    let (parts, body) = request.into_parts();
    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    let mut data = RequestData::new();

    let result = match BodyKind::detect(content_type) {
        BodyKind::Multipart => read_multipart(content_type, body, config, &mut data).await,
        BodyKind::Form if has_form_body(&parts.method) => read_form(body, config, &mut data).await,
        kind => {
            trace!(method = %parts.method, ?kind, "请求体不包含参数");
            Ok(())
        }
    };
    if let Err(e) = result {
        warn!(content_type = %content_type, error = %e, "解析请求体失败");
        return Err(e);
    }

    if let Some(query) = parts.uri.query() {
        append_query(query, &mut data);
    }

    debug!(keys = data.len(), "请求参数解析完成");
    Ok(data)
}

/// 只有这些方法的 url-encoded 请求体会被当作表单读取
fn has_form_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

async fn read_multipart(
    content_type: &str,
    body: Body,
    config: &ParseConfig,
    data: &mut RequestData,
) -> Result<(), ParseError> {
    let boundary = multer::parse_boundary(content_type)?;
    let constraints = multer::Constraints::new()
        .size_limit(multer::SizeLimit::new().whole_stream(config.max_body_size as u64));
    let mut multipart =
        multer::Multipart::with_constraints(body.into_data_stream(), boundary, constraints);

    let mut remaining = config.multipart_max_memory;
    while let Some(mut field) = multipart.next_field().await? {
        let name = match field.name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                trace!("跳过无名称的 multipart 字段");
                continue;
            }
        };
        if field.file_name().is_some() {
            trace!(field = %name, "跳过文件字段");
            continue;
        }

        let mut value = BytesMut::new();
        while let Some(chunk) = field.chunk().await? {
            if chunk.len() > remaining {
                return Err(ParseError::MemoryLimit {
                    limit: config.multipart_max_memory,
                });
            }
            remaining -= chunk.len();
            value.extend_from_slice(&chunk);
        }
        data.add(name, String::from_utf8_lossy(&value).into_owned());
    }
    Ok(())
}

async fn read_form(
    body: Body,
    config: &ParseConfig,
    data: &mut RequestData,
) -> Result<(), ParseError> {
    let bytes = read_body(body, config.max_body_size).await?;
    let text = String::from_utf8_lossy(&bytes);
    for pair in form::parse_pairs(&text) {
        let (key, value) = pair?;
        data.add(key, value);
    }
    Ok(())
}

/// 读取完整请求体，超过 `limit` 字节返回 `BodyTooLarge`
async fn read_body(body: Body, limit: usize) -> Result<Bytes, ParseError> {
    axum::body::to_bytes(body, limit).await.map_err(|e| {
        let inner = e.into_inner();
        if inner.downcast_ref::<LengthLimitError>().is_some() {
            ParseError::BodyTooLarge { limit }
        } else {
            ParseError::Body(axum::Error::new(inner))
        }
    })
}

fn append_query(query: &str, data: &mut RequestData) {
    for pair in form::parse_pairs(query) {
        match pair {
            Ok((key, value)) => data.add(key, value),
            Err(e) => debug!(error = %e, "丢弃格式错误的查询参数"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http;
    use proptest::prelude::*;

    const BOUNDARY: &str = "X-REQDATA-BOUNDARY";

    fn form_request(method: Method, uri: &str, body: &str) -> Request {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_body(fields: &[(&str, Option<&str>, &str)]) -> String {
        let mut body = String::new();
        for (name, file_name, value) in fields {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            match file_name {
                Some(file_name) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: text/plain\r\n\r\n",
                    name, file_name
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    name
                )),
            }
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));
        body
    }

    fn multipart_request(uri: &str, body: String) -> Request {
        http::Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_form_body_before_query() {
        let req = form_request(Method::POST, "/submit?a=3&c=4", "a=1&b=2");
        let data = parse(req, &ParseConfig::default()).await.unwrap();

        assert_eq!(data.get("a"), "1");
        assert_eq!(data.get("b"), "2");
        assert_eq!(data.get("c"), "4");
        assert_eq!(data.values("a"), ["1", "3"]);
    }

    #[tokio::test]
    async fn test_query_multi_value_order() {
        let req = http::Request::builder()
            .uri("/search?tag=b&tag=a&q=rust+lang")
            .body(Body::empty())
            .unwrap();
        let data = parse(req, &ParseConfig::default()).await.unwrap();

        assert_eq!(data.values("tag"), ["b", "a"]);
        assert_eq!(data.get("q"), "rust lang");
    }

    #[tokio::test]
    async fn test_form_content_type_with_charset() {
        let req = http::Request::builder()
            .method(Method::PUT)
            .uri("/")
            .header(
                CONTENT_TYPE,
                "application/x-www-form-urlencoded; charset=UTF-8",
            )
            .body(Body::from("name=%E4%BD%A0%E5%A5%BD"))
            .unwrap();
        let data = parse(req, &ParseConfig::default()).await.unwrap();
        assert_eq!(data.get("name"), "你好");
    }

    #[tokio::test]
    async fn test_get_form_body_ignored() {
        let req = form_request(Method::GET, "/?b=2", "a=1");
        let data = parse(req, &ParseConfig::default()).await.unwrap();
        assert!(!data.key_exists("a"));
        assert_eq!(data.get("b"), "2");
    }

    #[tokio::test]
    async fn test_unknown_content_type_ignores_body() {
        let req = http::Request::builder()
            .method(Method::POST)
            .uri("/?x=1")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"a":1}"#))
            .unwrap();
        let data = parse(req, &ParseConfig::default()).await.unwrap();
        assert_eq!(data.keys().collect::<Vec<_>>(), vec!["x"]);
    }

    #[tokio::test]
    async fn test_malformed_form_body_fails() {
        let req = form_request(Method::POST, "/", "a=%zz");
        let err = parse(req, &ParseConfig::default()).await.unwrap_err();
        assert!(matches!(err, ParseError::Form(_)));
        assert!(!err.is_too_large());
    }

    #[tokio::test]
    async fn test_malformed_query_pair_dropped() {
        let req = form_request(Method::POST, "/?bad=%zz&good=1", "a=1");
        let data = parse(req, &ParseConfig::default()).await.unwrap();
        assert!(!data.key_exists("bad"));
        assert_eq!(data.get("good"), "1");
    }

    #[tokio::test]
    async fn test_form_body_at_limit() {
        let config = ParseConfig {
            max_body_size: 3,
            ..ParseConfig::default()
        };
        let req = form_request(Method::POST, "/", "a=1");
        let data = parse(req, &config).await.unwrap();
        assert_eq!(data.get("a"), "1");
    }

    #[tokio::test]
    async fn test_form_body_stream_error() {
        let chunks: Vec<Result<&'static str, std::io::Error>> = vec![
            Ok("a=1"),
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "断开")),
        ];
        let req = http::Request::builder()
            .method(Method::POST)
            .uri("/")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from_stream(futures::stream::iter(chunks)))
            .unwrap();
        let err = parse(req, &ParseConfig::default()).await.unwrap_err();
        assert!(matches!(err, ParseError::Body(_)));
        assert!(!err.is_too_large());
    }

    #[tokio::test]
    async fn test_form_body_too_large() {
        let config = ParseConfig {
            max_body_size: 8,
            ..ParseConfig::default()
        };
        let req = form_request(Method::POST, "/", "a=0123456789");
        let err = parse(req, &config).await.unwrap_err();
        assert!(matches!(err, ParseError::BodyTooLarge { limit: 8 }));
        assert!(err.is_too_large());
    }

    #[tokio::test]
    async fn test_multipart_fields_before_query() {
        let body = multipart_body(&[
            ("a", None, "1"),
            ("b", None, "2"),
            ("a", None, "5"),
            ("upload", Some("notes.txt"), "file contents"),
        ]);
        let req = multipart_request("/?a=3&c=4", body);
        let data = parse(req, &ParseConfig::default()).await.unwrap();

        assert_eq!(data.values("a"), ["1", "5", "3"]);
        assert_eq!(data.get("b"), "2");
        assert_eq!(data.get("c"), "4");
        assert!(!data.key_exists("upload"));
    }

    #[tokio::test]
    async fn test_multipart_memory_limit() {
        let config = ParseConfig {
            multipart_max_memory: 4,
            ..ParseConfig::default()
        };
        let body = multipart_body(&[("a", None, "12"), ("b", None, "345")]);
        let err = parse(multipart_request("/", body), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, ParseError::MemoryLimit { limit: 4 }));
        assert!(err.is_too_large());
    }

    #[tokio::test]
    async fn test_multipart_files_do_not_count_toward_memory() {
        let config = ParseConfig {
            multipart_max_memory: 4,
            ..ParseConfig::default()
        };
        let body = multipart_body(&[("doc", Some("big.bin"), "0123456789"), ("a", None, "1")]);
        let data = parse(multipart_request("/", body), &config).await.unwrap();
        assert_eq!(data.get("a"), "1");
    }

    #[tokio::test]
    async fn test_multipart_missing_boundary() {
        let req = http::Request::builder()
            .method(Method::POST)
            .uri("/")
            .header(CONTENT_TYPE, "multipart/form-data")
            .body(Body::from("irrelevant"))
            .unwrap();
        let err = parse(req, &ParseConfig::default()).await.unwrap_err();
        assert!(matches!(err, ParseError::Multipart(_)));
    }

    #[tokio::test]
    async fn test_multipart_truncated_stream() {
        let body = format!(
            "--{}\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\n1",
            BOUNDARY
        );
        let err = parse(multipart_request("/", body), &ParseConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ParseError::Multipart(_)));
    }

    #[test]
    fn test_body_kind_detect() {
        assert_eq!(
            BodyKind::detect("multipart/form-data; boundary=x"),
            BodyKind::Multipart
        );
        assert_eq!(
            BodyKind::detect("Application/X-WWW-Form-Urlencoded"),
            BodyKind::Form
        );
        assert_eq!(BodyKind::detect("text/plain"), BodyKind::None);
        assert_eq!(BodyKind::detect(""), BodyKind::None);
    }

    fn encode_pairs(pairs: &[(String, String)]) -> String {
        pairs.iter().cloned().collect::<RequestData>().encode()
    }

    proptest! {
        #[test]
        fn prop_body_takes_precedence(
            body in proptest::collection::vec(("[a-d]", "[a-z0-9 ]{0,6}"), 1..6),
            query in proptest::collection::vec(("[a-d]", "[a-z0-9 ]{0,6}"), 0..6),
        ) {
            let uri = format!("/?{}", encode_pairs(&query));
            let req = form_request(Method::POST, &uri, &encode_pairs(&body));
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let data = runtime.block_on(parse(req, &ParseConfig::default())).unwrap();

            let body_data: RequestData = body.iter().cloned().collect();
            for (key, _) in &body {
                prop_assert_eq!(data.get(key), body_data.get(key));
                let body_values = body_data.values(key);
                prop_assert_eq!(&data.values(key)[..body_values.len()], body_values);
            }
        }
    }
}
