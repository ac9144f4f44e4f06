//! url-encoded 键值对解析
//!
//! 按 `&` 切分片段，逐段校验百分号转义后交给 `url::form_urlencoded` 解码。
//! 与宽松解析不同，格式错误的片段会以 `FormError` 报告，由调用方决定
//! 是整体失败（请求体）还是静默丢弃（查询串）。

use url::form_urlencoded;

use crate::error::FormError;

/// 解析 url-encoded 字符串，按原始顺序逐对产出
///
/// 空片段（例如 `a=1&&b=2` 中间的部分）被跳过，不产生结果。
pub fn parse_pairs(input: &str) -> impl Iterator<Item = Result<(String, String), FormError>> + '_ {
    input
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(parse_segment)
}

fn parse_segment(segment: &str) -> Result<(String, String), FormError> {
    if segment.contains(';') {
        return Err(FormError::SemicolonSeparator(segment.to_string()));
    }
    check_escapes(segment)?;

    // 片段内不含 '&'，parse 恰好产出一对
    let pair = form_urlencoded::parse(segment.as_bytes())
        .next()
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .unwrap_or_default();
    Ok(pair)
}

fn check_escapes(segment: &str) -> Result<(), FormError> {
    let bytes = segment.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .map(|hex| hex.iter().all(u8::is_ascii_hexdigit))
                .unwrap_or(false);
            if !valid {
                return Err(FormError::InvalidEscape(segment.to_string()));
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}
