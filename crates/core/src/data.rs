//! 请求参数多值映射
//!
//! `RequestData` 保存从请求体和 URL 查询串中取出的参数。同一个键可能对应
//! 多个值：构造时先追加请求体的值，再追加查询串的值，因此所有只读取第一个值的
//! 方法（`get`、`get_int`、`get_bool`、`get_strings_split`）都以请求体为准。
//! 需要全部值时使用 `values` 或直接访问底层映射。

use std::fmt;

use indexmap::IndexMap;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::error::AccessError;
use crate::validator::Validator;

/// 多值参数映射（键 -> 有序值列表）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestData {
    values: IndexMap<String, Vec<String>>,
}

impl RequestData {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------------
    // 映射操作
    // ------------------------------------------------------------------------

    /// 在键的值列表末尾追加一个值，不会替换已有值
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values
            .entry(key.into())
            .or_default()
            .push(value.into());
    }

    /// 用单个值替换键的全部值
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), vec![value.into()]);
    }

    /// 删除键及其全部值，键不存在时不做任何事
    pub fn del(&mut self, key: &str) {
        self.values.shift_remove(key);
    }

    /// 键是否存在
    ///
    /// 只要记录过该键就算存在，即使值为空字符串或值列表为空。
    pub fn key_exists(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// 键对应的全部值，键不存在时为空切片
    pub fn values(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 编码为 url-encoded 字符串（`bar=baz&foo=quux`），按键排序
    ///
    /// 多值键的每个值各输出一对，保持存储顺序。除字母数字和 `-_.~` 外全部转义，
    /// 空格编码为 `+`。相同内容的映射总是得到相同结果，可用作缓存键或签名输入。
    pub fn encode(&self) -> String {
        let mut entries: Vec<_> = self.values.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let mut pairs = Vec::new();
        for (key, values) in entries {
            let key = escape_query_component(key);
            for value in values {
                pairs.push(format!("{}={}", key, escape_query_component(value)));
            }
        }
        pairs.join("&")
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Vec<String>> {
        self.values.iter()
    }

    pub fn as_map(&self) -> &IndexMap<String, Vec<String>> {
        &self.values
    }

    pub fn as_map_mut(&mut self) -> &mut IndexMap<String, Vec<String>> {
        &mut self.values
    }

    pub fn into_inner(self) -> IndexMap<String, Vec<String>> {
        self.values
    }

    // ------------------------------------------------------------------------
    // 类型化访问（只读取第一个值）
    // ------------------------------------------------------------------------

    fn first(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// 第一个值；键不存在或值列表为空时返回空字符串
    pub fn get(&self, key: &str) -> &str {
        self.first(key).unwrap_or("")
    }

    /// 第一个值按十进制整数解析，缺失时返回 `NotFound`
    pub fn lookup_int(&self, key: &str) -> Result<i64, AccessError> {
        let value = self.first(key).ok_or_else(|| AccessError::NotFound {
            key: key.to_string(),
        })?;
        value.parse::<i64>().map_err(|_| AccessError::NotAnInteger {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    /// 第一个值按十进制整数解析，缺失时返回 0
    ///
    /// 值存在但不是整数时返回 `AccessError::NotAnInteger`。
    pub fn get_int(&self, key: &str) -> Result<i64, AccessError> {
        match self.lookup_int(key) {
            Err(AccessError::NotFound { .. }) => Ok(0),
            other => other,
        }
    }

    /// 第一个值按布尔字面量解析，缺失时返回 `NotFound`
    pub fn lookup_bool(&self, key: &str) -> Result<bool, AccessError> {
        let value = self.first(key).ok_or_else(|| AccessError::NotFound {
            key: key.to_string(),
        })?;
        parse_bool(value).ok_or_else(|| AccessError::NotABool {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    /// 第一个值按布尔字面量解析，缺失时返回 false
    ///
    /// 接受 `1 t T TRUE true True` 与 `0 f F FALSE false False`，
    /// 其他值返回 `AccessError::NotABool`。
    pub fn get_bool(&self, key: &str) -> Result<bool, AccessError> {
        match self.lookup_bool(key) {
            Err(AccessError::NotFound { .. }) => Ok(false),
            other => other,
        }
    }

    /// 按分隔符切分第一个值
    ///
    /// 键不存在或值列表为空时返回 `None`（区别于 `Some(vec![""])`）。
    /// 连续或首尾的分隔符会产生空字符串片段；分隔符为空时按字符切分。
    pub fn get_strings_split(&self, key: &str, delim: &str) -> Option<Vec<String>> {
        let value = self.first(key)?;
        if delim.is_empty() {
            return Some(value.chars().map(String::from).collect());
        }
        Some(value.split(delim).map(str::to_string).collect())
    }

    /// 创建绑定到当前数据的校验器
    ///
    /// 校验器借用而不复制数据；借用期间数据不可修改，所以需要在所有修改完成后再校验。
    pub fn validator(&self) -> Validator<'_> {
        Validator::new(self)
    }
}

/// 查询参数中保持原样的字符之外的全部 ASCII 字符
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn escape_query_component(component: &str) -> String {
    component
        .split(' ')
        .map(|part| utf8_percent_encode(part, QUERY_COMPONENT).to_string())
        .collect::<Vec<_>>()
        .join("+")
}

pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

impl fmt::Display for RequestData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl From<IndexMap<String, Vec<String>>> for RequestData {
    fn from(values: IndexMap<String, Vec<String>>) -> Self {
        Self { values }
    }
}

impl<K, V> FromIterator<(K, V)> for RequestData
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = Self::new();
        data.extend(iter);
        data
    }
}

impl<K, V> Extend<(K, V)> for RequestData
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.add(key, value);
        }
    }
}

impl IntoIterator for RequestData {
    type Item = (String, Vec<String>);
    type IntoIter = indexmap::map::IntoIter<String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a RequestData {
    type Item = (&'a String, &'a Vec<String>);
    type IntoIter = indexmap::map::Iter<'a, String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
