//! 参数校验
//!
//! `Validator` 借用一个 `RequestData`，按调用顺序执行校验规则并收集结果。
//! 每条规则返回对应的 `ValidationResult`，可以用 `message` 覆盖默认错误信息：
//!
//! ```
//! use reqdata_core::RequestData;
//!
//! let mut data = RequestData::new();
//! data.set("age", "abc");
//!
//! let mut v = data.validator();
//! v.require("name").message("请填写姓名");
//! v.type_int("age");
//! assert!(v.has_errors());
//! assert_eq!(v.fields(), vec!["name", "age"]);
//! ```

use std::fmt;

use indexmap::IndexMap;
use regex::Regex;

use crate::data::{parse_bool, RequestData};

/// 单条校验规则的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    field: String,
    message: String,
    ok: bool,
}

impl ValidationResult {
    fn new(field: &str, ok: bool, message: String) -> Self {
        Self {
            field: field.to_string(),
            message,
            ok,
        }
    }

    /// 覆盖默认错误信息
    pub fn message(&mut self, message: impl Into<String>) -> &mut Self {
        self.message = message.into();
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn error_message(&self) -> &str {
        &self.message
    }

    pub fn is_ok(&self) -> bool {
        self.ok
    }
}

/// 绑定到 `RequestData` 的校验器
pub struct Validator<'a> {
    data: &'a RequestData,
    results: Vec<ValidationResult>,
}

impl<'a> Validator<'a> {
    pub fn new(data: &'a RequestData) -> Self {
        Self {
            data,
            results: Vec::new(),
        }
    }

    /// 被校验的数据
    pub fn data(&self) -> &'a RequestData {
        self.data
    }

    fn push(&mut self, result: ValidationResult) -> &mut ValidationResult {
        let index = self.results.len();
        self.results.push(result);
        &mut self.results[index]
    }

    fn first(&self, field: &str) -> Option<&'a str> {
        self.data.values(field).first().map(String::as_str)
    }

    // ------------------------------------------------------------------------
    // 规则
    // ------------------------------------------------------------------------

    /// 字段存在且第一个值非空
    pub fn require(&mut self, field: &str) -> &mut ValidationResult {
        let ok = self.first(field).is_some_and(|value| !value.is_empty());
        self.push(ValidationResult::new(field, ok, format!("{} 为必填项", field)))
    }

    /// 第一个值至少 `min` 个字符；字段缺失时跳过
    pub fn min_length(&mut self, field: &str, min: usize) -> &mut ValidationResult {
        let ok = self
            .first(field)
            .map_or(true, |value| value.chars().count() >= min);
        self.push(ValidationResult::new(
            field,
            ok,
            format!("{} 长度至少为 {} 个字符", field, min),
        ))
    }

    /// 第一个值至多 `max` 个字符；字段缺失时跳过
    pub fn max_length(&mut self, field: &str, max: usize) -> &mut ValidationResult {
        let ok = self
            .first(field)
            .map_or(true, |value| value.chars().count() <= max);
        self.push(ValidationResult::new(
            field,
            ok,
            format!("{} 长度不能超过 {} 个字符", field, max),
        ))
    }

    /// 第一个值可被 `RequestData::get_int` 解析；字段缺失时跳过
    pub fn type_int(&mut self, field: &str) -> &mut ValidationResult {
        let ok = self
            .first(field)
            .map_or(true, |value| value.parse::<i64>().is_ok());
        self.push(ValidationResult::new(
            field,
            ok,
            format!("{} 必须是整数", field),
        ))
    }

    /// 第一个值可被 `RequestData::get_bool` 解析；字段缺失时跳过
    pub fn type_bool(&mut self, field: &str) -> &mut ValidationResult {
        let ok = self
            .first(field)
            .map_or(true, |value| parse_bool(value).is_some());
        self.push(ValidationResult::new(
            field,
            ok,
            format!("{} 必须是布尔值", field),
        ))
    }

    /// 第一个值匹配正则；字段缺失时跳过
    pub fn matches(&mut self, field: &str, pattern: &Regex) -> &mut ValidationResult {
        let ok = self.first(field).map_or(true, |value| pattern.is_match(value));
        self.push(ValidationResult::new(
            field,
            ok,
            format!("{} 格式不正确", field),
        ))
    }

    // ------------------------------------------------------------------------
    // 结果
    // ------------------------------------------------------------------------

    fn failures(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results.iter().filter(|result| !result.ok)
    }

    pub fn has_errors(&self) -> bool {
        self.failures().next().is_some()
    }

    /// 全部错误信息，按规则执行顺序
    pub fn messages(&self) -> Vec<&str> {
        self.failures().map(|result| result.message.as_str()).collect()
    }

    /// 校验失败的字段（去重，按首次失败顺序）
    pub fn fields(&self) -> Vec<&str> {
        self.error_map().keys().copied().collect()
    }

    /// 字段 -> 错误信息列表
    pub fn error_map(&self) -> IndexMap<&str, Vec<&str>> {
        let mut map: IndexMap<&str, Vec<&str>> = IndexMap::new();
        for result in self.failures() {
            map.entry(result.field.as_str())
                .or_default()
                .push(result.message.as_str());
        }
        map
    }

    /// 没有错误时返回 `Ok(())`
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        let errors: IndexMap<String, Vec<String>> = self
            .error_map()
            .into_iter()
            .map(|(field, messages)| {
                (
                    field.to_string(),
                    messages.into_iter().map(str::to_string).collect(),
                )
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors { errors })
        }
    }
}

/// 校验失败汇总
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: IndexMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn as_map(&self) -> &IndexMap<String, Vec<String>> {
        &self.errors
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.fields().collect();
        write!(f, "参数校验失败: {}", fields.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}
