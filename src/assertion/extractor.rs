use std::fmt;

use crate::assertion::types::AssertError;
use crate::http::Response;
use crate::value::Value;

/// 响应属性的根
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyRoot {
    StatusCode,
    Headers,
    Body,
    Error,
    /// 响应耗时（毫秒）
    ElapsedMs,
}

/// 属性路径，例如 `status_code`、`headers.content-type`、`body.items.0.id`
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyPath {
    pub root: PropertyRoot,
    pub segments: Vec<String>,
}

impl PropertyPath {
    pub fn parse(input: &str) -> Result<Self, AssertError> {
        let input = input.trim();
        let mut parts = input.split('.');
        let root = match parts.next().unwrap_or_default() {
            "status_code" | "status" => PropertyRoot::StatusCode,
            "headers" => PropertyRoot::Headers,
            "body" => PropertyRoot::Body,
            "error" => PropertyRoot::Error,
            "elapsed_ms" | "elapsed" => PropertyRoot::ElapsedMs,
            _ => {
                return Err(AssertError::InvalidProperty(format!(
                    "{}. Must start with 'status_code', 'headers', 'body', 'error' or 'elapsed_ms'",
                    input
                )));
            }
        };

        let segments: Vec<String> = parts.map(|s| s.to_string()).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(AssertError::InvalidProperty(format!(
                "{}. Path segments cannot be empty",
                input
            )));
        }

        Ok(Self { root, segments })
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = match self.root {
            PropertyRoot::StatusCode => "status_code",
            PropertyRoot::Headers => "headers",
            PropertyRoot::Body => "body",
            PropertyRoot::Error => "error",
            PropertyRoot::ElapsedMs => "elapsed_ms",
        };
        write!(f, "{}", root)?;
        for segment in &self.segments {
            write!(f, ".{}", segment)?;
        }
        Ok(())
    }
}

/// 从响应中提取属性值
///
/// 当前响应上不存在的根（例如失败响应的 body）以及缺失的子路径都返回 `Null`，
/// 这样 `exists` / `not_exists` 可以直接判断。
pub fn extract_value(response: &Response, path: &PropertyPath) -> Value {
    let root = root_value(response, path.root);

    let mut current = &root;
    for (depth, segment) in path.segments.iter().enumerate() {
        // header 名称不区分大小写
        let next = if path.root == PropertyRoot::Headers && depth == 0 {
            current.get(&segment.to_ascii_lowercase())
        } else {
            current.get(segment)
        };
        match next {
            Some(value) => current = value,
            None => return Value::Null,
        }
    }

    current.clone()
}

/// 解析属性名并提取值
pub fn extract_property(response: &Response, property: &str) -> Result<Value, AssertError> {
    let path = PropertyPath::parse(property)?;
    Ok(extract_value(response, &path))
}

fn root_value(response: &Response, root: PropertyRoot) -> Value {
    match (response, root) {
        (Response::Received(r), PropertyRoot::StatusCode) => {
            Value::Number(f64::from(r.status.code()))
        }
        (Response::Received(r), PropertyRoot::Headers) => Value::Map(
            r.headers
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        ),
        (Response::Received(r), PropertyRoot::Body) => r.body.clone(),
        (Response::Received(r), PropertyRoot::ElapsedMs) => {
            Value::Number(r.duration.as_millis() as f64)
        }
        (Response::Failed { error }, PropertyRoot::Error) => Value::String(error.clone()),
        _ => Value::Null,
    }
}
