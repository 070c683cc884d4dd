use std::collections::BTreeMap;
use std::time::Duration;

use crate::http::types::Status;
use crate::value::Value;

/// 成功收到的 HTTP 响应
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: Status,
    /// header 名称统一为小写，多值以 ", " 连接
    pub headers: BTreeMap<String, String>,
    /// 声明为 JSON 且能解析时为结构化值，否则为文本
    pub body: Value,
    pub duration: Duration,
}

impl HttpResponse {
    pub fn new(
        status: Status,
        headers: BTreeMap<String, String>,
        body: String,
        duration: Duration,
    ) -> Self {
        let body = Self::decode_body(&headers, body);
        Self {
            status,
            headers,
            body,
            duration,
        }
    }

    fn decode_body(headers: &BTreeMap<String, String>, body: String) -> Value {
        let is_json = headers
            .get("content-type")
            .map(|ct| ct.to_ascii_lowercase().contains("json"))
            .unwrap_or(false);

        if is_json {
            match serde_json::from_str::<serde_json::Value>(&body) {
                Ok(json) => return Value::from(json),
                Err(e) => tracing::debug!("Response declared JSON but failed to parse: {}", e),
            }
        }
        Value::String(body)
    }
}

/// 请求实例的响应槽位：成功字段与错误互斥
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Received(HttpResponse),
    Failed { error: String },
}

impl Response {
    pub fn failed(error: impl Into<String>) -> Self {
        Response::Failed {
            error: error.into(),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Response::Received(r) => Some(r.status.code()),
            Response::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Response::Received(_) => None,
            Response::Failed { error } => Some(error),
        }
    }
}
