use std::collections::BTreeMap;
use std::time::Duration;

use crate::collection::RequestBody;
use crate::expander::types::{ConfigError, ResolvedSpec};
use crate::http::types::Method;
use crate::spec::{RequestDefaults, RequestItem};
use crate::value::Value;

/// 未声明超时时的默认值
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// 按字段合并：覆盖值 → 默认值 → 兜底值
pub fn merge(
    defaults: &RequestDefaults,
    item: &RequestItem,
    request: &str,
) -> Result<ResolvedSpec, ConfigError> {
    let invoke = &item.invoke;

    let method = match invoke.method.as_deref().or(defaults.method.as_deref()) {
        Some(name) => name.parse::<Method>().map_err(|e| ConfigError::InvalidMethod {
            request: request.to_string(),
            method: e.0,
        })?,
        None => Method::Get,
    };

    let timeout = [item.timeout, invoke.timeout, defaults.timeout]
        .into_iter()
        .flatten()
        .find(|secs| secs.is_finite() && *secs > 0.0)
        .map(Duration::from_secs_f64)
        .unwrap_or(DEFAULT_TIMEOUT);

    Ok(ResolvedSpec {
        method,
        headers: merge_headers(&defaults.headers, &invoke.headers),
        body: invoke
            .payload
            .as_ref()
            .or(defaults.payload.as_ref())
            .and_then(resolve_body),
        timeout,
        truststore: invoke.truststore.clone().or_else(|| defaults.truststore.clone()),
        keystore: invoke.keystore.clone().or_else(|| defaults.keystore.clone()),
        proxy: invoke
            .proxy
            .clone()
            .or_else(|| defaults.proxy.clone())
            .unwrap_or_default(),
    })
}

/// header 名称不区分大小写合并，结果统一为小写，覆盖值优先
pub fn merge_headers(
    defaults: &BTreeMap<String, Value>,
    overrides: &BTreeMap<String, Value>,
) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    for (name, value) in defaults.iter().chain(overrides.iter()) {
        if value.is_null() {
            continue;
        }
        headers.insert(name.to_ascii_lowercase(), value.to_text());
    }
    headers
}

/// 请求体：结构化值或可解析为 JSON 的字符串为 Json，其余为文本
pub fn resolve_body(payload: &Value) -> Option<RequestBody> {
    match payload {
        Value::Null => None,
        Value::List(_) | Value::Map(_) => Some(RequestBody::Json(payload.clone())),
        Value::String(text) => match serde_json::from_str::<serde_json::Value>(text) {
            Ok(json) => Some(RequestBody::Json(Value::from(json))),
            Err(_) => Some(RequestBody::Text(text.clone())),
        },
        scalar => Some(RequestBody::Text(scalar.to_text())),
    }
}
