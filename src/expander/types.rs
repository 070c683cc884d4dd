use std::collections::BTreeMap;
use std::time::Duration;

use thiserror::Error;

use crate::collection::RequestBody;
use crate::http::types::Method;
use crate::spec::{KeyStore, TrustStore};

/// 展开阶段的致命错误，任何一个都会中止整个展开
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("No URL provided for request '{request}'")]
    NoUrlSource { request: String },

    #[error("Token not found for provider: {provider}")]
    MissingToken { provider: String },

    #[error("Invalid URL '{url}' in request '{request}': {reason}")]
    InvalidUrl {
        request: String,
        url: String,
        reason: String,
    },

    #[error("Invalid HTTP method '{method}' in request '{request}'")]
    InvalidMethod { request: String, method: String },

    #[error("URL template placeholder '{{{placeholder}}}' has no value in request '{request}'")]
    UnboundPlaceholder {
        request: String,
        placeholder: String,
    },
}

/// 默认值与单个请求覆盖合并后的结果（URL 除外）
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSpec {
    pub method: Method,
    /// header 名称为小写
    pub headers: BTreeMap<String, String>,
    pub body: Option<RequestBody>,
    pub timeout: Duration,
    pub truststore: Option<TrustStore>,
    pub keystore: Option<KeyStore>,
    pub proxy: BTreeMap<String, String>,
}
