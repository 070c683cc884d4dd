use std::collections::BTreeMap;
use std::time::Duration;

use tracing::{debug, warn};

use crate::assertion::{AssertionEngine, AssertionResult, ExpectationSet};
use crate::expander::DEFAULT_TIMEOUT;
use crate::http::{Method, Response, Transport};
use crate::spec::{KeyStore, TrustStore};
use crate::value::Value;

/// 请求体，二选一
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Text(String),
}

/// 由槽位推导出的实例状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceState {
    Expanded,
    Executed,
    Evaluated,
}

/// 完全解析后的单个请求，带响应槽位和断言结果槽位
#[derive(Debug, Clone, PartialEq)]
pub struct RequestInstance {
    pub(crate) id: u64,
    pub name: String,
    pub summary: Option<String>,
    pub suite: String,
    pub tags: Vec<String>,
    pub url: String,
    pub method: Method,
    /// 小写名称
    pub headers: BTreeMap<String, String>,
    pub body: Option<RequestBody>,
    pub truststore: Option<TrustStore>,
    pub keystore: Option<KeyStore>,
    /// 为空表示直连
    pub proxy: BTreeMap<String, String>,
    pub timeout: Duration,
    pub expectations: ExpectationSet,
    pub(crate) response: Option<Response>,
    pub(crate) results: Option<Vec<AssertionResult>>,
}

impl Default for RequestInstance {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            summary: None,
            suite: String::new(),
            tags: Vec::new(),
            url: String::new(),
            method: Method::Get,
            headers: BTreeMap::new(),
            body: None,
            truststore: None,
            keystore: None,
            proxy: BTreeMap::new(),
            timeout: DEFAULT_TIMEOUT,
            expectations: ExpectationSet::new(),
            response: None,
            results: None,
        }
    }
}

impl RequestInstance {
    pub fn new(name: impl Into<String>, method: Method, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            url: url.into(),
            ..Self::default()
        }
    }

    /// 加入集合时分配；未加入集合时为 0
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    pub fn results(&self) -> &[AssertionResult] {
        self.results.as_deref().unwrap_or_default()
    }

    pub fn state(&self) -> InstanceState {
        if self.results.is_some() {
            InstanceState::Evaluated
        } else if self.response.is_some() {
            InstanceState::Executed
        } else {
            InstanceState::Expanded
        }
    }

    /// 发送请求并填充响应槽位；传输错误记录为失败响应，不向上传播
    pub async fn execute(&mut self, transport: &impl Transport) {
        debug!("Executing request ({}) {} {}", self.id, self.method, self.url);

        let response = match transport.send(self).await {
            Ok(received) => Response::Received(received),
            Err(e) => {
                let message = error_chain(&e);
                warn!("Request ({}) {} failed: {}", self.id, self.name, message);
                Response::failed(message)
            }
        };

        self.response = Some(response);
    }

    /// 用实例自身的期望对响应求值
    pub fn evaluate(&mut self, engine: &AssertionEngine) -> &[AssertionResult] {
        let results = match &self.response {
            Some(response) => engine.evaluate(&self.expectations, response),
            None => engine.evaluate(
                &self.expectations,
                &Response::failed("request was not executed"),
            ),
        };

        self.results.insert(results)
    }

    pub fn failed_assertions(&self) -> usize {
        self.results().iter().filter(|r| !r.passed).count()
    }

    pub fn passed_assertions(&self) -> usize {
        self.results().iter().filter(|r| r.passed).count()
    }

    pub fn has_transport_error(&self) -> bool {
        matches!(self.response, Some(Response::Failed { .. }))
    }
}

/// 错误及其 source 链拼接为一行
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::{PredicateKind, Rule};
    use crate::http::{HttpResponse, Status, TransportError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedTransport {
        status: Option<u16>,
        calls: AtomicUsize,
    }

    impl Transport for FixedTransport {
        async fn send(&self, _instance: &RequestInstance) -> Result<HttpResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.status {
                Some(code) => Ok(HttpResponse::new(
                    Status::new(code)?,
                    BTreeMap::new(),
                    "ok".to_string(),
                    Duration::from_millis(5),
                )),
                None => Err(TransportError::InvalidStatus(999)),
            }
        }
    }

    fn instance() -> RequestInstance {
        let mut instance = RequestInstance::new("ping", Method::Get, "http://localhost/ping");
        instance.expectations =
            ExpectationSet::new().with("status_code", Rule::new(PredicateKind::Equals, 200i64));
        instance
    }

    #[tokio::test]
    async fn test_lifecycle_states() {
        let transport = FixedTransport {
            status: Some(200),
            calls: AtomicUsize::new(0),
        };
        let mut instance = instance();
        assert_eq!(instance.state(), InstanceState::Expanded);

        instance.execute(&transport).await;
        assert_eq!(instance.state(), InstanceState::Executed);
        assert_eq!(instance.response().and_then(|r| r.status_code()), Some(200));

        let results = instance.evaluate(&AssertionEngine::new());
        assert_eq!(results.len(), 1);
        assert!(results[0].passed);
        assert_eq!(instance.state(), InstanceState::Evaluated);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transport_error_recorded() {
        let transport = FixedTransport {
            status: None,
            calls: AtomicUsize::new(0),
        };
        let mut instance = instance();
        instance.execute(&transport).await;

        assert!(instance.has_transport_error());
        let error = instance.response().and_then(|r| r.error()).unwrap();
        assert!(error.contains("999"));

        instance.evaluate(&AssertionEngine::new());
        assert_eq!(instance.failed_assertions(), 1);
    }

    #[test]
    fn test_evaluate_without_execute() {
        let mut instance = instance();
        let results = instance.evaluate(&AssertionEngine::new());
        assert!(!results[0].passed);
        assert!(instance.response().is_none());
    }
}
