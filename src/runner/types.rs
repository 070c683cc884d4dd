use std::time::Duration;

use crate::collection::{Collection, RequestInstance};
use crate::http::Response;

/// 断言失败的请求
#[derive(Debug, Clone, PartialEq)]
pub struct FailedRequest {
    pub id: u64,
    pub name: String,
    pub url: String,
    pub failed_assertions: usize,
}

/// 传输失败的请求
#[derive(Debug, Clone, PartialEq)]
pub struct TransportFailure {
    pub id: u64,
    pub name: String,
    pub error: String,
}

/// 运行摘要
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub total_requests: usize,
    pub total_assertions: usize,
    pub passed_assertions: usize,
    pub failed_assertions: usize,
    pub failed_requests: Vec<FailedRequest>,
    pub transport_errors: Vec<TransportFailure>,
    pub total_duration: Duration,
}

impl RunSummary {
    /// 汇总所选实例，按 id 升序
    pub fn from_collection(collection: &Collection, ids: &[u64]) -> Self {
        let mut summary = Self::default();
        for instance in ids.iter().filter_map(|id| collection.get(*id)) {
            summary.record(instance);
        }
        summary
    }

    fn record(&mut self, instance: &RequestInstance) {
        self.total_requests += 1;
        self.total_assertions += instance.results().len();
        self.passed_assertions += instance.passed_assertions();

        let failed = instance.failed_assertions();
        self.failed_assertions += failed;
        if failed > 0 {
            self.failed_requests.push(FailedRequest {
                id: instance.id(),
                name: instance.name.clone(),
                url: instance.url.clone(),
                failed_assertions: failed,
            });
        }

        match instance.response() {
            Some(Response::Failed { error }) => self.transport_errors.push(TransportFailure {
                id: instance.id(),
                name: instance.name.clone(),
                error: error.clone(),
            }),
            Some(Response::Received(received)) => self.total_duration += received.duration,
            None => {}
        }
    }

    /// 没有失败断言，也没有传输错误
    pub fn is_success(&self) -> bool {
        self.failed_assertions == 0 && self.transport_errors.is_empty()
    }
}
