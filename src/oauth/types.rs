use std::collections::HashMap;
use std::future::Future;

use thiserror::Error;

use crate::spec::OAuth2Provider;

/// token 获取错误
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("token 请求失败 {token_url}: {source}")]
    Request {
        token_url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("token 端点 {token_url} 返回状态 {status}: {body}")]
    Status {
        token_url: String,
        status: u16,
        body: String,
    },

    #[error("token 端点 {token_url} 的响应中没有 access_token")]
    MissingAccessToken { token_url: String },
}

/// 从提供方获取访问 token 的能力
pub trait TokenSource {
    fn fetch_token(
        &self,
        provider: &OAuth2Provider,
    ) -> impl Future<Output = Result<String, TokenError>> + Send;
}

/// 展开阶段按名称查询已获取的 token
pub trait TokenProvider {
    fn token(&self, provider: &str) -> Option<&str>;
}

impl TokenProvider for HashMap<String, String> {
    fn token(&self, provider: &str) -> Option<&str> {
        self.get(provider).map(|s| s.as_str())
    }
}
