use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info, warn};

use crate::oauth::types::{TokenProvider, TokenSource};
use crate::spec::OAuth2Provider;

/// 本次运行已获取的 token，按提供方名称索引
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    tokens: HashMap<String, String>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, provider: impl Into<String>, token: impl Into<String>) {
        self.tokens.insert(provider.into(), token.into());
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// 对每个启用的提供方获取一次 token；失败的提供方只记录日志，不进入存储
    pub async fn acquire(
        providers: &BTreeMap<String, OAuth2Provider>,
        source: &impl TokenSource,
    ) -> Self {
        let mut store = Self::new();

        for (name, provider) in providers {
            if !provider.enabled {
                debug!("Skipping disabled token provider {}", name);
                continue;
            }

            match source.fetch_token(provider).await {
                Ok(token) => {
                    info!("Acquired token for provider {}", name);
                    store.insert(name.clone(), token);
                }
                Err(e) => warn!("Failed to acquire token for provider {}: {}", name, e),
            }
        }

        store
    }
}

impl TokenProvider for TokenStore {
    fn token(&self, provider: &str) -> Option<&str> {
        self.tokens.get(provider).map(|s| s.as_str())
    }
}
