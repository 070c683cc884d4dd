use std::collections::BTreeMap;
use std::sync::OnceLock;

use rand::Rng;
use rand::distr::Alphanumeric;
use regex::Regex;
use tracing::{debug, error, info};
use url::Url;

use crate::collection::{Collection, RequestInstance};
use crate::expander::merge::merge;
use crate::expander::source::UrlSource;
use crate::expander::types::ConfigError;
use crate::oauth::TokenProvider;
use crate::spec::{Document, RequestItem};

fn bearer_regex() -> &'static Regex {
    static BEARER: OnceLock<Regex> = OnceLock::new();
    BEARER.get_or_init(|| Regex::new(r"^Bearer \{\{(\w+)\}\}$").expect("bearer pattern is valid"))
}

/// 把文档展开为请求实例集合
///
/// 展开是原子的：任何 [`ConfigError`] 都会中止，不返回部分集合。
pub struct SpecExpander<'a> {
    document: &'a Document,
}

impl<'a> SpecExpander<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    pub fn expand(&self, tokens: &impl TokenProvider) -> Result<Collection, ConfigError> {
        info!("Loading requests list...");
        let mut collection = Collection::new();

        for item in &self.document.requests {
            for instance in self.expand_item(item, tokens)? {
                collection.append(instance);
            }
        }

        info!(
            "Expanded {} request(s) into {} instance(s)",
            self.document.requests.len(),
            collection.len()
        );
        debug!("Unique tags in all requests: {:?}", collection.tags().collect::<Vec<_>>());
        Ok(collection)
    }

    fn expand_item(
        &self,
        item: &RequestItem,
        tokens: &impl TokenProvider,
    ) -> Result<Vec<RequestInstance>, ConfigError> {
        let defaults = &self.document.defaults.request;
        let name = item.name.clone().unwrap_or_default();
        debug!("Instantiating the requests for [{}]", name);

        let mut spec = merge(defaults, item, &name)?;
        resolve_bearer(&mut spec.headers, tokens)?;

        let urls = UrlSource::resolve(defaults, item, &name)?.expand(&name)?;
        let suite = suite_label(item);

        let mut instances = Vec::with_capacity(urls.len());
        for url in urls {
            let parsed = Url::parse(&url).map_err(|e| ConfigError::InvalidUrl {
                request: name.clone(),
                url: url.clone(),
                reason: e.to_string(),
            })?;

            let proxy = if self.bypasses_proxy(&parsed) {
                debug!("Bypassing proxy for {}", url);
                BTreeMap::new()
            } else {
                spec.proxy.clone()
            };

            instances.push(RequestInstance {
                name: name.clone(),
                summary: item.summary.clone(),
                suite: suite.clone(),
                tags: item.tags.0.clone(),
                url,
                method: spec.method,
                headers: spec.headers.clone(),
                body: spec.body.clone(),
                truststore: spec.truststore.clone(),
                keystore: spec.keystore.clone(),
                proxy,
                timeout: spec.timeout,
                expectations: item.expect.clone(),
                ..RequestInstance::default()
            });
        }

        Ok(instances)
    }

    /// 主机名包含任一绕过子串时不走代理（纯子串匹配）
    fn bypasses_proxy(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        self.document
            .defaults
            .bypass_proxy()
            .any(|substring| !substring.is_empty() && host.contains(substring))
    }
}

/// `Bearer {{provider}}` 替换为已获取的 token
fn resolve_bearer(
    headers: &mut BTreeMap<String, String>,
    tokens: &impl TokenProvider,
) -> Result<(), ConfigError> {
    let Some(value) = headers.get_mut("authorization") else {
        return Ok(());
    };
    let Some(caps) = bearer_regex().captures(value) else {
        return Ok(());
    };

    let provider = caps[1].to_string();
    match tokens.token(&provider) {
        Some(token) => {
            *value = format!("Bearer {}", token);
            Ok(())
        }
        None => {
            error!("Token not found for provider: {}", provider);
            Err(ConfigError::MissingToken { provider })
        }
    }
}

/// 显式 suite，否则由名称生成，名称为空时随机生成
fn suite_label(item: &RequestItem) -> String {
    if let Some(suite) = item.suite.as_deref().filter(|s| !s.is_empty()) {
        return suite.to_string();
    }
    match item.name.as_deref().filter(|n| !n.is_empty()) {
        Some(name) => slugify(name),
        None => random_label(7),
    }
}

pub(crate) fn slugify(text: &str) -> String {
    text.to_lowercase().replace(' ', "-")
}

fn random_label(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
