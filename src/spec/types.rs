use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::assertion::ExpectationSet;
use crate::value::Value;

/// 集合文档
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub requests: Vec<RequestItem>,
}

/// `defaults` 段
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Defaults {
    #[serde(default)]
    pub request: RequestDefaults,

    /// 旧格式中直接放在 defaults 下的绕过代理列表
    #[serde(default)]
    pub bypass_proxy: Vec<String>,

    /// OAuth2 token 提供方，按名称引用
    #[serde(default)]
    pub oauth2: BTreeMap<String, OAuth2Provider>,
}

impl Defaults {
    /// 两处声明的绕过代理子串合并
    pub fn bypass_proxy(&self) -> impl Iterator<Item = &str> {
        self.request
            .bypass_proxy
            .iter()
            .chain(self.bypass_proxy.iter())
            .map(|s| s.as_str())
    }
}

/// `defaults.request` 段
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestDefaults {
    pub method: Option<String>,
    pub truststore: Option<TrustStore>,
    pub keystore: Option<KeyStore>,
    #[serde(default)]
    pub headers: BTreeMap<String, Value>,
    pub payload: Option<Value>,
    /// 超时（秒）
    pub timeout: Option<f64>,
    pub proxy: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub bypass_proxy: Vec<String>,
    pub url: Option<String>,
    pub url_template: Option<String>,
}

/// `requests` 中的单个条目
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestItem {
    pub name: Option<String>,
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: Tags,
    pub suite: Option<String>,
    pub timeout: Option<f64>,
    #[serde(default)]
    pub invoke: Invoke,
    #[serde(default)]
    pub expect: ExpectationSet,
}

/// 单个请求的覆盖字段
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Invoke {
    pub method: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, Value>,
    pub payload: Option<Value>,
    pub url: Option<String>,
    pub url_values: Option<UrlValues>,
    pub truststore: Option<TrustStore>,
    pub keystore: Option<KeyStore>,
    pub proxy: Option<BTreeMap<String, String>>,
    pub timeout: Option<f64>,
}

/// 标签：单个字符串或字符串列表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags(pub Vec<String>);

impl<'de> Deserialize<'de> for Tags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tags = match Value::deserialize(deserializer)? {
            Value::Null => Vec::new(),
            Value::List(items) => items
                .into_iter()
                .filter(|v| !v.is_null())
                .map(|v| v.to_text())
                .collect(),
            scalar => vec![scalar.to_text()],
        };
        Ok(Tags(tags.into_iter().filter(|t| !t.is_empty()).collect()))
    }
}

/// URL 模板变量，保持声明顺序；单个标量视为只有一个元素的集合
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlValues(pub Vec<(String, Vec<Value>)>);

impl UrlValues {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for UrlValues {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mapping = serde_yaml::Mapping::deserialize(deserializer)?;
        let mut variables = Vec::with_capacity(mapping.len());

        for (name, values) in mapping {
            let name = Value::from(name).to_text();
            let values = match Value::from(values) {
                Value::List(items) => items,
                Value::Map(_) => {
                    return Err(D::Error::custom(format!(
                        "url_values.{} must be a scalar or a list of scalars",
                        name
                    )));
                }
                scalar => vec![scalar],
            };
            variables.push((name, values));
        }

        Ok(UrlValues(variables))
    }
}

/// 信任材料：`false` 关闭证书校验，路径为 PEM CA 文件
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TrustStore {
    Verify(bool),
    Bundle(PathBuf),
}

/// 身份材料：包含证书和私钥的单个 PEM，或 `[cert, key]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum KeyStore {
    Combined(PathBuf),
    Pair(Vec<PathBuf>),
}

impl KeyStore {
    pub fn paths(&self) -> Vec<&PathBuf> {
        match self {
            KeyStore::Combined(path) => vec![path],
            KeyStore::Pair(paths) => paths.iter().collect(),
        }
    }
}

/// OAuth2 token 提供方配置
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OAuth2Provider {
    pub token_url: String,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    pub scope: Option<String>,
    #[serde(default = "default_grant_type")]
    pub grant_type: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_grant_type() -> String {
    "client_credentials".to_string()
}

fn default_enabled() -> bool {
    true
}
