/// 集合文档模型
mod loader;
mod types;

pub use loader::DocumentLoader;
pub use types::{
    Defaults, Document, Invoke, KeyStore, OAuth2Provider, RequestDefaults, RequestItem, Tags,
    TrustStore, UrlValues,
};
