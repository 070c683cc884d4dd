/// OAuth2 token 获取
mod client;
mod store;
mod types;

pub use crate::spec::OAuth2Provider;
pub use client::OAuth2Client;
pub use store::TokenStore;
pub use types::{TokenError, TokenProvider, TokenSource};
