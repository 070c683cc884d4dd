use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::oauth::types::{TokenError, TokenSource};
use crate::spec::OAuth2Provider;

#[derive(Debug, Deserialize)]
struct TokenReply {
    access_token: Option<String>,
}

/// 基于 reqwest 的 OAuth2 token 客户端
#[derive(Clone)]
pub struct OAuth2Client {
    inner: reqwest::Client,
}

impl OAuth2Client {
    pub fn new() -> Result<Self, reqwest::Error> {
        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { inner })
    }

    fn form(provider: &OAuth2Provider) -> Vec<(&'static str, &str)> {
        let mut form = vec![
            ("grant_type", provider.grant_type.as_str()),
            ("client_id", provider.client_id.as_str()),
            ("client_secret", provider.client_secret.as_str()),
        ];
        if let Some(scope) = provider.scope.as_deref() {
            form.push(("scope", scope));
        }
        form
    }
}

impl TokenSource for OAuth2Client {
    async fn fetch_token(&self, provider: &OAuth2Provider) -> Result<String, TokenError> {
        let token_url = provider.token_url.clone();
        debug!("Requesting token from {}", token_url);

        let response = self
            .inner
            .post(&provider.token_url)
            .form(&Self::form(provider))
            .send()
            .await
            .map_err(|source| TokenError::Request {
                token_url: token_url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TokenError::Status {
                token_url,
                status: status.as_u16(),
                body,
            });
        }

        let reply: TokenReply = response.json().await.map_err(|source| TokenError::Request {
            token_url: token_url.clone(),
            source,
        })?;

        reply
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or(TokenError::MissingAccessToken { token_url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(token_url: String) -> OAuth2Provider {
        OAuth2Provider {
            token_url,
            client_id: "reqsuite".to_string(),
            client_secret: "s3cret".to_string(),
            scope: Some("read".to_string()),
            grant_type: "client_credentials".to_string(),
            enabled: true,
        }
    }

    #[tokio::test]
    async fn test_fetch_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_id=reqsuite"))
            .and(body_string_contains("scope=read"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"access_token": "abc123", "expires_in": 60})),
            )
            .mount(&server)
            .await;

        let client = OAuth2Client::new().unwrap();
        let token = client
            .fetch_token(&provider(format!("{}/token", server.uri())))
            .await
            .unwrap();
        assert_eq!(token, "abc123");
    }

    #[tokio::test]
    async fn test_fetch_token_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad client"))
            .mount(&server)
            .await;

        let client = OAuth2Client::new().unwrap();
        let result = client
            .fetch_token(&provider(format!("{}/token", server.uri())))
            .await;
        assert!(matches!(result, Err(TokenError::Status { status: 401, .. })));
    }

    #[tokio::test]
    async fn test_fetch_token_without_access_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"error": "x"})))
            .mount(&server)
            .await;

        let client = OAuth2Client::new().unwrap();
        let result = client
            .fetch_token(&provider(format!("{}/token", server.uri())))
            .await;
        assert!(matches!(result, Err(TokenError::MissingAccessToken { .. })));
    }
}
