use std::collections::BTreeMap;
use std::fs;
use std::future::Future;
use std::path::Path;
use std::time::Instant;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Certificate, Client, ClientBuilder, Identity, Proxy};
use tracing::{debug, trace, warn};

use crate::collection::{RequestBody, RequestInstance};
use crate::http::response::HttpResponse;
use crate::http::types::{Status, TransportError};
use crate::spec::TrustStore;

/// 发送单个请求实例的能力
pub trait Transport {
    fn send(
        &self,
        instance: &RequestInstance,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// 基于 reqwest 的传输实现
///
/// 超时、代理、信任材料和身份材料都是实例级的，所以每个实例单独构造 client。
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpTransport;

impl HttpTransport {
    pub fn new() -> Self {
        Self
    }

    fn build_client(instance: &RequestInstance) -> Result<Client, TransportError> {
        let mut builder = Client::builder().timeout(instance.timeout);
        builder = Self::configure_proxy(builder, &instance.proxy)?;

        match &instance.truststore {
            Some(TrustStore::Verify(false)) => {
                builder = builder.danger_accept_invalid_certs(true);
            }
            Some(TrustStore::Bundle(path)) => {
                let pem = read_material(path)?;
                let cert = Certificate::from_pem(&pem).map_err(TransportError::Build)?;
                builder = builder.add_root_certificate(cert);
            }
            Some(TrustStore::Verify(true)) | None => {}
        }

        if let Some(keystore) = &instance.keystore {
            let mut pem = Vec::new();
            for path in keystore.paths() {
                pem.extend(read_material(path)?);
                pem.push(b'\n');
            }
            let identity = Identity::from_pem(&pem).map_err(TransportError::Build)?;
            builder = builder.identity(identity);
        }

        builder.build().map_err(TransportError::Build)
    }

    fn configure_proxy(
        mut builder: ClientBuilder,
        proxies: &BTreeMap<String, String>,
    ) -> Result<ClientBuilder, TransportError> {
        let proxies = Self::build_proxies(proxies)?;
        if proxies.is_empty() {
            return Ok(builder.no_proxy());
        }

        for proxy in proxies {
            builder = builder.proxy(proxy);
        }
        Ok(builder)
    }

    /// 按 scheme 构造代理，跳过不支持的 scheme
    fn build_proxies(proxies: &BTreeMap<String, String>) -> Result<Vec<Proxy>, TransportError> {
        let mut built = Vec::with_capacity(proxies.len());

        for (scheme, url) in proxies {
            let proxy = match scheme.to_ascii_lowercase().as_str() {
                "http" => Proxy::http(url),
                "https" => Proxy::https(url),
                "all" => Proxy::all(url),
                other => {
                    warn!("Ignoring proxy for unsupported scheme {}", other);
                    continue;
                }
            }
            .map_err(|source| TransportError::Proxy {
                url: url.clone(),
                source,
            })?;
            built.push(proxy);
        }

        Ok(built)
    }

    fn build_headers(instance: &RequestInstance) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in &instance.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => warn!("Skipping invalid header {}: {}", name, value),
            }
        }
        headers
    }
}

impl Transport for HttpTransport {
    async fn send(&self, instance: &RequestInstance) -> Result<HttpResponse, TransportError> {
        let client = Self::build_client(instance)?;
        let mut headers = Self::build_headers(instance);

        let mut request = client.request(instance.method.to_reqwest(), &instance.url);
        match &instance.body {
            Some(RequestBody::Json(value)) => {
                headers
                    .entry(CONTENT_TYPE)
                    .or_insert(HeaderValue::from_static("application/json"));
                let body = serde_json::to_vec(value).map_err(TransportError::Encode)?;
                request = request.body(body);
            }
            Some(RequestBody::Text(text)) => {
                request = request.body(text.clone());
            }
            None => {}
        }
        let request = request.headers(headers);

        let start = Instant::now();
        let response = request.send().await.map_err(TransportError::Request)?;
        let status = Status::new(response.status().as_u16())?;

        let mut response_headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in response.headers() {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            response_headers
                .entry(name.as_str().to_ascii_lowercase())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert(value);
        }

        let body = response.text().await.map_err(TransportError::Body)?;
        let duration = start.elapsed();

        debug!(
            "{} {} -> {} in {}ms",
            instance.method,
            instance.url,
            status.code(),
            duration.as_millis()
        );
        trace!("Response body: {}", body);

        Ok(HttpResponse::new(status, response_headers, body, duration))
    }
}

fn read_material(path: &Path) -> Result<Vec<u8>, TransportError> {
    fs::read(path).map_err(|source| TransportError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::types::Method;
    use crate::spec::KeyStore;
    use std::path::PathBuf;

    #[test]
    fn test_build_headers_skips_invalid() {
        let mut instance = RequestInstance::new("h", Method::Get, "http://localhost/");
        instance.headers.insert("x-ok".to_string(), "1".to_string());
        instance.headers.insert("bad header".to_string(), "2".to_string());

        let headers = HttpTransport::build_headers(&instance);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers["x-ok"], "1");
    }

    #[test]
    fn test_missing_truststore_file() {
        let mut instance = RequestInstance::new("t", Method::Get, "https://localhost/");
        instance.truststore = Some(TrustStore::Bundle(PathBuf::from("/nonexistent/ca.pem")));

        assert!(matches!(
            HttpTransport::build_client(&instance),
            Err(TransportError::Io { .. })
        ));
    }

    #[test]
    fn test_unsupported_proxy_schemes_build_nothing() {
        let mut proxies = BTreeMap::new();
        proxies.insert("ftp".to_string(), "http://proxy.local:3128".to_string());
        proxies.insert("socks".to_string(), "http://proxy.local:1080".to_string());
        assert!(HttpTransport::build_proxies(&proxies).unwrap().is_empty());

        proxies.insert("HTTPS".to_string(), "http://proxy.local:3128".to_string());
        assert_eq!(HttpTransport::build_proxies(&proxies).unwrap().len(), 1);

        let mut instance = RequestInstance::new("p", Method::Get, "http://localhost/");
        instance.proxy.insert("ftp".to_string(), "http://proxy.local:3128".to_string());
        assert!(HttpTransport::build_client(&instance).is_ok());
    }

    #[test]
    fn test_invalid_proxy() {
        let mut instance = RequestInstance::new("p", Method::Get, "http://localhost/");
        instance.proxy.insert("http".to_string(), "http://bad host:3128".to_string());

        assert!(matches!(
            HttpTransport::build_client(&instance),
            Err(TransportError::Proxy { .. })
        ));
    }

    #[test]
    fn test_insecure_client_builds() {
        let mut instance = RequestInstance::new("i", Method::Get, "https://localhost/");
        instance.truststore = Some(TrustStore::Verify(false));
        instance.proxy.insert("all".to_string(), "http://proxy.local:3128".to_string());

        assert!(HttpTransport::build_client(&instance).is_ok());
    }

    #[test]
    fn test_keystore_pair_paths_read() {
        let mut instance = RequestInstance::new("k", Method::Get, "https://localhost/");
        instance.keystore = Some(KeyStore::Pair(vec![
            PathBuf::from("/nonexistent/cert.pem"),
            PathBuf::from("/nonexistent/key.pem"),
        ]));

        assert!(matches!(
            HttpTransport::build_client(&instance),
            Err(TransportError::Io { .. })
        ));
    }
}
