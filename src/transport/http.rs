//! reqwest-backed transport

use super::{RawResponse, Transport};
use crate::{Result, config::NetworkSettings};
use async_trait::async_trait;
use reqwest::{
    Client, Proxy, Url,
    cookie::{CookieStore, Jar},
    header::{COOKIE, HeaderMap, HeaderValue},
};
use std::sync::Arc;

/// Transport over a single reqwest client with an in-memory cookie jar
///
/// reqwest leaves out its jar whenever a request already carries a `Cookie`
/// header, so the stored cookies for the target URL are merged into any
/// explicit header before sending.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    jar: Arc<Jar>,
}

impl HttpTransport {
    /// Build the client from network settings
    pub fn new(settings: &NetworkSettings) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let mut builder = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .user_agent(settings.user_agent.clone())
            .timeout(settings.timeout());

        if let Some(proxy) = &settings.proxy {
            builder = builder.proxy(Proxy::all(proxy)?);
        }

        Ok(Self {
            client: builder.build()?,
            jar,
        })
    }

    /// Request headers with the jar's cookies for `url` folded into an
    /// explicit `Cookie` header
    fn request_headers(&self, url: &str, headers: &HeaderMap) -> HeaderMap {
        let mut headers = headers.clone();
        let Some(explicit) = headers.get(COOKIE).and_then(|v| v.to_str().ok()) else {
            return headers;
        };
        let Ok(parsed) = Url::parse(url) else {
            return headers;
        };
        let Some(stored) = self.jar.cookies(&parsed) else {
            return headers;
        };
        let Ok(stored) = stored.to_str() else {
            return headers;
        };

        let merged = merge_cookies(explicit, stored);
        if let Ok(value) = HeaderValue::from_str(&merged) {
            headers.insert(COOKIE, value);
        }
        headers
    }

    async fn into_raw(response: reqwest::Response) -> Result<RawResponse> {
        let status = response.status().as_u16();
        let raw = RawResponse::new(status, response.text().await?);
        if !raw.is_success() {
            tracing::warn!("Portal answered with HTTP {}", status);
        }
        Ok(raw)
    }
}

/// Explicit cookies first, then stored cookies whose names are not taken
fn merge_cookies(explicit: &str, stored: &str) -> String {
    let pairs = |header: &str| -> Vec<String> {
        header
            .split(';')
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .map(str::to_string)
            .collect()
    };
    let name = |pair: &str| pair.split('=').next().unwrap_or_default().trim().to_string();

    let mut merged = pairs(explicit);
    let taken: Vec<String> = merged.iter().map(|pair| name(pair.as_str())).collect();
    merged.extend(
        pairs(stored)
            .into_iter()
            .filter(|pair| !taken.contains(&name(pair.as_str()))),
    );
    merged.join("; ")
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<RawResponse> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .headers(self.request_headers(url, headers))
            .send()
            .await?;
        Self::into_raw(response).await
    }

    async fn post(
        &self,
        url: &str,
        headers: &HeaderMap,
        body: Option<String>,
    ) -> Result<RawResponse> {
        tracing::debug!("POST {}", url);
        let mut request = self
            .client
            .post(url)
            .headers(self.request_headers(url, headers));
        if let Some(body) = body {
            request = request.body(body);
        }
        let response = request.send().await?;
        Self::into_raw(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_creation() {
        let transport = HttpTransport::new(&NetworkSettings::default());
        assert!(transport.is_ok());
    }

    #[test]
    fn test_invalid_proxy_rejected() {
        let settings = NetworkSettings {
            proxy: Some("::not a proxy::".to_string()),
            ..NetworkSettings::default()
        };
        assert!(HttpTransport::new(&settings).is_err());
    }

    #[test]
    fn test_merge_cookies_keeps_explicit_values() {
        let merged = merge_cookies("JSESSIONID=abc; UID=7", "WMONID=x1; JSESSIONID=stale");
        assert_eq!(merged, "JSESSIONID=abc; UID=7; WMONID=x1");
    }

    #[test]
    fn test_stored_cookies_join_explicit_header() {
        let transport = HttpTransport::new(&NetworkSettings::default()).unwrap();
        let url = Url::parse("https://portal.test/olotto/game/game645.do").unwrap();
        transport.jar.add_cookie_str("WMONID=abc123; Path=/", &url);

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("JSESSIONID=session01"));
        let merged = transport.request_headers(url.as_str(), &headers);

        assert_eq!(merged.get(COOKIE).unwrap(), "JSESSIONID=session01; WMONID=abc123");
    }

    #[test]
    fn test_headers_without_cookie_left_to_client() {
        let transport = HttpTransport::new(&NetworkSettings::default()).unwrap();
        let url = Url::parse("https://portal.test/").unwrap();
        transport.jar.add_cookie_str("WMONID=abc123", &url);

        let headers = transport.request_headers(url.as_str(), &HeaderMap::new());
        assert!(headers.get(COOKIE).is_none());
    }
}
