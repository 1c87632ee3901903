//! HTTP transport seam
//!
//! Protocol clients never talk to the network directly; they go through a
//! [`Transport`] handle constructed by the caller and shared for a whole run
//! so that the cookie jar persists across both products.

pub mod http;

pub use http::HttpTransport;

use crate::Result;
use async_trait::async_trait;
use reqwest::header::HeaderMap;

/// Status and body of one portal response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// GET/POST with cookie persistence across calls
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<RawResponse>;

    async fn post(&self, url: &str, headers: &HeaderMap, body: Option<String>)
    -> Result<RawResponse>;
}
