//! HTTP transport used by [`TwicketsClient`](crate::client::TwicketsClient).
//!
//! The client never talks to reqwest directly. Every page fetch goes through a
//! [`Transport`], so request/response rewriting stages (see
//! [`flaresolverr`](crate::flaresolverr)) can be stacked around the default
//! [`ReqwestTransport`] and swapped for an in-memory one in tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, PRAGMA, USER_AGENT,
};
use reqwest::{Client, Method, StatusCode};

use crate::errors::TwicketsError;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// A fully formed outbound request.
#[derive(Debug, Clone)]
pub struct FeedRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl FeedRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

/// Status and body of a completed request.
#[derive(Debug, Clone)]
pub struct FeedResponse {
    pub status: StatusCode,
    pub body: String,
}

impl FeedResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.into(),
        }
    }
}

/// Performs a single request. Implementations must be safe to share between
/// concurrent fetches.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: FeedRequest) -> Result<FeedResponse, TwicketsError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, request: FeedRequest) -> Result<FeedResponse, TwicketsError> {
        (**self).execute(request).await
    }
}

/// Default transport backed by a [`reqwest::Client`] with browser-like headers.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, TwicketsError> {
        let http_client = Client::builder()
            .default_headers(browser_headers())
            .timeout(timeout)
            .build()?;
        Ok(Self { http_client })
    }

    /// Use an already configured client as is.
    pub fn with_client(http_client: Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: FeedRequest) -> Result<FeedResponse, TwicketsError> {
        let mut builder = self
            .http_client
            .request(request.method, &request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        let resp = builder.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        Ok(FeedResponse { status, body })
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-GB,en;q=0.9"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers
}
