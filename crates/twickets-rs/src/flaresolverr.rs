//! FlareSolverr support.
//!
//! FlareSolverr is a proxy that loads a page in a real browser to get past
//! anti-bot protection. A plain `GET <feed url>` is turned into a
//! `POST <solver>/v1` carrying the feed URL, and the solver's answer (the page
//! rendered as HTML, with the JSON inside a `<pre>`) is unwrapped back into the
//! plain feed body. Both steps are pure functions on [`FeedRequest`] and
//! [`FeedResponse`]; [`FlareSolverrTransport`] composes them around any other
//! transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::errors::TwicketsError;
use crate::helpers;
use crate::transport::{FeedRequest, FeedResponse, Transport};

const SOLVER_PATH_SUFFIX: &str = "/v1";

#[derive(Debug, Serialize)]
struct SolverRequest<'a> {
    cmd: &'static str,
    url: &'a str,
    #[serde(rename = "maxTimeout")]
    max_timeout: u64,
}

#[derive(Debug, Deserialize)]
struct SolverResponse {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    solution: Option<Solution>,
}

#[derive(Debug, Deserialize)]
struct Solution {
    #[serde(default)]
    status: u16,
    #[serde(default)]
    response: String,
}

/// Request/response rewrite stage for a FlareSolverr instance.
#[derive(Debug, Clone)]
pub struct FlareSolverr {
    endpoint: Url,
    max_timeout: Duration,
}

impl FlareSolverr {
    /// `url` may be given with or without the trailing `/v1`.
    pub fn new(url: &str, max_timeout: Duration) -> Result<Self, TwicketsError> {
        helpers::validate_url(url)
            .map_err(|e| TwicketsError::InvalidInput(format!("invalid flaresolverr url: {}", e)))?;
        let base = url.trim_end_matches('/');
        let base = base.strip_suffix(SOLVER_PATH_SUFFIX).unwrap_or(base);
        let endpoint = Url::parse(&format!("{}{}", base, SOLVER_PATH_SUFFIX))?;
        Ok(Self {
            endpoint,
            max_timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn max_timeout(&self) -> Duration {
        self.max_timeout
    }

    /// Rewrites a GET into a solver POST. Other methods pass through untouched.
    pub fn rewrite_request(&self, request: FeedRequest) -> Result<FeedRequest, TwicketsError> {
        if request.method != Method::GET {
            return Ok(request);
        }
        let body = serde_json::to_vec(&SolverRequest {
            cmd: "request.get",
            url: &request.url,
            max_timeout: self.max_timeout.as_millis() as u64,
        })?;
        let mut headers = request.headers;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(FeedRequest {
            method: Method::POST,
            url: self.endpoint.to_string(),
            headers,
            body: Some(body),
        })
    }

    /// Unwraps the page the solver fetched on our behalf.
    ///
    /// A non-success solver response that is not solver JSON is returned as is,
    /// so the caller reports it like any other HTTP failure.
    pub fn rewrite_response(&self, response: FeedResponse) -> Result<FeedResponse, TwicketsError> {
        let parsed: SolverResponse = match serde_json::from_str(&response.body) {
            Ok(parsed) => parsed,
            Err(_) if !response.status.is_success() => return Ok(response),
            Err(e) => {
                return Err(TwicketsError::ProxyError(format!(
                    "invalid solver response: {}",
                    e
                )))
            }
        };
        if parsed.status != "ok" {
            return Err(TwicketsError::ProxyError(format!(
                "solver returned status '{}': {}",
                parsed.status, parsed.message
            )));
        }
        let solution = parsed
            .solution
            .ok_or_else(|| TwicketsError::ProxyError("solver response has no solution".to_string()))?;
        let status = StatusCode::from_u16(solution.status).unwrap_or(StatusCode::OK);
        let body = extract_pre_text(&solution.response)?.unwrap_or(solution.response);
        debug!(status = %status, bytes = body.len(), "unwrapped flaresolverr response");
        Ok(FeedResponse { status, body })
    }
}

/// Text of the first `<pre>` element, which is where browsers render raw JSON.
fn extract_pre_text(html: &str) -> Result<Option<String>, TwicketsError> {
    let selector = Selector::parse("pre")
        .map_err(|e| TwicketsError::ProxyError(format!("bad selector: {}", e)))?;
    let document = Html::parse_document(html);
    Ok(document
        .select(&selector)
        .next()
        .map(|pre| pre.text().collect::<String>()))
}

/// Routes every request of `inner` through FlareSolverr.
#[derive(Debug, Clone)]
pub struct FlareSolverrTransport<T> {
    inner: T,
    solver: FlareSolverr,
}

impl<T> FlareSolverrTransport<T> {
    pub fn new(inner: T, solver: FlareSolverr) -> Self {
        Self { inner, solver }
    }
}

#[async_trait]
impl<T: Transport> Transport for FlareSolverrTransport<T> {
    async fn execute(&self, request: FeedRequest) -> Result<FeedResponse, TwicketsError> {
        let request = self.solver.rewrite_request(request)?;
        let response = self.inner.execute(request).await?;
        self.solver.rewrite_response(response)
    }
}
