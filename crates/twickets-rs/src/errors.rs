use std::fmt;

use reqwest::StatusCode;

use crate::price::PriceError;

#[derive(Debug)]
pub enum TwicketsError {
    /// Bounded-fetch parameters were malformed or contradictory. Raised before any request.
    InvalidInput(String),
    RequestError(reqwest::Error),
    /// The caller's cancellation token fired while a page was in flight.
    Cancelled,
    /// Non-success status from the feed. `body` is the error page rendered as text.
    Http { status: StatusCode, body: String },
    ParseError(serde_json::Error),
    /// The feed returned a page with no entries at all.
    EmptyFeed,
    ProxyError(String),
    PriceError(PriceError),
    UrlError(url::ParseError),
    Other(String),
}
impl fmt::Display for TwicketsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TwicketsError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            TwicketsError::RequestError(e) => write!(f, "Request error: {}", e),
            TwicketsError::Cancelled => write!(f, "Request cancelled"),
            TwicketsError::Http { status, body } => {
                write!(f, "Failed to fetch tickets: {}\n\nResponse:\n{}", status, body)
            }
            TwicketsError::ParseError(e) => write!(f, "Parse error: {}", e),
            TwicketsError::EmptyFeed => write!(f, "No listings returned"),
            TwicketsError::ProxyError(msg) => write!(f, "FlareSolverr error: {}", msg),
            TwicketsError::PriceError(e) => write!(f, "Price error: {}", e),
            TwicketsError::UrlError(e) => write!(f, "Url error: {}", e),
            TwicketsError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}
impl std::error::Error for TwicketsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TwicketsError::RequestError(e) => Some(e),
            TwicketsError::ParseError(e) => Some(e),
            TwicketsError::PriceError(e) => Some(e),
            TwicketsError::UrlError(e) => Some(e),
            _ => None,
        }
    }
}
impl From<reqwest::Error> for TwicketsError {
    fn from(err: reqwest::Error) -> Self {
        TwicketsError::RequestError(err)
    }
}
impl From<serde_json::Error> for TwicketsError {
    fn from(err: serde_json::Error) -> Self {
        TwicketsError::ParseError(err)
    }
}
impl From<PriceError> for TwicketsError {
    fn from(err: PriceError) -> Self {
        TwicketsError::PriceError(err)
    }
}
impl From<url::ParseError> for TwicketsError {
    fn from(err: url::ParseError) -> Self {
        TwicketsError::UrlError(err)
    }
}
impl From<String> for TwicketsError {
    fn from(s: String) -> TwicketsError {
        TwicketsError::Other(s)
    }
}
