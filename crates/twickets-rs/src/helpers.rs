//! Helper functions for making feed requests and handling what comes back

use scraper::Html;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::errors::TwicketsError;
use crate::transport::{FeedRequest, Transport};


/// Make a cancellable GET request and return the body of a successful response
pub(crate) async fn cancellable_get(
    transport: &dyn Transport,
    cancel: &CancellationToken,
    url: &str,
) -> Result<String, TwicketsError> {
    let request = FeedRequest::get(url);
    let resp = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(TwicketsError::Cancelled),
        resp = transport.execute(request) => resp?,
    };
    if !resp.status.is_success() {
        return Err(TwicketsError::Http {
            status: resp.status,
            body: html_to_text(&resp.body),
        });
    }
    Ok(resp.body)
}


/// Render an (error) page as plain text so it can be logged. Non-HTML bodies
/// come back trimmed but otherwise unchanged.
pub(crate) fn html_to_text(body: &str) -> String {
    if !body.trim_start().starts_with('<') {
        return body.trim().to_string();
    }
    let document = Html::parse_document(body);
    document
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}


/// Check a url string is set, parses, has a host and an http(s) scheme
pub(crate) fn validate_url(url: &str) -> Result<Url, String> {
    if url.is_empty() {
        return Err("url is not set".to_string());
    }
    let parsed = Url::parse(url).map_err(|e| format!("url format invalid: {e}"))?;
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err("url hostname missing".to_string());
    }
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(format!("url scheme unsupported: {other}")),
    }
}


/// Feed timestamps are millisecond epochs, usually encoded as strings
pub(crate) mod unix_millis {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Millis {
        Text(String),
        Number(i64),
    }

    pub fn serialize<S>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.timestamp_millis().to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = match Millis::deserialize(deserializer)? {
            Millis::Number(n) => n,
            Millis::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|e| de::Error::custom(format!("invalid millisecond timestamp '{s}': {e}")))?,
        };
        DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {millis}")))
    }
}
