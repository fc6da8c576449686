//! Feed module models.
//!
//! This module contains the bounded-fetch input, the catalogue feed URL and the
//! decoder for a single feed page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::TwicketsError;
use crate::listings::models::{TicketListing, TicketListings};
use crate::location::{Country, Region};

/// Catalogue feed endpoint.
pub const FEED_URL: &str = "https://www.twickets.live/services/catalogue";

/// Number of entries the feed is asked for per page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// How many listings a bounded fetch may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxNumber {
    /// At most this many listings. Must be positive.
    Limit(usize),
    /// No count limit. Only allowed together with `created_after`, and should
    /// only be used with a well constrained time window.
    Unbounded,
}

impl MaxNumber {
    pub const DEFAULT: usize = 10;

    pub fn limit(self) -> Option<usize> {
        match self {
            MaxNumber::Limit(n) => Some(n),
            MaxNumber::Unbounded => None,
        }
    }
}

impl Default for MaxNumber {
    fn default() -> Self {
        MaxNumber::Limit(Self::DEFAULT)
    }
}

/// Parameters of a bounded fetch.
///
/// Listings can be fetched up to a maximum number, within a time window, or
/// both. When both are set, whichever bound is hit first stops the fetch.
///
/// # Example
/// ```no_run
/// use chrono::{Duration, Utc};
/// use twickets_rs::feed::models::{FetchTicketListingsInput, MaxNumber};
/// use twickets_rs::location::Country;
///
/// let input = FetchTicketListingsInput {
///     max_number: MaxNumber::Limit(250),
///     created_after: Some(Utc::now() - Duration::minutes(5)),
///     ..FetchTicketListingsInput::new(Country::UnitedKingdom)
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicketListingsInput {
    pub country: Country,
    /// Regions to fetch listings from. Empty means any region.
    pub regions: Vec<Region>,
    /// Defaults to 10 listings.
    pub max_number: MaxNumber,
    /// Listings must be created strictly after this time.
    pub created_after: Option<DateTime<Utc>>,
    /// Upper time bound the first page is requested with. Defaults to now.
    pub created_before: Option<DateTime<Utc>>,
}

impl FetchTicketListingsInput {
    pub fn new(country: Country) -> Self {
        Self {
            country,
            regions: Vec::new(),
            max_number: MaxNumber::default(),
            created_after: None,
            created_before: None,
        }
    }

    /// Apply defaults (with `now` as the default upper bound) and validate.
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<ResolvedFetchInput, TwicketsError> {
        let resolved = ResolvedFetchInput {
            country: self.country,
            regions: self.regions.clone(),
            max_number: self.max_number,
            created_after: self.created_after,
            created_before: self.created_before.unwrap_or(now),
        };
        resolved.validate()?;
        Ok(resolved)
    }

    /// Validate the input as it would be used right now.
    pub fn validate(&self) -> Result<(), TwicketsError> {
        self.resolve(Utc::now()).map(|_| ())
    }
}

/// A [`FetchTicketListingsInput`] with defaults applied. Read-only for the
/// duration of one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFetchInput {
    pub country: Country,
    pub regions: Vec<Region>,
    pub max_number: MaxNumber,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: DateTime<Utc>,
}

impl ResolvedFetchInput {
    fn validate(&self) -> Result<(), TwicketsError> {
        if let Some(region) = self.regions.iter().find(|r| r.country() != self.country) {
            return Err(TwicketsError::InvalidInput(format!(
                "region '{}' is not in country '{}'",
                region, self.country
            )));
        }
        if let Some(after) = self.created_after {
            if self.created_before < after {
                return Err(TwicketsError::InvalidInput(
                    "created before time must not be earlier than created after time".to_string(),
                ));
            }
        }
        match self.max_number {
            MaxNumber::Limit(0) => Err(TwicketsError::InvalidInput(
                "max number must be positive".to_string(),
            )),
            MaxNumber::Unbounded if self.created_after.is_none() => Err(TwicketsError::InvalidInput(
                "if not limiting number of ticket listings, created after must be set".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Parameters of a single feed page URL.
#[derive(Debug, Clone)]
pub struct FeedUrlInput<'a> {
    pub api_key: &'a str,
    pub country: Country,
    pub regions: &'a [Region],
    /// Listings created at or before this time are returned.
    pub before_time: DateTime<Utc>,
    pub page_size: u32,
}

#[derive(Debug, Serialize)]
struct FeedQuery<'a> {
    api_key: &'a str,
    count: u32,
    #[serde(rename = "maxTime")]
    max_time: i64,
    q: String,
}

/// Build the catalogue URL for one page.
///
/// Format is
/// `<base>?api_key=<key>&count=<n>&maxTime=<ms>&q=countryCode=GB[,regionCode=<code>...]`
/// with the query URL-encoded.
pub fn feed_url(base_url: &str, input: &FeedUrlInput<'_>) -> Result<String, TwicketsError> {
    if input.api_key.is_empty() {
        return Err(TwicketsError::InvalidInput("api key must be set".to_string()));
    }
    let mut q = format!("countryCode={}", input.country.code());
    for region in input.regions {
        q.push_str(",regionCode=");
        q.push_str(region.code());
    }
    let query = serde_urlencoded::to_string(FeedQuery {
        api_key: input.api_key,
        count: input.page_size,
        max_time: input.before_time.timestamp_millis(),
        q,
    })
    .map_err(|e| TwicketsError::Other(format!("Failed to serialize params: {}", e)))?;
    Ok(format!("{}?{}", base_url.trim_end_matches('/'), query))
}

/// One decoded feed page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedPage {
    /// Active listings in the order the feed returned them (newest first).
    pub listings: TicketListings,
    /// Number of entries on the page, delisted ones included.
    pub num_entries: usize,
}

#[derive(Debug, Deserialize)]
struct FeedBody {
    #[serde(rename = "responseData")]
    response_data: Vec<FeedEntry>,
}

#[derive(Debug, Deserialize)]
struct FeedEntry {
    /// Null when the listing was withdrawn after the page slot was filled.
    #[serde(rename = "catalogBlockSummary", default)]
    listing: Option<TicketListing>,
}

/// Decode one feed page, silently dropping delisted entries.
///
/// The feed returns entries newest first. That ordering is relied upon by the
/// bounded fetch and is not re-checked here.
pub fn decode_feed_page(data: &[u8]) -> Result<FeedPage, TwicketsError> {
    let body: FeedBody = serde_json::from_slice(data)?;
    let num_entries = body.response_data.len();
    let listings = body
        .response_data
        .into_iter()
        .filter_map(|entry| entry.listing)
        .collect();
    Ok(FeedPage {
        listings,
        num_entries,
    })
}
