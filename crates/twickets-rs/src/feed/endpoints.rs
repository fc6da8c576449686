//! Feed module endpoints.
//!
//! This module implements the bounded fetch: walking the time-ordered catalogue
//! feed page by page until a count or time bound is reached.
//!
//! # Usage
//!
//! All endpoint methods are available on [`TwicketsClient`](crate::client::TwicketsClient).

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::client::TwicketsClient;
use crate::errors::TwicketsError;
use crate::feed::models::{
    decode_feed_page, feed_url, FeedPage, FeedUrlInput, FetchTicketListingsInput,
};
use crate::helpers;
use crate::listings::models::TicketListings;

impl TwicketsClient {
    /// Fetches and decodes a single feed page.
    ///
    /// # Errors
    /// - [`TwicketsError::Cancelled`] if `cancel` fires before the response arrives
    /// - [`TwicketsError::Http`] for a non-success status, with the error page as text
    /// - [`TwicketsError::ParseError`] if the page wrapper cannot be decoded
    pub async fn fetch_feed_page(
        &self,
        cancel: &CancellationToken,
        feed_url: &str,
    ) -> Result<FeedPage, TwicketsError> {
        let body = helpers::cancellable_get(self.transport.as_ref(), cancel, feed_url).await?;
        decode_feed_page(body.as_bytes())
    }

    /// Fetches ticket listings within the bounds of `input`, newest first.
    ///
    /// Pages are requested one after another, each with the creation time of
    /// the oldest listing seen so far as its upper bound. Fetching stops once
    /// `max_number` listings are collected or a listing not created after
    /// `created_after` is reached.
    ///
    /// The feed's `maxTime` bound is treated as inclusive. The listing sitting on
    /// a page boundary can therefore come back on the next page; listings
    /// already collected on an earlier page are skipped rather than returned
    /// twice. A page of only delisted entries is skipped and the same bound is
    /// requested again; a second page in a row that adds nothing ends the fetch
    /// with what has been collected. A page of only already-seen listings ends
    /// it straight away. So if more than a page worth of listings share one
    /// millisecond, those beyond the first page are not returned.
    ///
    /// # Errors
    /// Invalid input fails before any request is made. Any transport, status,
    /// decode or cancellation error aborts the whole fetch; listings from
    /// earlier pages are discarded, never returned partially. A page with no
    /// entries at all is [`TwicketsError::EmptyFeed`].
    pub async fn fetch_ticket_listings(
        &self,
        cancel: &CancellationToken,
        input: &FetchTicketListingsInput,
    ) -> Result<TicketListings, TwicketsError> {
        let input = input.resolve(Utc::now())?;
        let max_number = input.max_number.limit();

        let mut listings =
            TicketListings::with_capacity(max_number.unwrap_or(0).min(1024));
        let mut seen_ids: HashSet<String> = HashSet::new();
        let mut earliest_ticket_time = input.created_before;
        let mut num_listings_remaining = max_number;
        let mut page_number = 0usize;
        let mut previous_page_empty = false;

        loop {
            page_number += 1;
            let url = feed_url(
                &self.config.base_url,
                &FeedUrlInput {
                    api_key: &self.api_key,
                    country: input.country,
                    regions: &input.regions,
                    before_time: earliest_ticket_time,
                    page_size: self.config.page_size,
                },
            )?;

            let page = self.fetch_feed_page(cancel, &url).await?;
            if page.num_entries == 0 {
                return Err(TwicketsError::EmptyFeed);
            }
            let num_entries = page.num_entries;
            let num_active = page.listings.len();

            let (processed, should_break) = process_feed_listings(
                page.listings,
                num_listings_remaining,
                input.created_after,
                &seen_ids,
            );
            debug!(
                page = page_number,
                entries = num_entries,
                appended = processed.len(),
                before = %earliest_ticket_time,
                "fetched feed page"
            );

            let oldest_appended = processed.last().map(|l| l.created_at);
            seen_ids.extend(processed.iter().map(|l| l.id.clone()));
            listings.append(processed);
            if should_break {
                break;
            }

            let Some(oldest_appended) = oldest_appended else {
                if num_active == 0 && !previous_page_empty {
                    debug!(
                        page = page_number,
                        entries = num_entries,
                        "feed page only had delisted entries, requesting again"
                    );
                    previous_page_empty = true;
                    continue;
                }
                warn!(
                    page = page_number,
                    entries = num_entries,
                    before = %earliest_ticket_time,
                    "feed page added no new listings, stopping"
                );
                break;
            };
            previous_page_empty = false;

            // Never move the cursor forward, even if a page arrives out of order.
            earliest_ticket_time = earliest_ticket_time.min(oldest_appended);
            num_listings_remaining = max_number.map(|max| max - listings.len());
        }

        debug!(count = listings.len(), pages = page_number, "fetched ticket listings");
        Ok(listings)
    }
}

/// Scans one page in the order received.
///
/// Returns the listings to keep and whether fetching should stop. Stops at the
/// first listing not created strictly after `created_after`, or once `remaining`
/// listings have been kept. Listings whose id is in `seen_ids` are skipped.
pub(crate) fn process_feed_listings(
    listings: TicketListings,
    remaining: Option<usize>,
    created_after: Option<DateTime<Utc>>,
    seen_ids: &HashSet<String>,
) -> (TicketListings, bool) {
    let mut processed = TicketListings::with_capacity(listings.len());
    for listing in listings {
        if created_after.is_some_and(|after| listing.created_at <= after) {
            return (processed, true);
        }
        if seen_ids.contains(&listing.id) {
            continue;
        }
        processed.push(listing);
        if remaining.is_some_and(|max| processed.len() >= max) {
            return (processed, true);
        }
    }
    (processed, false)
}
