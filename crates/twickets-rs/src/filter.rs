//! Predicate filters over ticket listings.
//!
//! A [`Predicate`] is a stateless boolean test on a listing. Predicates are
//! applied after fetching, combined with [`matches_all`] / [`matches_any`], and
//! the order they are given in never changes the result.
//!
//! ```
//! use twickets_rs::filter::{self, DEFAULT_EVENT_NAME_SIMILARITY};
//! use twickets_rs::listings::models::TicketListings;
//! use twickets_rs::location::Region;
//!
//! let listings = TicketListings::new();
//! let matching = filter::filter_ticket_listings(
//!     listings,
//!     &[
//!         filter::event_name("Coldplay", DEFAULT_EVENT_NAME_SIMILARITY),
//!         filter::event_region(&[Region::London, Region::South]),
//!         filter::num_tickets(2),
//!         filter::min_discount(0.1),
//!     ],
//! );
//! assert!(matching.is_empty());
//! ```

use std::cmp::Ordering;

use crate::listings::models::{TicketListing, TicketListings};
use crate::location::Region;
use crate::price::Price;

/// Event name similarity that tolerates small typos and punctuation differences.
pub const DEFAULT_EVENT_NAME_SIMILARITY: f64 = 0.9;

/// Score of a query found verbatim as a run of words inside a longer name.
pub const WORD_RUN_SIMILARITY: f64 = 0.95;

pub type Predicate = Box<dyn Fn(&TicketListing) -> bool + Send + Sync>;

/// Keeps the listings that satisfy every predicate.
///
/// With no predicates the listings are returned unchanged.
pub fn filter_ticket_listings(listings: TicketListings, predicates: &[Predicate]) -> TicketListings {
    if predicates.is_empty() {
        return listings;
    }
    listings
        .into_iter()
        .filter(|listing| matches_all(listing, predicates))
        .collect()
}

/// True if every predicate holds. True for no predicates.
pub fn matches_all(listing: &TicketListing, predicates: &[Predicate]) -> bool {
    predicates.iter().all(|p| p(listing))
}

/// True if at least one predicate holds. False for no predicates.
pub fn matches_any(listing: &TicketListing, predicates: &[Predicate]) -> bool {
    predicates.iter().any(|p| p(listing))
}

/// Combines predicates into one that holds when any of them does.
pub fn any_of(predicates: Vec<Predicate>) -> Predicate {
    Box::new(move |listing| matches_any(listing, &predicates))
}

/// Event name matches `name` with at least `similarity` in `[0, 1]`.
///
/// 1 only accepts an exact match after normalisation (case, punctuation and
/// whitespace are ignored). Below that, `name` appearing as a run of whole
/// words in the event name scores [`WORD_RUN_SIMILARITY`], so "Coldplay"
/// matches "Coldplay: Music of the Spheres" at the default threshold.
pub fn event_name(name: &str, similarity: f64) -> Predicate {
    let query = normalise_event_name(name);
    let threshold = similarity.clamp(0.0, 1.0);
    Box::new(move |listing| name_similarity(&query, &normalise_event_name(&listing.event.name)) >= threshold)
}

/// Event venue is in one of `regions`. Always true for no regions.
pub fn event_region(regions: &[Region]) -> Predicate {
    let regions = regions.to_vec();
    Box::new(move |listing| {
        regions.is_empty()
            || listing
                .event
                .venue
                .location
                .region()
                .is_some_and(|region| regions.contains(&region))
    })
}

/// Listing has exactly `n` tickets.
pub fn num_tickets(n: u32) -> Predicate {
    Box::new(move |listing| listing.num_tickets == n)
}

/// Discount is at least `discount` (0.1 = 10% off). Listings without discount
/// data never match.
pub fn min_discount(discount: f64) -> Predicate {
    Box::new(move |listing| listing.discount().is_some_and(|d| d >= discount))
}

/// Price of a single ticket including fee is at most `price`. Listings whose
/// per-ticket price cannot be computed, or is in another currency, never match.
pub fn max_ticket_price(price: Price) -> Predicate {
    Box::new(move |listing| {
        listing
            .ticket_price_incl_fee()
            .and_then(|p| p.compare(price))
            .is_ok_and(|ord| ord != Ordering::Greater)
    })
}

/// Similarity of two normalised names in `[0, 1]`. 1 only for equal names.
///
/// Compares `query` with the whole of `name`, and with every run of the same
/// number of words in `name` scaled by [`WORD_RUN_SIMILARITY`], and keeps the
/// best normalised Levenshtein score.
pub fn name_similarity(query: &str, name: &str) -> f64 {
    if query == name {
        return 1.0;
    }
    if query.is_empty() || name.is_empty() {
        return 0.0;
    }
    let words: Vec<&str> = name.split(' ').collect();
    let window = query.split(' ').count();
    let best_window = words
        .windows(window.min(words.len()))
        .map(|run| strsim::normalized_levenshtein(query, &run.join(" ")) * WORD_RUN_SIMILARITY)
        .fold(0.0, f64::max);
    best_window.max(strsim::normalized_levenshtein(query, name))
}

/// Lowercases, spells out `&`, turns punctuation into spaces and collapses whitespace.
pub fn normalise_event_name(name: &str) -> String {
    name.to_lowercase()
        .replace('&', " and ")
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
