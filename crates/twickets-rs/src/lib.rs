//! Twickets Rust SDK
//!
//! Unofficial Rust SDK for the Twickets resale catalogue feed.
//! Fetches ticket listings page by page within a count and/or time bound,
//! decodes them into typed listings and filters them with composable predicates.
//!
//! # Quick Start
//!
//! ```no_run
//! use chrono::{Duration, Utc};
//! use tokio_util::sync::CancellationToken;
//! use twickets_rs::TwicketsClient;
//! use twickets_rs::feed::models::{FetchTicketListingsInput, MaxNumber};
//! use twickets_rs::filter::{self, DEFAULT_EVENT_NAME_SIMILARITY};
//! use twickets_rs::location::Country;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // 1. Create a client with your API key
//! let client = TwicketsClient::new("my_api_key")?;
//!
//! // 2. Fetch the listings created in the last five minutes
//! let listings = client.fetch_ticket_listings(
//!     &CancellationToken::new(),
//!     &FetchTicketListingsInput {
//!         max_number: MaxNumber::Limit(100),
//!         created_after: Some(Utc::now() - Duration::minutes(5)),
//!         ..FetchTicketListingsInput::new(Country::UnitedKingdom)
//!     },
//! ).await?;
//!
//! // 3. Keep the ones you care about
//! let hamilton = filter::filter_ticket_listings(
//!     listings,
//!     &[filter::event_name("Hamilton", DEFAULT_EVENT_NAME_SIMILARITY)],
//! );
//! for listing in &hamilton {
//!     println!("{} {} {}", listing.event.name, listing.discount_string(), listing.url());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Main Components
//!
//! - [`TwicketsClient`] - Client with the feed fetch methods
//! - [`transport::Transport`] - Pluggable HTTP layer, see also [`flaresolverr`]
//!
//! # Modules
//!
//! - [`feed`] - Bounded fetch, feed URL and page decoding
//! - [`listings`] - Ticket listing model and derived prices
//! - [`filter`] - Listing predicates
//! - [`price`] - Fixed-point prices
//! - [`location`] - Countries and regions


// Core modules
pub mod client;         // Main client
pub mod errors;         // Error types
pub mod flaresolverr;   // Anti-bot proxy rewrite
pub(crate) mod helpers; // Internal request helpers
pub mod transport;      // HTTP transport trait


// Domain modules
pub mod feed;           // Feed pages and bounded fetch
pub mod filter;         // Listing predicates
pub mod listings;       // Ticket listing model
pub mod location;       // Countries and regions
pub mod price;          // Fixed-point prices


// Re-exports for convenient access
pub use client::{ClientConfig, TwicketsClient};
pub use errors::TwicketsError;
pub use listings::models::{TicketListing, TicketListings};
pub use price::{Currency, Price};
