//! watcher.rs
//!
//! Polls the feed on a fixed interval.
//!
//! - Each poll asks for the listings created since the previous poll started
//!   (the first poll looks back `cfg.lookback`).
//! - Fetched listings go through the configured filters and every match is logged.
//! - A failed poll is logged and its window is retried on the next tick, so
//!   nothing listed in between is missed.

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use twickets_rs::feed::models::{FetchTicketListingsInput, MaxNumber};
use twickets_rs::filter::{self, Predicate};
use twickets_rs::{TwicketsClient, TwicketsError};

use crate::config::Config;
use crate::report;

/// Filters built from the config. Event names are OR-ed, everything else AND-ed.
pub fn build_predicates(cfg: &Config) -> Vec<Predicate> {
    let mut predicates = Vec::new();

    if !cfg.event_names.is_empty() {
        let names = cfg
            .event_names
            .iter()
            .map(|name| filter::event_name(name, cfg.event_name_similarity))
            .collect();
        predicates.push(filter::any_of(names));
    }
    if !cfg.regions.is_empty() {
        predicates.push(filter::event_region(&cfg.regions));
    }
    if let Some(n) = cfg.num_tickets {
        predicates.push(filter::num_tickets(n));
    }
    if let Some(discount) = cfg.min_discount {
        predicates.push(filter::min_discount(discount));
    }
    predicates
}

/// Main loop: runs until `cancel` fires.
pub async fn run_watcher(cfg: Config, client: TwicketsClient, cancel: CancellationToken) -> Result<()> {
    let predicates = build_predicates(&cfg);
    let lookback = chrono::Duration::from_std(cfg.lookback)?;

    // Windows are (created_after, poll start], so consecutive polls never overlap.
    let mut created_after: DateTime<Utc> = Utc::now() - lookback;
    let mut reported = 0usize;

    let mut interval = time::interval(cfg.poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        country = %cfg.country,
        every_secs = cfg.poll_interval.as_secs(),
        filters = predicates.len(),
        flaresolverr = cfg.flaresolverr_url.is_some(),
        "watching for listings"
    );

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        let poll_started = Utc::now();
        let input = FetchTicketListingsInput {
            regions: cfg.regions.clone(),
            max_number: MaxNumber::Limit(cfg.max_per_poll),
            created_after: Some(created_after),
            created_before: Some(poll_started),
            ..FetchTicketListingsInput::new(cfg.country)
        };

        let listings = match client.fetch_ticket_listings(&cancel, &input).await {
            Ok(listings) => listings,
            Err(TwicketsError::Cancelled) => break,
            Err(e) => {
                warn!(error = %e, since = %created_after, "poll failed, retrying next tick");
                continue;
            }
        };

        let fetched = listings.len();
        if fetched == cfg.max_per_poll {
            warn!(max = cfg.max_per_poll, "poll hit the per-poll limit, older listings in the window were skipped");
        }

        let matches = filter::filter_ticket_listings(listings, &predicates);
        for listing in &matches {
            report::log_listing(listing);
        }
        reported += matches.len();
        debug!(fetched, matched = matches.len(), since = %created_after, "poll complete");

        created_after = poll_started;
    }

    info!(reported, "watcher stopped");
    Ok(())
}
