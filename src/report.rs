use tracing::{info, warn};

use twickets_rs::price::PriceError;
use twickets_rs::{Price, TicketListing};

fn price_or_unknown(price: Result<Price, PriceError>) -> String {
    match price {
        Ok(p) => p.to_string(),
        Err(_) => "unknown".to_string(),
    }
}

pub fn log_listing(listing: &TicketListing) {
    if listing.num_tickets == 0 {
        warn!(id = %listing.id, event = %listing.event.name, "listing has no tickets");
    }

    info!(
        id = %listing.id,
        event = %listing.event.name,
        venue = %listing.event.venue.name,
        region = %listing.event.venue.location.region_code,
        created = %listing.created_at,
        tickets = listing.num_tickets,
        ticket_type = %listing.ticket_type,
        price_per_ticket = %price_or_unknown(listing.ticket_price_incl_fee()),
        total = %price_or_unknown(listing.total_price_incl_fee()),
        original_per_ticket = %price_or_unknown(listing.original_ticket_price()),
        discount = %listing.discount_string(),
        url = %listing.url(),
        "matching listing"
    );
}
