//! Listings module models.
//!
//! This module contains the decoded ticket listing and the values derived from it
//! (per-ticket prices, fees, discount, listing URL).

use chrono::{DateTime, Utc};
use derive_more::{Deref, Display, From};
use serde::{Deserialize, Serialize};

use crate::helpers::unix_millis;
use crate::location::Region;
use crate::price::{Price, PriceError};

const LISTING_URL: &str = "https://www.twickets.live/app/block/";

/// A listing of ticket(s) on Twickets.
///
/// Listings are only ever produced by decoding a feed page and are never mutated
/// afterwards. Everything that is not stored on the wire (per-ticket prices,
/// discount, URL) is computed on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[display("{} x{} [{}]", event.name, num_tickets, id)]
pub struct TicketListing {
    #[serde(rename = "blockId")]
    pub id: String,
    #[serde(rename = "created", with = "unix_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "expires", with = "unix_millis", default)]
    pub expires_at: DateTime<Utc>,

    /// Number of tickets in the listing.
    #[serde(rename = "ticketQuantity", default)]
    pub num_tickets: u32,

    /// Total price of all tickets, excluding fee.
    #[serde(rename = "totalSellingPrice", default)]
    pub total_price_excl_fee: Price,
    /// Total Twickets fee for all tickets.
    #[serde(rename = "totalTwicketsFee", default)]
    pub twickets_fee: Price,
    /// Original (face value) total price of all tickets, including any fee.
    #[serde(rename = "faceValuePrice", default)]
    pub original_total_price: Price,

    #[serde(rename = "sellerWillConsiderOffers", default)]
    pub seller_will_consider_offers: bool,

    /// Type of the ticket, e.g. Seated, Standing, Box.
    #[serde(rename = "priceTier", default)]
    pub ticket_type: String,
    #[serde(rename = "seatAssigned", default)]
    pub seat_assigned: bool,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub row: String,

    #[serde(default)]
    pub event: Event,
    #[serde(default)]
    pub tour: Tour,
}

impl TicketListing {
    /// Public URL of the listing.
    ///
    /// Format is `https://www.twickets.live/app/block/<id>,<quantity>`.
    pub fn url(&self) -> String {
        format!("{}{},{}", LISTING_URL, self.id, self.num_tickets)
    }

    /// Total price of all tickets, including fee.
    pub fn total_price_incl_fee(&self) -> Result<Price, PriceError> {
        self.total_price_excl_fee.add(self.twickets_fee)
    }

    /// Price of a single ticket, excluding fee.
    pub fn ticket_price_excl_fee(&self) -> Result<Price, PriceError> {
        self.total_price_excl_fee.divide(self.num_tickets)
    }

    /// Price of a single ticket, including fee.
    pub fn ticket_price_incl_fee(&self) -> Result<Price, PriceError> {
        self.total_price_incl_fee()?.divide(self.num_tickets)
    }

    /// Twickets fee per ticket.
    pub fn twickets_fee_per_ticket(&self) -> Result<Price, PriceError> {
        self.twickets_fee.divide(self.num_tickets)
    }

    /// Original price of a single ticket, including any fee.
    pub fn original_ticket_price(&self) -> Result<Price, PriceError> {
        self.original_total_price.divide(self.num_tickets)
    }

    /// Discount on the original price, as `1 - total_incl_fee / original_total`.
    ///
    /// 1 means 100% off. A listing sold at face value ends up below 0 once the
    /// Twickets fee is added. `None` when there is no face value to compare
    /// against or the prices are in different currencies.
    pub fn discount(&self) -> Option<f64> {
        if self.original_total_price.is_zero() {
            return None;
        }
        let total = self.total_price_incl_fee().ok()?;
        if total.currency != self.original_total_price.currency {
            return None;
        }
        Some(1.0 - total.number() / self.original_total_price.number())
    }

    /// Discount as a percentage string with two decimals, e.g. `12.50%`.
    ///
    /// `"none"` when the price is above face value, `"unknown"` when there is no
    /// discount data.
    pub fn discount_string(&self) -> String {
        match self.discount() {
            None => "unknown".to_string(),
            Some(d) if d < 0.0 => "none".to_string(),
            Some(d) => format!("{:.2}%", d * 100.0),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[display("{name} ({id})")]
pub struct Event {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "eventName", default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub venue: Venue,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: Location,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "regionCode", default)]
    pub region_code: String,
}

impl Location {
    /// The region, if the code is one the feed is known to use.
    pub fn region(&self) -> Option<Region> {
        self.region_code.parse().ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[display("{name}")]
pub struct Tour {
    #[serde(rename = "tourId", default)]
    pub id: String,
    #[serde(rename = "tourName", default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(rename = "countryCode", default)]
    pub country_code: String,
}

/// Ordered listings, newest first as received from the feed.
///
/// Ids are not guaranteed to be unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Deref, From)]
pub struct TicketListings(Vec<TicketListing>);

impl TicketListings {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    pub fn push(&mut self, listing: TicketListing) {
        self.0.push(listing);
    }

    pub fn append(&mut self, other: TicketListings) {
        self.0.extend(other.0);
    }

    /// First listing with a matching id.
    pub fn get_by_id(&self, id: &str) -> Option<&TicketListing> {
        self.0.iter().find(|l| l.id == id)
    }

    pub fn into_vec(self) -> Vec<TicketListing> {
        self.0
    }
}

impl FromIterator<TicketListing> for TicketListings {
    fn from_iter<I: IntoIterator<Item = TicketListing>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for TicketListings {
    type Item = TicketListing;
    type IntoIter = std::vec::IntoIter<TicketListing>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a TicketListings {
    type Item = &'a TicketListing;
    type IntoIter = std::slice::Iter<'a, TicketListing>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
