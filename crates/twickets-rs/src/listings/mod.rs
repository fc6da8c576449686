//! Listings module.

pub mod models;
