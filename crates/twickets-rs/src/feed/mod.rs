//! Feed module.
//!
//! Page decoding, feed URL construction and the bounded multi-page fetch.

pub mod endpoints;
pub mod models;
