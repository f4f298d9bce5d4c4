//! Landmark Relay - proximity-indexed notification fan-out
//!
//! Indexes geo-tagged landmarks for radius queries and fans out push
//! notifications to recipients near a newly created landmark, tolerating
//! transient delivery failures without blocking on slow recipients.
//!
//! ## Services
//!
//! - **Index**: geohash-prefixed landmark storage with radius queries
//! - **Resolver**: recipient filtering by distance to an event location
//! - **Notify**: message composition and bounded-concurrency push delivery
//! - **Fanout**: the landmark-created pipeline wiring the above together
//!
//! The backing record store and the push provider are external seams
//! ([`store::RecordStore`], [`notify::PushProvider`]); an in-memory store is
//! provided for tests and single-node embedding.

pub mod config;
pub mod fanout;
pub mod geo;
pub mod index;
pub mod model;
pub mod notify;
pub mod query;
pub mod resolver;
pub mod store;
pub mod types;

pub use config::RelayConfig;
pub use fanout::{FanoutPipeline, FanoutReport};
pub use types::{RelayError, Result};
