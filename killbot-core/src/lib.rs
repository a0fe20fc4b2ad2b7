//! Domain types for the kill notification bot.
//!
//! These are plain value objects: the persistence layer (`killbot-db`)
//! creates them on load and translates caller mutations back into rows.

pub mod organization;

pub use organization::{EventCategory, IgnoredRegion, Organization};
