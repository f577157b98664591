//! Spaced-repetition vocabulary engine: SM-2 style scheduling, daily word
//! mixes, day-scoped drill caching, and study plan pacing, persisted in sled.

pub mod config;
pub mod constants;
pub mod logging;
pub mod services;
pub mod store;
