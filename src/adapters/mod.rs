//! Adapter implementations for port traits.
//!
//! - `live/` — Real HTTP services and the system browser
//! - `recording/` — Record interactions to cassettes
//! - `replaying/` — Replay interactions from cassettes

pub mod live;
pub mod recording;
pub mod replaying;
