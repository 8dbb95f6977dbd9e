//! `snek_client`
//!
//! Client-side systems:
//! - Session driver: metadata negotiation, tick decoding, game-over handling
//! - Frame presentation at a throttled cadence
//! - Headless renderer that reports frames through `tracing`

pub mod client;
pub mod present;

pub use client::SnekClient;
pub use present::{GameSummary, Presenter, TraceRenderer};
