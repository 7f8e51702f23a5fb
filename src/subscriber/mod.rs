//! Display side of the sync protocol
//!
//! A [`SubscriberClient`] drives one display endpoint through the
//! `ColdStart -> Subscribing -> AwaitingContent -> Displaying` state
//! machine: it optimistically renders the last snapshot, subscribes to the
//! screen's topic, asks the publisher for the authoritative content, and
//! keeps polling until it arrives. There is no terminal failure state; the
//! client retries until torn down by its owner.

pub mod client;
pub mod config;

pub use client::{DisplayEvent, DisplayPhase, SubscriberClient};
pub use config::SubscriberConfig;
