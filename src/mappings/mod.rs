//! Tag-to-target mapping store
//!
//! Durable table associating RFID tag identifiers with playback targets
//! (video file paths). Source of truth for tag resolution.

pub(crate) mod error;
pub(crate) mod store;

pub mod api;
