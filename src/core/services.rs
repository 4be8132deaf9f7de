//! Service Registry Re-exports
//!
//! Re-exports service access functions from their respective modules.
//! Services live in their domain modules; this is the single import point
//! for cross-subsystem wiring.

pub use crate::notifications::api::get_notification_service;
