//! RFID Scanner Component
//!
//! Turns raw reads from one physical RFID interface into debounced
//! tag-detected events published through the notification system.
//!
//! ## Core pieces
//!
//! - **ScannerBackend**: capability trait over the concrete hardware
//!   interface, with serial-line and contactless (SPI reader chip) variants.
//!   A third backend slots in without touching the coordinator.
//! - **DebounceFilter**: suppresses duplicate reads of the same physical tap
//!   within a fixed window; a different tag passes immediately.
//! - **ScannerManager**: owns the backend and the scan loop lifecycle
//!   (initialize / start / stop / dispose) and is the only piece driven by a
//!   background task.

pub(crate) mod backend;
pub(crate) mod contactless;
pub(crate) mod debounce;
pub(crate) mod error;
pub(crate) mod manager;
pub(crate) mod mfrc522;
pub(crate) mod serial;
pub(crate) mod types;

pub mod api;
