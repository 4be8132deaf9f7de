//! Scanner API
//!
//! Public interface for the scanner system, consolidating all external
//! exports. This follows the same pattern as the notifications::api and
//! mappings::api modules to keep a consistent architecture across the
//! application.

// Coordinator
pub use crate::scanner::manager::ScannerManager;

// Capability trait for alternative backends and test fakes
pub use crate::scanner::backend::{format_tag_bytes, RawTag, ScannerBackend};

// Error handling
pub use crate::scanner::error::{ScanError, ScanResult};

// Configuration and status types
pub use crate::scanner::types::{BackendKind, ScannerConfig, ScannerStatus};
