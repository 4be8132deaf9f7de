//! ScannerBackend capability trait
//!
//! Vendor hardware access lives behind this small interface so the
//! coordinator never touches a device API directly, and tests can drive the
//! scan loop with a scripted fake instead of real hardware.

use crate::scanner::error::ScanResult;
use std::time::Duration;

/// A raw tag identifier as produced by a backend.
///
/// Serial backends yield the trimmed line verbatim; byte-oriented backends
/// canonicalize to uppercase hex with no separators.
pub type RawTag = String;

/// One physical RFID interface producing raw tag reads.
///
/// Construction doubles as the `open` step: each concrete backend exposes an
/// `open(params)` constructor and arrives here already connected. `read_once`
/// must return within roughly the given timeout so the scan loop stays
/// responsive to cancellation.
pub trait ScannerBackend: Send {
    /// Attempt a single read. `Ok(None)` means no tag this cycle.
    fn read_once(&mut self, timeout: Duration) -> ScanResult<Option<RawTag>>;

    /// Release the underlying handle. Must be safe to call more than once.
    fn close(&mut self);

    /// Human-readable description for the status surface
    fn description(&self) -> String;

    /// Extra delay after a successful read, before polling resumes.
    ///
    /// The contactless reader needs this so a card left on the pad does not
    /// re-trigger; it stacks with the debounce window.
    fn cooldown(&self) -> Duration {
        Duration::ZERO
    }
}

/// Canonical form for byte-oriented tag identifiers: uppercase hex, no
/// separators.
pub fn format_tag_bytes(bytes: &[u8]) -> RawTag {
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}
