//! Scanner configuration and status types

use serde::Deserialize;
use std::time::Duration;

/// Minimum time before the same tag identifier is treated as a new event
pub const DEBOUNCE_WINDOW: Duration = Duration::from_secs(2);

/// Idle delay between poll cycles
pub const IDLE_TICK: Duration = Duration::from_millis(100);

/// Per-attempt bound on a single card-present query / line read. Also bounds
/// worst-case responsiveness to a stop request.
pub const READ_TIMEOUT: Duration = Duration::from_millis(200);

/// Delay after a per-attempt hardware error before polling resumes
pub const ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Which physical interface produces raw tag reads
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Line-oriented reader on a serial device
    Serial,
    /// SPI-attached contactless reader chip (MFRC522)
    Contactless,
}

/// Scanner configuration resolved from the config file and CLI
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScannerConfig {
    /// Master switch; `false` skips hardware probing entirely
    pub enabled: bool,
    #[serde(rename = "type")]
    pub backend: BackendKind,
    /// SPI bus index (contactless)
    pub bus_id: u8,
    /// SPI chip-select line (contactless)
    pub chip_select_line: u8,
    /// BCM pin driving the reader's reset line (contactless)
    pub reset_pin: u8,
    /// Candidate device paths, tried in order (serial)
    pub serial_ports: Vec<String>,
    /// Baud rate; the line is always 8N1 (serial)
    pub baud_rate: u32,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: BackendKind::Contactless,
            bus_id: 0,
            chip_select_line: 0,
            reset_pin: 25,
            serial_ports: vec![
                "/dev/ttyUSB0".to_string(),
                "/dev/ttyUSB1".to_string(),
                "/dev/ttyACM0".to_string(),
                "/dev/ttyACM1".to_string(),
            ],
            baud_rate: 9600,
        }
    }
}

/// Snapshot of the coordinator's connection state for the status surface
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannerStatus {
    pub connected: bool,
    pub details: String,
}
