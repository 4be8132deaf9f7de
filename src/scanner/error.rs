//! Scanner Error Types
//!
//! All scanner failures are non-fatal to the host process: hardware faults
//! degrade the engine to disabled, per-attempt read errors are retried next
//! tick. Nothing here is allowed to terminate the application.

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Device absent, open failure, bus or timing fault
    #[error("hardware error: {message}")]
    Hardware { message: String },

    /// Operation attempted against a backend that never activated
    #[error("scanner disabled: {message}")]
    Disabled { message: String },

    /// IO failure on an open handle
    #[error("IO error: {message}")]
    Io { message: String },
}

impl ScanError {
    pub fn hardware(message: impl Into<String>) -> Self {
        ScanError::Hardware {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ScanError {
    fn from(e: std::io::Error) -> Self {
        ScanError::Io {
            message: e.to_string(),
        }
    }
}

impl From<serialport::Error> for ScanError {
    fn from(e: serialport::Error) -> Self {
        ScanError::Hardware {
            message: e.to_string(),
        }
    }
}

impl From<rppal::spi::Error> for ScanError {
    fn from(e: rppal::spi::Error) -> Self {
        ScanError::Hardware {
            message: format!("SPI: {e}"),
        }
    }
}

impl From<rppal::gpio::Error> for ScanError {
    fn from(e: rppal::gpio::Error) -> Self {
        ScanError::Hardware {
            message: format!("GPIO: {e}"),
        }
    }
}

impl crate::core::error_handling::ContextualError for ScanError {
    fn is_user_actionable(&self) -> bool {
        false // Hardware and IO issues, not user mistakes
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}

pub type ScanResult<T> = Result<T, ScanError>;
