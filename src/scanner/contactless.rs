//! Contactless scanner backend (MFRC522 over SPI)
//!
//! Opens the configured SPI bus at a fixed 1 MHz clock in mode 0 plus a
//! reset GPIO line. Open failure is fatal to this backend's activation; any
//! per-attempt error afterwards is logged by the coordinator and retried
//! next tick. After a successful read the card is halted and the loop is
//! asked for a longer cool-down so a card resting on the reader does not
//! re-trigger, on top of the debounce layer.

use crate::scanner::backend::{format_tag_bytes, RawTag, ScannerBackend};
use crate::scanner::error::{ScanError, ScanResult};
use crate::scanner::mfrc522::Mfrc522;
use rppal::gpio::Gpio;
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use std::time::Duration;

const SPI_CLOCK_HZ: u32 = 1_000_000;

/// Delay after a successful read before polling resumes
const READ_COOLDOWN: Duration = Duration::from_millis(1500);

pub struct ContactlessBackend {
    chip: Option<Mfrc522>,
    bus_id: u8,
    chip_select_line: u8,
    reset_pin: u8,
}

impl ContactlessBackend {
    pub fn open(bus_id: u8, chip_select_line: u8, reset_pin: u8) -> ScanResult<Self> {
        let bus = match bus_id {
            0 => Bus::Spi0,
            1 => Bus::Spi1,
            2 => Bus::Spi2,
            other => {
                return Err(ScanError::hardware(format!(
                    "unsupported SPI bus id {other} (expected 0, 1 or 2)"
                )))
            }
        };
        let slave_select = match chip_select_line {
            0 => SlaveSelect::Ss0,
            1 => SlaveSelect::Ss1,
            2 => SlaveSelect::Ss2,
            other => {
                return Err(ScanError::hardware(format!(
                    "unsupported chip-select line {other} (expected 0, 1 or 2)"
                )))
            }
        };

        let spi = Spi::new(bus, slave_select, SPI_CLOCK_HZ, Mode::Mode0)?;
        let reset = Gpio::new()?.get(reset_pin)?.into_output();
        let chip = Mfrc522::new(spi, reset)?;

        log::info!(
            "MFRC522 reader initialized on SPI bus {}, CS {}, RST pin {}",
            bus_id,
            chip_select_line,
            reset_pin
        );

        Ok(Self {
            chip: Some(chip),
            bus_id,
            chip_select_line,
            reset_pin,
        })
    }
}

impl ScannerBackend for ContactlessBackend {
    fn read_once(&mut self, timeout: Duration) -> ScanResult<Option<RawTag>> {
        let chip = self.chip.as_mut().ok_or_else(|| ScanError::Disabled {
            message: "MFRC522 already released".to_string(),
        })?;

        if !chip.card_present(timeout)? {
            return Ok(None);
        }

        let uid = match chip.read_uid(timeout)? {
            Some(uid) if !uid.is_empty() => uid,
            _ => return Ok(None),
        };

        let tag = format_tag_bytes(&uid);

        // Halt the card so it stops answering REQA while it sits on the pad
        if let Err(e) = chip.halt() {
            log::debug!("HLTA after read failed (card likely removed): {e}");
        }

        Ok(Some(tag))
    }

    fn close(&mut self) {
        if let Some(mut chip) = self.chip.take() {
            chip.power_down();
            log::debug!(
                "Released MFRC522 on SPI bus {}, CS {}",
                self.bus_id,
                self.chip_select_line
            );
        }
    }

    fn description(&self) -> String {
        format!(
            "MFRC522 on SPI bus {}, CS {}, RST pin {}",
            self.bus_id, self.chip_select_line, self.reset_pin
        )
    }

    fn cooldown(&self) -> Duration {
        READ_COOLDOWN
    }
}

impl Drop for ContactlessBackend {
    fn drop(&mut self) {
        self.close();
    }
}
