//! Minimal MFRC522 register driver
//!
//! Just enough of the chip protocol for the scan loop: card-present query
//! (REQA), single-cascade anticollision to obtain the UID, HLTA to silence a
//! card after a read, and the chip's CRC coprocessor for the HLTA frame.
//! Cards with 7- or 10-byte UIDs report their first cascade level; the
//! identifier is still stable per card, which is all the mapping layer
//! needs.

use crate::scanner::error::{ScanError, ScanResult};
use rppal::gpio::OutputPin;
use rppal::spi::Spi;
use std::time::{Duration, Instant};

// Register addresses (datasheet section 9)
const COMMAND_REG: u8 = 0x01;
const COM_IRQ_REG: u8 = 0x04;
const DIV_IRQ_REG: u8 = 0x05;
const ERROR_REG: u8 = 0x06;
const FIFO_DATA_REG: u8 = 0x09;
const FIFO_LEVEL_REG: u8 = 0x0A;
const BIT_FRAMING_REG: u8 = 0x0D;
const MODE_REG: u8 = 0x11;
const TX_CONTROL_REG: u8 = 0x14;
const TX_ASK_REG: u8 = 0x15;
const CRC_RESULT_REG_H: u8 = 0x21;
const CRC_RESULT_REG_L: u8 = 0x22;
const T_MODE_REG: u8 = 0x2A;
const T_PRESCALER_REG: u8 = 0x2B;
const T_RELOAD_REG_H: u8 = 0x2C;
const T_RELOAD_REG_L: u8 = 0x2D;
const VERSION_REG: u8 = 0x37;

// Chip commands
const CMD_IDLE: u8 = 0x00;
const CMD_CALC_CRC: u8 = 0x03;
const CMD_TRANSCEIVE: u8 = 0x0C;
const CMD_SOFT_RESET: u8 = 0x0F;

// ComIrqReg bits
const IRQ_TIMER: u8 = 0x01;
const IRQ_IDLE: u8 = 0x10;
const IRQ_RX: u8 = 0x20;

// ErrorReg bits: BufferOvfl | ParityErr | ProtocolErr
const ERROR_MASK: u8 = 0x13;

// ISO 14443-3 Type A frames
const PICC_REQA: u8 = 0x26;
const PICC_SEL_CL1: u8 = 0x93;
const PICC_NVB_ANTICOLL: u8 = 0x20;
const PICC_HLTA: u8 = 0x50;

pub struct Mfrc522 {
    spi: Spi,
    reset: OutputPin,
}

impl Mfrc522 {
    /// Take ownership of an open SPI handle and reset line, bring the chip
    /// out of reset and configure it for 14443-A transceive.
    pub fn new(spi: Spi, mut reset: OutputPin) -> ScanResult<Self> {
        reset.set_high();
        std::thread::sleep(Duration::from_millis(50));

        let mut chip = Self { spi, reset };
        chip.init()?;
        Ok(chip)
    }

    fn init(&mut self) -> ScanResult<()> {
        self.write_reg(COMMAND_REG, CMD_SOFT_RESET)?;
        std::thread::sleep(Duration::from_millis(50));

        // Timer: ~25ms timeout on card responses (TAuto, prescaler 0x0D3E,
        // reload 30)
        self.write_reg(T_MODE_REG, 0x8D)?;
        self.write_reg(T_PRESCALER_REG, 0x3E)?;
        self.write_reg(T_RELOAD_REG_H, 0x00)?;
        self.write_reg(T_RELOAD_REG_L, 0x1E)?;
        // 100% ASK modulation, CRC preset 0x6363
        self.write_reg(TX_ASK_REG, 0x40)?;
        self.write_reg(MODE_REG, 0x3D)?;

        self.antenna_on()?;

        let version = self.read_reg(VERSION_REG)?;
        if version == 0x00 || version == 0xFF {
            return Err(ScanError::hardware(format!(
                "MFRC522 not responding on SPI (version register reads {version:#04X})"
            )));
        }
        log::debug!("MFRC522 version register: {version:#04X}");

        Ok(())
    }

    fn antenna_on(&mut self) -> ScanResult<()> {
        let control = self.read_reg(TX_CONTROL_REG)?;
        if control & 0x03 != 0x03 {
            self.write_reg(TX_CONTROL_REG, control | 0x03)?;
        }
        Ok(())
    }

    /// Issue REQA. `Ok(true)` means a card in the field answered.
    pub fn card_present(&mut self, timeout: Duration) -> ScanResult<bool> {
        // REQA is a short frame: 7 valid bits in the last byte
        match self.transceive(&[PICC_REQA], 7, timeout)? {
            Some(atqa) if atqa.len() == 2 => Ok(true),
            Some(_) => Ok(false),
            None => Ok(false),
        }
    }

    /// Run anticollision cascade level 1 and return the 4-byte UID.
    pub fn read_uid(&mut self, timeout: Duration) -> ScanResult<Option<Vec<u8>>> {
        let response =
            match self.transceive(&[PICC_SEL_CL1, PICC_NVB_ANTICOLL], 0, timeout)? {
                Some(r) => r,
                None => return Ok(None),
            };

        if response.len() != 5 {
            return Err(ScanError::hardware(format!(
                "anticollision returned {} bytes, expected 5",
                response.len()
            )));
        }

        let bcc = response[0] ^ response[1] ^ response[2] ^ response[3];
        if bcc != response[4] {
            return Err(ScanError::hardware("UID checksum (BCC) mismatch"));
        }

        Ok(Some(response[..4].to_vec()))
    }

    /// HLTA: silence the selected card so it stops answering REQA until it
    /// leaves and re-enters the field.
    pub fn halt(&mut self) -> ScanResult<()> {
        let mut frame = vec![PICC_HLTA, 0x00];
        let crc = self.calc_crc(&frame)?;
        frame.extend_from_slice(&crc);

        // A card that obeys HLTA sends no response; absence of a reply is
        // the success case here.
        self.transceive(&frame, 0, Duration::from_millis(50))?;
        Ok(())
    }

    /// Transceive a frame and collect the card's response.
    ///
    /// Returns `Ok(None)` when no card answered within the chip timer or
    /// the given deadline.
    fn transceive(
        &mut self,
        data: &[u8],
        tx_last_bits: u8,
        timeout: Duration,
    ) -> ScanResult<Option<Vec<u8>>> {
        self.write_reg(COMMAND_REG, CMD_IDLE)?;
        self.write_reg(COM_IRQ_REG, 0x7F)?; // clear all IRQ flags
        self.write_reg(FIFO_LEVEL_REG, 0x80)?; // flush FIFO

        for &byte in data {
            self.write_reg(FIFO_DATA_REG, byte)?;
        }

        self.write_reg(COMMAND_REG, CMD_TRANSCEIVE)?;
        // StartSend plus the number of valid bits in the last byte
        self.write_reg(BIT_FRAMING_REG, 0x80 | (tx_last_bits & 0x07))?;

        let deadline = Instant::now() + timeout;
        loop {
            let irq = self.read_reg(COM_IRQ_REG)?;
            if irq & (IRQ_RX | IRQ_IDLE) != 0 {
                break;
            }
            if irq & IRQ_TIMER != 0 {
                // Chip timer expired: nothing in the field answered
                return Ok(None);
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            std::thread::sleep(Duration::from_millis(1));
        }

        let error = self.read_reg(ERROR_REG)?;
        if error & ERROR_MASK != 0 {
            return Err(ScanError::hardware(format!(
                "transceive error flags {error:#04X}"
            )));
        }

        let level = self.read_reg(FIFO_LEVEL_REG)?;
        let mut response = Vec::with_capacity(level as usize);
        for _ in 0..level {
            response.push(self.read_reg(FIFO_DATA_REG)?);
        }

        Ok(Some(response))
    }

    /// Run the chip's CRC_A coprocessor over a frame.
    fn calc_crc(&mut self, data: &[u8]) -> ScanResult<[u8; 2]> {
        self.write_reg(COMMAND_REG, CMD_IDLE)?;
        self.write_reg(DIV_IRQ_REG, 0x04)?; // clear CRCIRq
        self.write_reg(FIFO_LEVEL_REG, 0x80)?;

        for &byte in data {
            self.write_reg(FIFO_DATA_REG, byte)?;
        }
        self.write_reg(COMMAND_REG, CMD_CALC_CRC)?;

        let deadline = Instant::now() + Duration::from_millis(50);
        loop {
            let irq = self.read_reg(DIV_IRQ_REG)?;
            if irq & 0x04 != 0 {
                break;
            }
            if Instant::now() >= deadline {
                return Err(ScanError::hardware("CRC coprocessor timeout"));
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        self.write_reg(COMMAND_REG, CMD_IDLE)?;

        Ok([
            self.read_reg(CRC_RESULT_REG_L)?,
            self.read_reg(CRC_RESULT_REG_H)?,
        ])
    }

    /// Drive the reset line low, powering the analog part down.
    pub fn power_down(&mut self) {
        self.reset.set_low();
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> ScanResult<()> {
        // Address byte: bit 7 = 0 for write, address in bits 6..1
        let frame = [(reg << 1) & 0x7E, value];
        let mut discard = [0u8; 2];
        self.spi.transfer(&mut discard, &frame)?;
        Ok(())
    }

    fn read_reg(&mut self, reg: u8) -> ScanResult<u8> {
        // Address byte: bit 7 = 1 for read
        let frame = [((reg << 1) & 0x7E) | 0x80, 0x00];
        let mut response = [0u8; 2];
        self.spi.transfer(&mut response, &frame)?;
        Ok(response[1])
    }
}
