//! Analog I/O port registers

use mdrv_hal::error::{HalError, HalResult};
use mdrv_hal::gpio::{AnalogIoPort, Level};
use tock_registers::interfaces::{Readable, Writeable};

use crate::registers::{AnalogIoBlock, MmioRef};

/// Number of high-voltage I/O pins
pub const PIN_COUNT: u8 = 6;

/// Analog I/O port
pub struct MlxIo {
    regs: MmioRef<AnalogIoBlock>,
}

impl MlxIo {
    /// Wrap a register block
    pub const fn new(regs: MmioRef<AnalogIoBlock>) -> Self {
        Self { regs }
    }

    fn bit(pin: u8) -> HalResult<u16> {
        if pin < PIN_COUNT {
            Ok(1 << pin)
        } else {
            Err(HalError::InvalidPin(pin))
        }
    }
}

impl AnalogIoPort for MlxIo {
    fn pin_count(&self) -> u8 {
        PIN_COUNT
    }

    fn output_enabled(&self, pin: u8) -> HalResult<bool> {
        let bit = Self::bit(pin)?;
        Ok(self.regs.outf.get() & bit != 0)
    }

    fn set_output_enabled(&mut self, pin: u8, enabled: bool) -> HalResult<()> {
        let bit = Self::bit(pin)?;
        let value = self.regs.outf.get();
        self.regs
            .outf
            .set(if enabled { value | bit } else { value & !bit });
        Ok(())
    }

    fn output_level(&self, pin: u8) -> HalResult<Level> {
        let bit = Self::bit(pin)?;
        Ok(Level::from(self.regs.outn.get() & bit != 0))
    }

    fn set_output_level(&mut self, pin: u8, level: Level) -> HalResult<()> {
        let bit = Self::bit(pin)?;
        let value = self.regs.outn.get();
        self.regs.outn.set(match level {
            Level::High => value | bit,
            Level::Low => value & !bit,
        });
        Ok(())
    }
}
