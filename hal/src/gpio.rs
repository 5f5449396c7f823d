//! Analog I/O pin abstraction
//!
//! The high-voltage I/O pins double as ADC inputs, which lets firmware
//! drive a level and read it back through the converter.

use crate::error::HalResult;

/// GPIO pin levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Low level (0V)
    Low,
    /// High level (VCC)
    High,
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Output enable and output level registers of the analog I/O pins
pub trait AnalogIoPort {
    /// Number of pins on the port
    fn pin_count(&self) -> u8;

    /// Check if the pin drives its output
    fn output_enabled(&self, pin: u8) -> HalResult<bool>;

    /// Enable or disable the output driver of a pin
    fn set_output_enabled(&mut self, pin: u8, enabled: bool) -> HalResult<()>;

    /// Read the programmed output level
    fn output_level(&self, pin: u8) -> HalResult<Level>;

    /// Program the output level
    fn set_output_level(&mut self, pin: u8, level: Level) -> HalResult<()>;
}
