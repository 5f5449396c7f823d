//! Common error types for HAL operations

use core::fmt;

/// HAL operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    /// Bit index beyond the 16-bit register width
    InvalidBit(u8),
    /// Channel number not present in the analog multiplexer
    InvalidChannel(u8),
    /// Analog I/O pin number out of range
    InvalidPin(u8),
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBit(bit) => write!(f, "invalid register bit: {}", bit),
            Self::InvalidChannel(ch) => write!(f, "invalid ADC channel: {}", ch),
            Self::InvalidPin(pin) => write!(f, "invalid IO pin: {}", pin),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

#[cfg(feature = "defmt")]
impl defmt::Format for HalError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::InvalidBit(bit) => defmt::write!(fmt, "InvalidBit({})", bit),
            Self::InvalidChannel(ch) => defmt::write!(fmt, "InvalidChannel({})", ch),
            Self::InvalidPin(pin) => defmt::write!(fmt, "InvalidPin({})", pin),
        }
    }
}

/// Result type for HAL operations
pub type HalResult<T> = Result<T, HalError>;
