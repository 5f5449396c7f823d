#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

//! # mdrv core
//!
//! Types shared by the interrupt controller and the ADC engine: the common
//! error type, the diagnostic error codes handed to the communication stack,
//! and the electrical fault state recorded by the power-up self-test.

use core::fmt;

pub mod diagnostics;
pub mod fault;

pub use diagnostics::*;
pub use fault::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type used throughout the driver crates
pub type MdrvResult<T> = Result<T, MdrvError>;

/// Error types for driver operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MdrvError {
    /// Bit index outside the source count of its interrupt group
    InvalidSource,
    /// The ADC sequencer is running and cannot be reconfigured
    SequencerBusy,
    /// Retrigger requested before any sequence was configured
    NotConfigured,
    /// Sequence table without entries or without end-of-table marker
    InvalidTable,
}

impl fmt::Display for MdrvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MdrvError::InvalidSource => write!(f, "Interrupt source outside its group"),
            MdrvError::SequencerBusy => write!(f, "ADC sequencer is busy"),
            MdrvError::NotConfigured => write!(f, "No ADC sequence configured"),
            MdrvError::InvalidTable => write!(f, "Malformed ADC sequence table"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MdrvError {}

#[cfg(feature = "defmt")]
impl defmt::Format for MdrvError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            MdrvError::InvalidSource => defmt::write!(fmt, "InvalidSource"),
            MdrvError::SequencerBusy => defmt::write!(fmt, "SequencerBusy"),
            MdrvError::NotConfigured => defmt::write!(fmt, "NotConfigured"),
            MdrvError::InvalidTable => defmt::write!(fmt, "InvalidTable"),
        }
    }
}
