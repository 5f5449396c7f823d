//! Hardware Abstraction Layer (HAL) for the stepper driver ASIC
//!
//! This crate defines the register-level access protocol the driver crates
//! are written against. The chip implementation lives in `mdrv-hal-mlx`;
//! the `sim` feature provides a host simulation for tests.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod error;
pub mod interrupt;
pub mod adc;
pub mod gpio;
pub mod driver;

#[cfg(feature = "sim")]
pub mod sim;

// Re-export commonly used types
pub use error::{HalError, HalResult};
pub use interrupt::IrqGroupRegisters;
pub use adc::{AdcChannel, AdcFrontEnd, DmaTarget, ResultSlot, Trigger, VoltageRef};
pub use gpio::AnalogIoPort;
pub use driver::DriverStage;
