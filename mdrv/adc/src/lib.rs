#![no_std]
#![forbid(unsafe_code)]

//! # mdrv ADC
//!
//! Table-driven acquisition for the stepper driver: a sequencer that runs
//! static channel tables on firmware or PWM triggers, the record the
//! front end writes its results to, and the calibration and conversion of
//! those results into volts, amperes and degrees.
//!
//! ## Example
//!
//! ```ignore
//! static RECORD: ResultsRecord = ResultsRecord::new();
//!
//! let mut adc = AdcDriver::new(p.adc, delay, p.io, p.driver, &RECORD, AdcConfig::default());
//! let fault = adc.init(&mut error_log);
//! adc.start(Topology::DoubleMirror, PhaseMode::Index(0))?;
//! let current = adc.get_motor_current_scaled();
//! ```

// Logging macros; declared first so later modules can use them.
pub(crate) mod fmt;

pub mod calibration;
pub mod config;
pub mod convert;
pub mod driver;
pub mod record;
pub mod sequencer;
pub mod table;

pub use calibration::{CalibrationParams, CalibrationState, SelfTestLimits};
pub use config::{AdcConfig, MotorConfig, TimingConfig};
pub use convert::{TemperatureModel, TemperatureTrim};
pub use driver::AdcDriver;
pub use record::{Field, RecordLayout, ResultsRecord, SelfTestPass, SelfTestRecord};
pub use sequencer::{Mode, Sequencer, State};
pub use table::{CoilPairing, Phase, PhaseMode, SequenceTable, Topology};
