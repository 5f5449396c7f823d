//! Run-time configuration

use crate::calibration::{CalibrationParams, SelfTestLimits};
use crate::table::{CoilPairing, Topology};

/// Motor wiring and stepping configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorConfig {
    /// PWM topology of the driver stage
    pub topology: Topology,
    /// Which phases form a coil
    pub pairing: CoilPairing,
    /// Sample one phase voltage per PWM period for short detection
    pub phase_short_detection: bool,
    /// Motor voltage is taken from the filtered Vsm path
    pub filtered_vsm: bool,
    /// Micro-steps per full step, as a power of two
    pub micro_step_bits: u8,
    /// Micro-step index counts half micro-steps
    pub double_micro_step: bool,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            topology: Topology::DoubleMirror,
            pairing: CoilPairing::UwVt,
            phase_short_detection: true,
            filtered_vsm: true,
            micro_step_bits: 4,
            double_micro_step: false,
        }
    }
}

/// Analog timing, in microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    /// Reference settling after the front end was powered off
    pub settling_us: u32,
    /// Wait between power-up and the software trigger
    pub setting_us: u32,
    /// Pause between drain triggers in `stop`
    pub drain_pause_us: u32,
    /// One motor PWM period
    pub pwm_period_us: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settling_us: 50,
            setting_us: 2,
            drain_pause_us: 7,
            pwm_period_us: 50,
        }
    }
}

/// Complete driver configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdcConfig {
    pub motor: MotorConfig,
    pub calibration: CalibrationParams,
    pub limits: SelfTestLimits,
    pub timing: TimingConfig,
}
