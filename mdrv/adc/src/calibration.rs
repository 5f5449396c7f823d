//! Calibration parameters and the state derived at power-up

use crate::convert::TemperatureTrim;

/// Largest accepted distance between measured and stored zero offset
pub const OFFSET_TOLERANCE: u16 = 6;

/// Trim constants, normally read from non-volatile memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationParams {
    /// Generic ADC offset code
    pub adc_offset: u16,
    /// Generic ADC gain, in units of 1/64
    pub adc_gain: i16,
    /// Offset of the filtered motor voltage path
    pub motor_voltage_offset: u16,
    /// Gain of the filtered motor voltage path
    pub motor_voltage_gain: i16,
    /// Temperature sensor trim
    pub temperature: TemperatureTrim,
    /// Current gain, in units of 1/128 mA per code
    pub current_gain: u16,
    /// Zero current offset measured at end of line
    pub stored_zero_offset: Option<u16>,
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self {
            adc_offset: 0,
            adc_gain: 219,
            motor_voltage_offset: 0,
            motor_voltage_gain: 219,
            temperature: TemperatureTrim::default(),
            current_gain: 300,
            stored_zero_offset: None,
        }
    }
}

/// Acceptance bands of the power-up self-test, as raw codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelfTestLimits {
    pub vdda_min: u16,
    pub vdda_max: u16,
    pub vddd_min: u16,
    pub vddd_max: u16,
    /// Lowest code accepted for an output driven high
    pub io_high_min: u16,
    /// Highest code accepted for an output driven low
    pub io_low_max: u16,
}

impl Default for SelfTestLimits {
    fn default() -> Self {
        Self {
            vdda_min: 620,
            vdda_max: 730,
            vddd_min: 680,
            vddd_max: 800,
            io_high_min: 1023,
            io_low_max: 100,
        }
    }
}

impl SelfTestLimits {
    /// Check an analog supply code
    pub fn vdda_ok(&self, code: u16) -> bool {
        (self.vdda_min..=self.vdda_max).contains(&code)
    }

    /// Check a digital supply code
    pub fn vddd_ok(&self, code: u16) -> bool {
        (self.vddd_min..=self.vddd_max).contains(&code)
    }
}

/// Calibration values derived at power-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationState {
    /// ADC code at zero motor current
    pub zero_current_offset: u16,
    /// Current gain in effect
    pub current_gain: u16,
    /// Last reported chip temperature
    pub last_temperature: i16,
}

impl Default for CalibrationState {
    fn default() -> Self {
        Self {
            zero_current_offset: 100,
            current_gain: 300,
            last_temperature: 0,
        }
    }
}

/// Pick the zero offset to use
///
/// A measurement too far from the stored value is treated as taken under
/// load and replaced by the stored value.
pub fn validate_offset(measured: u16, stored: Option<u16>) -> u16 {
    match stored {
        Some(stored) if measured.abs_diff(stored) > OFFSET_TOLERANCE => stored,
        _ => measured,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_tolerance() {
        assert_eq!(validate_offset(107, Some(100)), 100);
        assert_eq!(validate_offset(106, Some(100)), 106);
        assert_eq!(validate_offset(94, Some(100)), 94);
        assert_eq!(validate_offset(93, Some(100)), 100);
        assert_eq!(validate_offset(500, None), 500);
    }

    #[test]
    fn test_supply_bands() {
        let limits = SelfTestLimits::default();
        assert!(limits.vdda_ok(620));
        assert!(limits.vdda_ok(730));
        assert!(!limits.vdda_ok(731));
        assert!(!limits.vddd_ok(679));
    }
}
