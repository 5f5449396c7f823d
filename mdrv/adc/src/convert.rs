//! Raw code to engineering unit conversion
//!
//! Voltages are in units of 10 mV, currents in mA and temperatures in °C.
//! All functions are total: overflow saturates and degenerate trim data
//! yields a zero correction.

/// Voltage gain divisor
pub const VOLTAGE_DIV: i32 = 64;

/// Current gain divisor
pub const CURRENT_DIV: i32 = 128;

/// Largest accepted temperature change between two readings
pub const TEMPERATURE_JUMP: i16 = 5;

const TEMP_HIGH: i32 = 125;
const TEMP_LOW: i32 = -40;
const SINGLE_LINE_DIV: i32 = 128;

fn saturate(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Offset and gain corrected voltage
pub fn voltage(raw: u16, offset: u16, gain: i16) -> i16 {
    let diff = raw as i32 - offset as i32;
    saturate((diff * gain as i32 + VOLTAGE_DIV / 2).div_euclid(VOLTAGE_DIV))
}

/// Phase voltage; rounds half-up like [`voltage`]
pub fn phase_voltage(raw: u16, offset: u16, gain: i16) -> i16 {
    let diff = raw as i32 - offset as i32;
    saturate((diff * gain as i32 + VOLTAGE_DIV / 2) >> 6)
}

/// Offset corrected current of one coil, clamped at zero
pub fn current_single(raw: u16, offset: u16) -> u16 {
    raw.saturating_sub(offset)
}

/// Sum of two offset corrected coil currents
///
/// Each term clamps at zero; the sum wraps.
pub fn current_dual(a: u16, b: u16, offset: u16) -> u16 {
    current_single(a, offset).wrapping_add(current_single(b, offset))
}

/// Gain scaled current
pub fn current_scaled(raw: u16, gain: u16) -> i16 {
    let product = raw as u32 * gain as u32 + (CURRENT_DIV / 2) as u32;
    (product / CURRENT_DIV as u32) as u16 as i16
}

/// Shape of the temperature characteristic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureModel {
    /// Separate slopes above and below the anchor
    TwoSegment,
    /// One slope through the anchor, in °C per 128 codes
    SingleLine { gain: i16 },
}

/// Temperature sensor trim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemperatureTrim {
    /// Code at the mid temperature
    pub anchor: u16,
    /// Temperature at the anchor
    pub mid: i16,
    /// Code at 125 °C
    pub code_at_125: u16,
    /// Code at -40 °C
    pub code_at_minus40: u16,
    pub model: TemperatureModel,
}

impl Default for TemperatureTrim {
    fn default() -> Self {
        Self {
            anchor: 350,
            mid: 35,
            code_at_125: 215,
            code_at_minus40: 463,
            model: TemperatureModel::TwoSegment,
        }
    }
}

impl TemperatureTrim {
    /// Temperature of a sensor code
    ///
    /// The sensor code falls as temperature rises.
    pub fn temperature(&self, code: u16) -> i16 {
        let anchor = self.anchor as i32;
        let code = code as i32;
        let mid = self.mid as i32;
        let delta = match self.model {
            TemperatureModel::TwoSegment if code < anchor => ((anchor - code)
                * (TEMP_HIGH - mid))
                .checked_div(anchor - self.code_at_125 as i32)
                .unwrap_or(0),
            TemperatureModel::TwoSegment => -((code - anchor) * (mid - TEMP_LOW))
                .checked_div(self.code_at_minus40 as i32 - anchor)
                .unwrap_or(0),
            TemperatureModel::SingleLine { gain } => (anchor - code) * gain as i32 / SINGLE_LINE_DIV,
        };
        saturate(mid + delta)
    }
}

/// Limit a temperature change to one degree per reading
///
/// A change larger than [`TEMPERATURE_JUMP`] moves the previous value one
/// step toward the new one. The first reading is taken as is.
pub fn limit_jump(new: i16, previous: i16, first: bool) -> i16 {
    if first {
        return new;
    }
    let change = new as i32 - previous as i32;
    if change > TEMPERATURE_JUMP as i32 {
        previous.saturating_add(1)
    } else if change < -(TEMPERATURE_JUMP as i32) {
        previous.saturating_sub(1)
    } else {
        new
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voltage_rounding() {
        // (400 - 100) * 219 / 64 = 1026.56
        assert_eq!(voltage(400, 100, 219), 1027);
        assert_eq!(voltage(100, 100, 219), 0);
        assert_eq!(voltage(0, 100, 64), -100);
        assert_eq!(voltage(99, 100, 64), -1);
        // -300 * 219 / 64 = -1026.56
        assert_eq!(voltage(100, 400, 219), -1027);
    }

    #[test]
    fn test_voltage_matches_phase_voltage() {
        for raw in [0, 37, 99, 100, 101, 400, 1023] {
            assert_eq!(voltage(raw, 100, 219), phase_voltage(raw, 100, 219));
        }
    }

    #[test]
    fn test_voltage_saturates() {
        assert_eq!(voltage(u16::MAX, 0, i16::MAX), i16::MAX);
        assert_eq!(voltage(0, u16::MAX, i16::MAX), i16::MIN);
    }

    #[test]
    fn test_phase_voltage_floor() {
        assert_eq!(phase_voltage(164, 100, 64), 64);
        // -1 * 64 + 32 = -32, shifted gives -1
        assert_eq!(phase_voltage(99, 100, 64), -1);
    }

    #[test]
    fn test_current_clamps_terms() {
        assert_eq!(current_single(90, 100), 0);
        assert_eq!(current_single(150, 100), 50);
        assert_eq!(current_dual(90, 130, 100), 30);
        assert_eq!(current_dual(0xFFFF, 0xFFFF, 0), 0xFFFE);
    }

    #[test]
    fn test_current_scaled() {
        assert_eq!(current_scaled(128, 300), 300);
        assert_eq!(current_scaled(1, 64), 1);
        assert_eq!(current_scaled(0, 300), 0);
    }

    #[test]
    fn test_current_scaled_wide_product() {
        // 40_000 * 60_000 does not fit in an i32
        assert_eq!(current_scaled(40_000, 60_000), (18_750_000u32 as u16) as i16);
        assert_eq!(current_scaled(0xFFFE, u16::MAX), ((0xFFFEu32 * 0xFFFF + 64) / 128) as u16 as i16);
    }

    #[test]
    fn test_two_segment_temperature() {
        let trim = TemperatureTrim::default();
        assert_eq!(trim.temperature(350), 35);
        assert_eq!(trim.temperature(215), 125);
        assert_eq!(trim.temperature(463), -40);
    }

    #[test]
    fn test_degenerate_trim() {
        let trim = TemperatureTrim {
            code_at_125: 350,
            code_at_minus40: 350,
            ..TemperatureTrim::default()
        };
        assert_eq!(trim.temperature(100), 35);
        assert_eq!(trim.temperature(600), 35);
    }

    #[test]
    fn test_single_line_temperature() {
        let trim = TemperatureTrim {
            model: TemperatureModel::SingleLine { gain: 128 },
            ..TemperatureTrim::default()
        };
        assert_eq!(trim.temperature(340), 45);
    }

    #[test]
    fn test_limit_jump() {
        assert_eq!(limit_jump(60, 20, true), 60);
        assert_eq!(limit_jump(60, 20, false), 21);
        assert_eq!(limit_jump(10, 20, false), 19);
        assert_eq!(limit_jump(25, 20, false), 25);
        assert_eq!(limit_jump(15, 20, false), 15);
    }
}
