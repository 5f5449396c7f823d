//! Electrical fault state

/// Electrical fault condition recorded by the self-test
///
/// Once permanent, the condition stays for the rest of the power cycle.
/// Startup continues in degraded operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElectricFault {
    /// No fault detected
    #[default]
    None,
    /// Fault that persists until the next power cycle
    Permanent,
}

impl ElectricFault {
    /// Check if any fault has been recorded
    pub const fn is_faulted(self) -> bool {
        matches!(self, ElectricFault::Permanent)
    }

    /// Record a permanent fault
    pub fn set_permanent(&mut self) {
        *self = ElectricFault::Permanent;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ElectricFault {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            ElectricFault::None => defmt::write!(fmt, "None"),
            ElectricFault::Permanent => defmt::write!(fmt, "Permanent"),
        }
    }
}
