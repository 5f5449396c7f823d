//! Diagnostic error codes and the log they are reported to
//!
//! The self-test reports electrical problems as one-byte codes. Storage and
//! transport of those codes belong to the communication stack; this module
//! only defines the codes and the sink trait, plus a bounded in-memory log
//! that keeps the most recent entries.

use core::fmt;
use heapless::Deque;

/// Base code of the per-pin I/O loopback errors
const ERR_VIO_BASE: u8 = 0xE8;

/// Number of analog I/O pins covered by the loopback check
pub const IO_PIN_COUNT: u8 = 6;

/// Diagnostic error code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Analog supply rail outside its band
    Vdda,
    /// Digital supply rail outside its band
    Vddd,
    /// Output pin did not read back its driven level
    Vio(u8),
}

impl ErrorCode {
    /// Raw code as reported over the diagnostics protocol
    pub const fn raw(self) -> u8 {
        match self {
            ErrorCode::Vdda => 0xE1,
            ErrorCode::Vddd => 0xE2,
            ErrorCode::Vio(pin) => ERR_VIO_BASE + pin,
        }
    }

    /// Decode a raw protocol code
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0xE1 => Some(ErrorCode::Vdda),
            0xE2 => Some(ErrorCode::Vddd),
            r if r >= ERR_VIO_BASE && r < ERR_VIO_BASE + IO_PIN_COUNT => {
                Some(ErrorCode::Vio(r - ERR_VIO_BASE))
            }
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Vdda => write!(f, "VDDA out of range"),
            ErrorCode::Vddd => write!(f, "VDDD out of range"),
            ErrorCode::Vio(pin) => write!(f, "IO{} loopback mismatch", pin),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ErrorCode {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            ErrorCode::Vdda => defmt::write!(fmt, "Vdda"),
            ErrorCode::Vddd => defmt::write!(fmt, "Vddd"),
            ErrorCode::Vio(pin) => defmt::write!(fmt, "Vio({})", pin),
        }
    }
}

/// Consumer of diagnostic error codes
pub trait DiagnosticLog {
    /// Record an error code
    fn log_error(&mut self, code: ErrorCode);
}

/// Bounded log of the most recent error codes
///
/// When full, the oldest entry is dropped to make room.
#[derive(Debug, Default)]
pub struct ErrorLog<const N: usize> {
    entries: Deque<ErrorCode, N>,
}

impl<const N: usize> ErrorLog<N> {
    /// Create an empty log
    pub const fn new() -> Self {
        Self {
            entries: Deque::new(),
        }
    }

    /// Most recently logged code
    pub fn last(&self) -> Option<ErrorCode> {
        self.entries.back().copied()
    }

    /// Iterate from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &ErrorCode> + '_ {
        self.entries.iter()
    }

    /// Check if a code has been logged
    pub fn contains(&self, code: ErrorCode) -> bool {
        self.entries.iter().any(|c| *c == code)
    }

    /// Number of stored codes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<const N: usize> DiagnosticLog for ErrorLog<N> {
    fn log_error(&mut self, code: ErrorCode) {
        if self.entries.is_full() {
            self.entries.pop_front();
        }
        // Cannot fail: a slot was freed above.
        let _ = self.entries.push_back(code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_codes_roundtrip() {
        assert_eq!(ErrorCode::Vio(3).raw(), 0xEB);
        assert_eq!(ErrorCode::from_raw(0xEB), Some(ErrorCode::Vio(3)));
        assert_eq!(ErrorCode::from_raw(0xE1), Some(ErrorCode::Vdda));
        assert_eq!(ErrorCode::from_raw(0xEE), None);
    }

    #[test]
    fn test_log_drops_oldest() {
        let mut log: ErrorLog<2> = ErrorLog::new();
        log.log_error(ErrorCode::Vdda);
        log.log_error(ErrorCode::Vddd);
        log.log_error(ErrorCode::Vio(1));

        assert_eq!(log.len(), 2);
        assert!(!log.contains(ErrorCode::Vdda));
        assert_eq!(log.last(), Some(ErrorCode::Vio(1)));
    }
}
