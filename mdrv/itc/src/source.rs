//! Interrupt groups and virtual interrupt sources

use core::fmt;
use mdrv_core::{MdrvError, MdrvResult};

/// Second-level interrupt group
///
/// Each group is fed by one first-level vector and owns one pending and one
/// mask register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Group {
    /// PWM master / interrupt events
    Pwm,
    /// Timer 1 compare and capture events
    Timer1,
    /// Timer 2 compare and capture events
    Timer2,
    /// Current regulation, SPI and external I/O events
    ExtIo,
    /// Supply, temperature and driver diagnostics
    Diagnostic,
}

impl Group {
    /// Number of groups
    pub const COUNT: usize = 5;

    /// All groups in register order
    pub const ALL: [Group; Self::COUNT] = [
        Group::Pwm,
        Group::Timer1,
        Group::Timer2,
        Group::ExtIo,
        Group::Diagnostic,
    ];

    /// Register order index
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Number of sources wired into the group
    pub const fn source_count(self) -> u8 {
        match self {
            Group::Pwm => 2,
            Group::Timer1 | Group::Timer2 => 5,
            Group::ExtIo | Group::Diagnostic => 11,
        }
    }

    /// Bits that correspond to wired sources
    pub const fn valid_bits(self) -> u16 {
        ((1u32 << self.source_count()) - 1) as u16
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Group::Pwm => "PWM",
            Group::Timer1 => "TIMER1",
            Group::Timer2 => "TIMER2",
            Group::ExtIo => "EXTIO",
            Group::Diagnostic => "DIAG",
        };
        f.write_str(name)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Group {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Group::Pwm => defmt::write!(fmt, "PWM"),
            Group::Timer1 => defmt::write!(fmt, "TIMER1"),
            Group::Timer2 => defmt::write!(fmt, "TIMER2"),
            Group::ExtIo => defmt::write!(fmt, "EXTIO"),
            Group::Diagnostic => defmt::write!(fmt, "DIAG"),
        }
    }
}

/// Virtual interrupt source: a bit in one group's registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Source {
    group: Group,
    bit: u8,
}

impl Source {
    /// Create a source, rejecting bits the group does not wire
    pub const fn new(group: Group, bit: u8) -> MdrvResult<Self> {
        if bit < group.source_count() {
            Ok(Self { group, bit })
        } else {
            Err(MdrvError::InvalidSource)
        }
    }

    pub(crate) const fn wired(group: Group, bit: u8) -> Self {
        Self { group, bit }
    }

    /// Group the source belongs to
    pub const fn group(self) -> Group {
        self.group
    }

    /// Bit index within the group
    pub const fn bit(self) -> u8 {
        self.bit
    }

    /// Register mask of the source
    pub const fn mask(self) -> u16 {
        1 << self.bit
    }

    /// Compare two sources in a const context
    pub const fn same_as(self, other: Source) -> bool {
        self.group as u8 == other.group as u8 && self.bit == other.bit
    }

    pub const PWMA: Source = Source::wired(Group::Pwm, 0);
    pub const PWMI: Source = Source::wired(Group::Pwm, 1);

    pub const T1_IRQ1: Source = Source::wired(Group::Timer1, 0);
    pub const T1_IRQ2: Source = Source::wired(Group::Timer1, 1);
    pub const T1_IRQ3: Source = Source::wired(Group::Timer1, 2);
    pub const T1_IRQ4: Source = Source::wired(Group::Timer1, 3);
    pub const T1_IRQ5: Source = Source::wired(Group::Timer1, 4);

    pub const T2_IRQ1: Source = Source::wired(Group::Timer2, 0);
    pub const T2_IRQ2: Source = Source::wired(Group::Timer2, 1);
    pub const T2_IRQ3: Source = Source::wired(Group::Timer2, 2);
    pub const T2_IRQ4: Source = Source::wired(Group::Timer2, 3);
    pub const T2_IRQ5: Source = Source::wired(Group::Timer2, 4);

    pub const CURREG: Source = Source::wired(Group::ExtIo, 0);
    pub const SPI_OVF: Source = Source::wired(Group::ExtIo, 1);
    pub const SPI_REC_WORD: Source = Source::wired(Group::ExtIo, 2);
    pub const SPI_TR_WORD: Source = Source::wired(Group::ExtIo, 3);
    pub const EXTIO_IRQ0: Source = Source::wired(Group::ExtIo, 4);
    pub const EXTIO_IRQ1: Source = Source::wired(Group::ExtIo, 5);
    pub const EXTIO_IRQ2: Source = Source::wired(Group::ExtIo, 6);
    pub const EXTIO_IRQ3: Source = Source::wired(Group::ExtIo, 7);
    pub const EXTIO_IRQ4: Source = Source::wired(Group::ExtIo, 8);
    pub const EXTIO_IRQ5: Source = Source::wired(Group::ExtIo, 9);
    pub const EXTIO_IRQ6: Source = Source::wired(Group::ExtIo, 10);

    pub const VSUP_OV: Source = Source::wired(Group::Diagnostic, 0);
    pub const VSUP_UV: Source = Source::wired(Group::Diagnostic, 1);
    pub const VREG_UV: Source = Source::wired(Group::Diagnostic, 2);
    pub const VBOOST_UV: Source = Source::wired(Group::Diagnostic, 3);
    pub const OVER_TEMP: Source = Source::wired(Group::Diagnostic, 4);
    pub const VDS_ERROR: Source = Source::wired(Group::Diagnostic, 5);
    pub const VGS_ERROR: Source = Source::wired(Group::Diagnostic, 6);
    pub const OVER_CURRENT: Source = Source::wired(Group::Diagnostic, 7);
    pub const HVIO0_SHORT: Source = Source::wired(Group::Diagnostic, 8);
    pub const HVIO1_SHORT: Source = Source::wired(Group::Diagnostic, 9);
    pub const HVIO2_SHORT: Source = Source::wired(Group::Diagnostic, 10);
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.group, self.bit)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Source {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}[{}]", self.group, self.bit);
    }
}
