//! Acquisition sequence tables
//!
//! Every table is static data: entry words in the front end's layout,
//! closed by the end-of-table marker. Motor-run tables are sampled once per
//! PWM period; the trigger of each entry places the sample within the
//! period. Which table runs is a pure function of the PWM topology, the
//! phase-short detection option and the phase to watch.

use mdrv_core::{MdrvError, MdrvResult};
use mdrv_hal::adc::{decode_entry, encode_entry, AdcChannel, Trigger, VoltageRef, END_OF_TABLE};

/// One decoded table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceEntry {
    pub channel: AdcChannel,
    pub trigger: Trigger,
    pub reference: VoltageRef,
}

/// Read-only sequence of entry words closed by the end-of-table marker
#[derive(Debug, PartialEq, Eq)]
pub struct SequenceTable {
    words: &'static [u16],
}

impl SequenceTable {
    /// Wrap entry words
    ///
    /// # Panics
    /// If the words are not closed by exactly one end-of-table marker, or
    /// hold no entry. In a `static` this is a build failure.
    pub const fn new(words: &'static [u16]) -> Self {
        let len = words.len();
        if len < 2 || words[len - 1] != END_OF_TABLE {
            panic!("sequence table must end with the end-of-table marker");
        }
        let mut i = 0;
        while i < len - 1 {
            if words[i] == END_OF_TABLE {
                panic!("end-of-table marker inside sequence table");
            }
            i += 1;
        }
        Self { words }
    }

    /// Wrap entry words supplied at run time
    pub fn try_new(words: &'static [u16]) -> MdrvResult<Self> {
        match words.split_last() {
            Some((&END_OF_TABLE, entries))
                if !entries.is_empty()
                    && entries
                        .iter()
                        .all(|&w| w != END_OF_TABLE && decode_entry(w).is_ok()) =>
            {
                Ok(Self { words })
            }
            _ => Err(MdrvError::InvalidTable),
        }
    }

    /// Entry words including the marker, as handed to the front end
    pub const fn words(&self) -> &'static [u16] {
        self.words
    }

    /// Number of entries
    pub const fn len(&self) -> usize {
        self.words.len() - 1
    }

    /// Always false: construction rejects empty tables
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode the entries in acquisition order
    pub fn entries(&self) -> impl Iterator<Item = SequenceEntry> + '_ {
        self.words[..self.len()]
            .iter()
            .filter_map(|&w| decode_entry(w).ok())
            .map(|(channel, trigger, reference)| SequenceEntry {
                channel,
                trigger,
                reference,
            })
    }

    /// Position of the first entry sampling `channel`
    pub fn position(&self, channel: AdcChannel) -> Option<usize> {
        self.entries().position(|e| e.channel == channel)
    }
}

/// Build a table at 2.5 V reference from `channel => trigger` pairs
macro_rules! sequence_table {
    ($($ch:expr => $trig:expr),+ $(,)?) => {{
        const WORDS: &[u16] = &[
            $(encode_entry($ch, $trig, VoltageRef::V2_5),)+
            END_OF_TABLE,
        ];
        SequenceTable::new(WORDS)
    }};
}

/// Build the four phase variants of a motor-run table; `PH` marks the
/// phase voltage entry
macro_rules! phase_tables {
    (@table $ph:expr; $($ch:tt => $trig:expr),+) => {
        sequence_table![$(phase_tables!(@channel $ph, $ch) => $trig),+]
    };
    (@channel $ph:expr, PH) => {
        $ph
    };
    (@channel $ph:expr, $ch:ident) => {
        AdcChannel::$ch
    };
    ($($ch:tt => $trig:expr),+ $(,)?) => {
        [
            phase_tables!(@table AdcChannel::PhU; $($ch => $trig),+),
            phase_tables!(@table AdcChannel::PhV; $($ch => $trig),+),
            phase_tables!(@table AdcChannel::PhW; $($ch => $trig),+),
            phase_tables!(@table AdcChannel::PhT; $($ch => $trig),+),
        ]
    };
}

macro_rules! single_shot {
    ($ch:expr) => {
        sequence_table![$ch => Trigger::Software]
    };
}

const C1: Trigger = Trigger::PwmCompare(1);
const C2: Trigger = Trigger::PwmCompare(2);
const C3: Trigger = Trigger::PwmCompare(3);
const C4: Trigger = Trigger::PwmCompare(4);
const C5: Trigger = Trigger::PwmCompare(5);
const N1: Trigger = Trigger::PwmCounter;

/// Reference off: powers the front end down
pub static VREF_OFF: SequenceTable = SequenceTable::new(&VREF_OFF_WORDS);

static VREF_OFF_WORDS: [u16; 2] = [
    encode_entry(AdcChannel::Tj, Trigger::Software, VoltageRef::Off),
    END_OF_TABLE,
];

/// Current sense zero offset
pub static CURRENT_OFFSET: SequenceTable = single_shot!(AdcChannel::Mcur);
/// Analog supply rail
pub static VDDA: SequenceTable = single_shot!(AdcChannel::Vdda);
/// Digital supply rail
pub static VDDD: SequenceTable = single_shot!(AdcChannel::Vddd);
/// Chip temperature sensor
pub static TEMPERATURE: SequenceTable = single_shot!(AdcChannel::Tj);
/// Supply voltage
pub static SUPPLY_VOLTAGE: SequenceTable = single_shot!(AdcChannel::Vs);
/// Motor driver supply
pub static MOTOR_VOLTAGE: SequenceTable = single_shot!(AdcChannel::Vsm);
/// Motor driver current
pub static MOTOR_CURRENT: SequenceTable = single_shot!(AdcChannel::Mcur);

/// Loopback probes of the I/O pins
pub static IO_PROBES: [SequenceTable; 6] = [
    single_shot!(AdcChannel::Io(0)),
    single_shot!(AdcChannel::Io(1)),
    single_shot!(AdcChannel::Io(2)),
    single_shot!(AdcChannel::Io(3)),
    single_shot!(AdcChannel::Io(4)),
    single_shot!(AdcChannel::Io(5)),
];

/// Phase voltage probes, indexed by [`Phase`]
pub static PHASE_PROBES: [SequenceTable; 4] = [
    single_shot!(AdcChannel::PhU),
    single_shot!(AdcChannel::PhV),
    single_shot!(AdcChannel::PhW),
    single_shot!(AdcChannel::PhT),
];

static DOUBLE_MIRROR: SequenceTable = sequence_table![
    AdcChannel::Mcur => C1,
    AdcChannel::Vs => C2,
    AdcChannel::Tj => C3,
    AdcChannel::Vsm => N1,
];
static DOUBLE_MIRROR_SHORT: [SequenceTable; 4] =
    phase_tables![Mcur => C1, PH => C2, Vs => C3, Tj => C4, Vsm => N1];

static MIRROR_VSM: SequenceTable = sequence_table![
    AdcChannel::Vs => C1,
    AdcChannel::Tj => C2,
    AdcChannel::Vsm => C3,
    AdcChannel::Mcur => N1,
];
static MIRROR_VSM_SHORT: [SequenceTable; 4] =
    phase_tables![PH => C1, Vs => C2, Tj => C3, Vsm => C4, Mcur => N1];

static MIRROR_GND: SequenceTable = sequence_table![
    AdcChannel::Vs => C1,
    AdcChannel::Mcur => C2,
    AdcChannel::Vsm => C3,
    AdcChannel::Tj => N1,
];
static MIRROR_GND_SHORT: [SequenceTable; 4] =
    phase_tables![Vs => C1, PH => C2, Mcur => C3, Vsm => C4, Tj => N1];

static INDEPENDENT: SequenceTable = sequence_table![
    AdcChannel::Tj => C1,
    AdcChannel::Vs => C2,
    AdcChannel::Mcur => C3,
    AdcChannel::Vsm => C4,
    AdcChannel::Mcur => N1,
];
static INDEPENDENT_SHORT: [SequenceTable; 4] =
    phase_tables![Tj => C1, Vs => C2, Mcur => C3, PH => C4, Vsm => C5, Mcur => N1];

/// Motor self-test pass A: every phase at 50 % and 100 % of the period
pub static SELF_TEST_A: SequenceTable = sequence_table![
    AdcChannel::Tj => N1,
    AdcChannel::PhU => C2,
    AdcChannel::PhU => N1,
    AdcChannel::PhV => C2,
    AdcChannel::PhV => N1,
    AdcChannel::PhW => C2,
    AdcChannel::PhW => N1,
    AdcChannel::PhT => C2,
    AdcChannel::PhT => N1,
    AdcChannel::Vs => C2,
    AdcChannel::Mcur => N1,
];

/// Motor self-test pass B: as A with current and supply swapped in time
pub static SELF_TEST_B: SequenceTable = sequence_table![
    AdcChannel::Tj => N1,
    AdcChannel::PhU => C2,
    AdcChannel::PhU => N1,
    AdcChannel::PhV => C2,
    AdcChannel::PhV => N1,
    AdcChannel::PhW => C2,
    AdcChannel::PhW => N1,
    AdcChannel::PhT => C2,
    AdcChannel::PhT => N1,
    AdcChannel::Mcur => C2,
    AdcChannel::Vs => N1,
];

/// Motor phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    U,
    V,
    W,
    T,
}

impl Phase {
    /// Table index
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// PWM topology of the driver stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Both coils switched with mirrored PWM on both sides
    DoubleMirror,
    /// Single-sided mirror PWM, coils referenced to Vsm
    SingleMirrorVsm,
    /// Single-sided mirror PWM, coils referenced to ground
    SingleMirrorGnd,
    /// Independent coil PWM, referenced to Vsm
    SingleIndependentVsm,
    /// Independent coil PWM, referenced to ground
    SingleIndependentGnd,
    /// Mirror PWM with independent current sampling per coil
    SingleMirrorSpecial,
}

impl Topology {
    /// Current is sampled once per coil
    pub const fn is_multi_coil(self) -> bool {
        matches!(
            self,
            Topology::SingleIndependentVsm
                | Topology::SingleIndependentGnd
                | Topology::SingleMirrorSpecial
        )
    }
}

/// Which phases form the two coils
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoilPairing {
    /// Coils U-W and V-T
    UwVt,
    /// Coils U-V and W-T
    UvWt,
    /// Coils U-T and V-W
    UtVw,
}

/// Phase to watch for short detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseMode {
    /// Explicit phase index: 1..=3 select a phase, anything else the default
    Index(u16),
    /// Derive the index from the micro-step position
    MicroStep { index: u16, ccw: bool },
}

impl PhaseMode {
    /// Phase index for a motor stepping with `2^bits` micro-steps
    pub const fn resolve(self, bits: u8, double: bool) -> u16 {
        match self {
            PhaseMode::Index(index) => index,
            PhaseMode::MicroStep { index, ccw } => {
                let index = if ccw { index.wrapping_sub(1) } else { index };
                // a 16-bit index holds at most 2^15 micro-steps per step
                let bits = if bits > 15 { 15 } else { bits as u32 };
                let step = 1u16 << bits;
                let (sum, shift) = if double {
                    (index.wrapping_add(step), bits + 1)
                } else {
                    (index.wrapping_add(step >> 1), bits)
                };
                (sum as u32 >> shift) as u16
            }
        }
    }
}

/// Phase connected to Vsm for a resolved phase index
pub const fn phase_for(pairing: CoilPairing, topology: Topology, index: u16) -> Phase {
    let special = matches!(topology, Topology::SingleMirrorSpecial);
    let gnd = matches!(topology, Topology::SingleMirrorGnd);
    match pairing {
        CoilPairing::UwVt => match index {
            1 => Phase::U,
            2 if special => Phase::V,
            2 => Phase::T,
            3 => Phase::W,
            _ if special => Phase::T,
            _ => Phase::V,
        },
        CoilPairing::UvWt => match index {
            1 if gnd => Phase::W,
            1 => Phase::T,
            2 if gnd || special => Phase::U,
            2 => Phase::V,
            3 if gnd => Phase::T,
            3 => Phase::W,
            _ if gnd || special => Phase::V,
            _ => Phase::U,
        },
        CoilPairing::UtVw => match index {
            1 => Phase::V,
            2 if special => Phase::U,
            2 => Phase::T,
            3 => Phase::W,
            _ if special => Phase::T,
            _ => Phase::U,
        },
    }
}

/// Motor-run table for a topology
///
/// Without phase-short detection the phase is ignored.
pub fn select(topology: Topology, phase_short_detection: bool, phase: Phase) -> &'static SequenceTable {
    let (plain, short) = match topology {
        Topology::DoubleMirror => (&DOUBLE_MIRROR, &DOUBLE_MIRROR_SHORT),
        Topology::SingleMirrorVsm => (&MIRROR_VSM, &MIRROR_VSM_SHORT),
        Topology::SingleMirrorGnd => (&MIRROR_GND, &MIRROR_GND_SHORT),
        Topology::SingleIndependentVsm
        | Topology::SingleIndependentGnd
        | Topology::SingleMirrorSpecial => (&INDEPENDENT, &INDEPENDENT_SHORT),
    };
    if phase_short_detection {
        &short[phase.index()]
    } else {
        plain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_closes_tables() {
        assert_eq!(VREF_OFF.words(), &[0x3001, END_OF_TABLE]);
        assert_eq!(SELF_TEST_A.len(), 11);
        assert_eq!(INDEPENDENT_SHORT[0].len(), 6);
    }

    #[test]
    fn test_runtime_table_validation() {
        static GOOD: [u16; 2] = [0x0001, END_OF_TABLE];
        static OPEN: [u16; 1] = [0x0001];
        static EMPTY: [u16; 1] = [END_OF_TABLE];
        static BAD_CHANNEL: [u16; 2] = [0x001F, END_OF_TABLE];
        assert_eq!(SequenceTable::try_new(&GOOD).map(|t| t.len()), Ok(1));
        assert_eq!(SequenceTable::try_new(&OPEN), Err(MdrvError::InvalidTable));
        assert_eq!(SequenceTable::try_new(&EMPTY), Err(MdrvError::InvalidTable));
        assert_eq!(SequenceTable::try_new(&BAD_CHANNEL), Err(MdrvError::InvalidTable));
    }

    #[test]
    fn test_phase_entry_substituted() {
        let table = select(Topology::DoubleMirror, true, Phase::T);
        let entry = table.entries().nth(1).unwrap();
        assert_eq!(entry.channel, AdcChannel::PhT);
        assert_eq!(entry.trigger, Trigger::PwmCompare(2));
    }

    #[test]
    fn test_select_ignores_phase_without_short_detection() {
        let a = select(Topology::SingleMirrorGnd, false, Phase::U);
        let b = select(Topology::SingleMirrorGnd, false, Phase::W);
        assert!(core::ptr::eq(a, b));
        assert_eq!(a.position(AdcChannel::Tj), Some(3));
    }

    #[test]
    fn test_phase_mapping() {
        assert_eq!(phase_for(CoilPairing::UwVt, Topology::DoubleMirror, 2), Phase::T);
        assert_eq!(phase_for(CoilPairing::UwVt, Topology::SingleMirrorSpecial, 2), Phase::V);
        assert_eq!(phase_for(CoilPairing::UvWt, Topology::SingleMirrorGnd, 1), Phase::W);
        assert_eq!(phase_for(CoilPairing::UvWt, Topology::SingleMirrorSpecial, 9), Phase::V);
        assert_eq!(phase_for(CoilPairing::UtVw, Topology::DoubleMirror, 0), Phase::U);
    }

    #[test]
    fn test_micro_step_resolution() {
        // 16 micro-steps per step: index 24 rounds to step 2
        assert_eq!(PhaseMode::MicroStep { index: 24, ccw: false }.resolve(4, false), 2);
        assert_eq!(PhaseMode::MicroStep { index: 24, ccw: true }.resolve(4, false), 1);
        assert_eq!(PhaseMode::MicroStep { index: 48, ccw: false }.resolve(4, true), 2);
        assert_eq!(PhaseMode::Index(7).resolve(4, false), 7);
    }

    #[test]
    fn test_micro_step_resolution_wide_bits() {
        let mode = PhaseMode::MicroStep { index: 0x8000, ccw: false };
        assert_eq!(mode.resolve(15, false), 1);
        assert_eq!(mode.resolve(15, true), 0);
        assert_eq!(mode.resolve(16, true), mode.resolve(15, true));
        assert_eq!(mode.resolve(u8::MAX, false), mode.resolve(15, false));
    }
}
