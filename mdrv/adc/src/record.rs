//! Result records written by the front end
//!
//! The front end stores results in acquisition order starting at its
//! destination base, so where a field lives depends on the table that
//! filled it. [`RecordLayout`] captures that mapping for one table.

use mdrv_hal::adc::{AdcChannel, DmaTarget, ResultSlot};

use crate::table::{Phase, SequenceTable};

/// Raw sample slots of the motor-run record
pub const RECORD_SLOTS: usize = 6;

/// Sample slots of a self-test pass
pub const SELF_TEST_SLOTS: usize = 11;

/// Logical field of the motor-run record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Filtered supply voltage
    SupplyVoltage,
    /// Filtered driver voltage
    DriverVoltage,
    /// Temperature sensor code
    Temperature,
    /// Unfiltered driver current, first coil
    CurrentA,
    /// Unfiltered driver current, second coil
    CurrentB,
    /// Unfiltered phase voltage
    PhaseVoltage,
}

impl Field {
    const ALL: [Field; RECORD_SLOTS] = [
        Field::SupplyVoltage,
        Field::DriverVoltage,
        Field::Temperature,
        Field::CurrentA,
        Field::CurrentB,
        Field::PhaseVoltage,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

/// Field to slot mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    slots: [u8; RECORD_SLOTS],
}

impl RecordLayout {
    /// Fields in declaration order
    pub const DEFAULT: RecordLayout = RecordLayout {
        slots: [0, 1, 2, 3, 4, 5],
    };

    /// Layout produced by running `table` against the record
    ///
    /// Fields the table does not sample take the remaining slots in
    /// ascending order.
    pub fn for_table(table: &SequenceTable) -> Self {
        const FREE: u8 = u8::MAX;
        let mut slots = [FREE; RECORD_SLOTS];
        let mut used = [false; RECORD_SLOTS];

        for (i, entry) in table.entries().enumerate().take(RECORD_SLOTS) {
            let field = match entry.channel {
                AdcChannel::Vs => Field::SupplyVoltage,
                AdcChannel::Vsm => Field::DriverVoltage,
                AdcChannel::Tj => Field::Temperature,
                AdcChannel::Mcur if slots[Field::CurrentA.index()] == FREE => Field::CurrentA,
                AdcChannel::Mcur => Field::CurrentB,
                AdcChannel::PhU | AdcChannel::PhV | AdcChannel::PhW | AdcChannel::PhT => {
                    Field::PhaseVoltage
                }
                _ => continue,
            };
            if slots[field.index()] == FREE {
                slots[field.index()] = i as u8;
                used[i] = true;
            }
        }

        for field in Field::ALL {
            if slots[field.index()] != FREE {
                continue;
            }
            if let Some(free) = used.iter().position(|u| !u) {
                slots[field.index()] = free as u8;
                used[free] = true;
            }
        }

        Self { slots }
    }

    /// Slot index of `field`
    pub const fn slot(&self, field: Field) -> usize {
        self.slots[field.index()] as usize
    }
}

impl Default for RecordLayout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Motor-run record plus a scratch slot for one-off measurements
#[derive(Debug)]
pub struct ResultsRecord {
    slots: [ResultSlot; RECORD_SLOTS],
    scratch: ResultSlot,
}

impl ResultsRecord {
    /// Zeroed record, for use in a `static`
    pub const fn new() -> Self {
        Self {
            slots: [
                ResultSlot::new(),
                ResultSlot::new(),
                ResultSlot::new(),
                ResultSlot::new(),
                ResultSlot::new(),
                ResultSlot::new(),
            ],
            scratch: ResultSlot::new(),
        }
    }

    /// Destination of a motor-run table
    pub fn run_target(&'static self) -> DmaTarget {
        DmaTarget::new(&self.slots)
    }

    /// Destination of self-test measurements
    pub fn scratch_target(&'static self) -> DmaTarget {
        DmaTarget::single(&self.scratch)
    }

    /// Destination writing only `field`
    pub fn field_target(&'static self, layout: &RecordLayout, field: Field) -> DmaTarget {
        DmaTarget::single(&self.slots[layout.slot(field)])
    }

    /// Raw value of `field`
    pub fn get(&self, layout: &RecordLayout, field: Field) -> u16 {
        self.slots[layout.slot(field)].get()
    }

    /// Overwrite `field`
    pub fn set(&self, layout: &RecordLayout, field: Field, value: u16) {
        self.slots[layout.slot(field)].set(value);
    }

    /// Raw value of the scratch slot
    pub fn scratch(&self) -> u16 {
        self.scratch.get()
    }
}

impl Default for ResultsRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Motor self-test pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfTestPass {
    /// Supply at 50 %, current at 100 % of the period
    A,
    /// Current at 50 %, supply at 100 % of the period
    B,
}

impl SelfTestPass {
    /// Table of the pass
    pub fn table(self) -> &'static SequenceTable {
        match self {
            SelfTestPass::A => &crate::table::SELF_TEST_A,
            SelfTestPass::B => &crate::table::SELF_TEST_B,
        }
    }

    const fn supply_slot(self) -> usize {
        match self {
            SelfTestPass::A => 9,
            SelfTestPass::B => 10,
        }
    }

    const fn current_slot(self) -> usize {
        match self {
            SelfTestPass::A => 10,
            SelfTestPass::B => 9,
        }
    }
}

/// Results of one self-test pass
#[derive(Debug)]
pub struct SelfTestRecord {
    slots: [ResultSlot; SELF_TEST_SLOTS],
}

impl SelfTestRecord {
    /// Zeroed record, for use in a `static`
    pub const fn new() -> Self {
        Self {
            slots: [
                ResultSlot::new(),
                ResultSlot::new(),
                ResultSlot::new(),
                ResultSlot::new(),
                ResultSlot::new(),
                ResultSlot::new(),
                ResultSlot::new(),
                ResultSlot::new(),
                ResultSlot::new(),
                ResultSlot::new(),
                ResultSlot::new(),
            ],
        }
    }

    /// Destination of a self-test pass
    pub fn target(&'static self) -> DmaTarget {
        DmaTarget::new(&self.slots)
    }

    /// Temperature code
    pub fn temperature(&self) -> u16 {
        self.slots[0].get()
    }

    /// Phase voltage code at mid period, or at the end with `full`
    pub fn phase(&self, phase: Phase, full: bool) -> u16 {
        self.slots[1 + 2 * phase.index() + full as usize].get()
    }

    /// Supply voltage code
    pub fn supply(&self, pass: SelfTestPass) -> u16 {
        self.slots[pass.supply_slot()].get()
    }

    /// Driver current code
    pub fn current(&self, pass: SelfTestPass) -> u16 {
        self.slots[pass.current_slot()].get()
    }
}

impl Default for SelfTestRecord {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{select, Topology};

    #[test]
    fn test_layout_follows_acquisition_order() {
        let layout = RecordLayout::for_table(select(Topology::DoubleMirror, false, Phase::U));
        assert_eq!(layout.slot(Field::CurrentA), 0);
        assert_eq!(layout.slot(Field::SupplyVoltage), 1);
        assert_eq!(layout.slot(Field::Temperature), 2);
        assert_eq!(layout.slot(Field::DriverVoltage), 3);
        // not sampled: first free slots
        assert_eq!(layout.slot(Field::CurrentB), 4);
        assert_eq!(layout.slot(Field::PhaseVoltage), 5);
    }

    #[test]
    fn test_layout_two_coil_currents() {
        let layout =
            RecordLayout::for_table(select(Topology::SingleIndependentGnd, true, Phase::W));
        assert_eq!(layout.slot(Field::Temperature), 0);
        assert_eq!(layout.slot(Field::CurrentA), 2);
        assert_eq!(layout.slot(Field::PhaseVoltage), 3);
        assert_eq!(layout.slot(Field::DriverVoltage), 4);
        assert_eq!(layout.slot(Field::CurrentB), 5);
    }

    #[test]
    fn test_single_shot_layout_keeps_fields_apart() {
        let layout = RecordLayout::for_table(&crate::table::TEMPERATURE);
        let mut seen = [false; RECORD_SLOTS];
        for field in Field::ALL {
            let slot = layout.slot(field);
            assert!(!seen[slot]);
            seen[slot] = true;
        }
        assert_eq!(layout.slot(Field::Temperature), 0);
    }

    #[test]
    fn test_self_test_slots() {
        static RECORD: SelfTestRecord = SelfTestRecord::new();
        RECORD.target().store(4, 0x155);
        RECORD.target().store(9, 0x200);
        assert_eq!(RECORD.phase(Phase::V, true), 0x155);
        assert_eq!(RECORD.supply(SelfTestPass::A), 0x200);
        assert_eq!(RECORD.current(SelfTestPass::B), 0x200);
    }
}
