//! ADC (Analog-to-Digital Converter) front end abstraction
//!
//! The front end executes a table of 16-bit entry words located at its
//! source base and stores every conversion result, in order, at its
//! destination base. Entry words are encoded with [`encode_entry`].

use core::cell::UnsafeCell;
use core::ptr::NonNull;

use crate::error::{HalError, HalResult};

/// Control register bits
pub mod ctrl {
    /// Front end powered and sequencing
    pub const START: u16 = 1 << 0;
    /// Firmware trigger of the next table entry
    pub const SOFT_TRIG: u16 = 1 << 2;
    /// Restart at the table head after the end-of-table marker
    pub const LOOP: u16 = 1 << 3;
    /// Take triggers from the PWM unit
    pub const TRIG_SRC: u16 = 1 << 4;
    /// Start of conversion synchronised to the trigger edge
    pub const SYNC_SOC: u16 = 1 << 5;

    /// Bits describing a hardware triggered loop
    pub const HW_LOOP: u16 = LOOP | TRIG_SRC | SYNC_SOC;
}

/// End-of-table marker word
pub const END_OF_TABLE: u16 = 0xFFFF;

const CHANNEL_MASK: u16 = 0x001F;
const TRIGGER_SHIFT: u16 = 8;
const TRIGGER_MASK: u16 = 0x0007;
const REF_SHIFT: u16 = 12;
const REF_MASK: u16 = 0x0003;

/// Analog multiplexer input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcChannel {
    /// Supply voltage (divided)
    Vs,
    /// Junction temperature sensor
    Tj,
    /// Digital supply rail
    Vddd,
    /// Analog supply rail
    Vdda,
    /// Analog I/O pin 0..5
    Io(u8),
    /// Phase U voltage
    PhU,
    /// Phase V voltage
    PhV,
    /// Phase W voltage
    PhW,
    /// Phase T voltage
    PhT,
    /// Motor driver current
    Mcur,
    /// Filtered motor driver supply
    Vsm,
}

impl AdcChannel {
    /// Multiplexer input number
    pub const fn number(self) -> u8 {
        match self {
            AdcChannel::Vs => 0,
            AdcChannel::Tj => 1,
            AdcChannel::Vddd => 2,
            AdcChannel::Vdda => 3,
            AdcChannel::Io(n) if n < 4 => 4 + n,
            AdcChannel::Io(4) => 8,
            AdcChannel::Io(_) => 12,
            AdcChannel::PhU => 9,
            AdcChannel::PhV => 10,
            AdcChannel::PhW => 11,
            AdcChannel::Mcur => 13,
            AdcChannel::Vsm => 14,
            AdcChannel::PhT => 25,
        }
    }

    /// Decode a multiplexer input number
    pub const fn from_number(number: u8) -> HalResult<Self> {
        match number {
            0 => Ok(AdcChannel::Vs),
            1 => Ok(AdcChannel::Tj),
            2 => Ok(AdcChannel::Vddd),
            3 => Ok(AdcChannel::Vdda),
            4..=7 => Ok(AdcChannel::Io(number - 4)),
            8 => Ok(AdcChannel::Io(4)),
            9 => Ok(AdcChannel::PhU),
            10 => Ok(AdcChannel::PhV),
            11 => Ok(AdcChannel::PhW),
            12 => Ok(AdcChannel::Io(5)),
            13 => Ok(AdcChannel::Mcur),
            14 => Ok(AdcChannel::Vsm),
            25 => Ok(AdcChannel::PhT),
            _ => Err(HalError::InvalidChannel(number)),
        }
    }
}

/// Conversion trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Firmware writes SOFT_TRIG
    Software,
    /// PWM unit 1..5 compare match
    PwmCompare(u8),
    /// PWM unit 1 counter wrap
    PwmCounter,
}

impl Trigger {
    const fn code(self) -> u16 {
        match self {
            Trigger::Software => 0,
            Trigger::PwmCompare(n) => n as u16,
            Trigger::PwmCounter => 6,
        }
    }

    const fn from_code(code: u16) -> Self {
        match code {
            1..=5 => Trigger::PwmCompare(code as u8),
            6 => Trigger::PwmCounter,
            _ => Trigger::Software,
        }
    }
}

/// Conversion reference voltage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoltageRef {
    /// 2.5 V bandgap
    V2_5,
    /// 1.5 V bandgap
    V1_5,
    /// Reference switched off
    Off,
}

impl VoltageRef {
    const fn code(self) -> u16 {
        match self {
            VoltageRef::V2_5 => 0,
            VoltageRef::V1_5 => 1,
            VoltageRef::Off => 3,
        }
    }

    const fn from_code(code: u16) -> Self {
        match code {
            0 => VoltageRef::V2_5,
            1 => VoltageRef::V1_5,
            _ => VoltageRef::Off,
        }
    }
}

/// Encode a table entry word
pub const fn encode_entry(channel: AdcChannel, trigger: Trigger, reference: VoltageRef) -> u16 {
    (channel.number() as u16 & CHANNEL_MASK)
        | ((trigger.code() & TRIGGER_MASK) << TRIGGER_SHIFT)
        | ((reference.code() & REF_MASK) << REF_SHIFT)
}

/// Decode a table entry word
pub const fn decode_entry(word: u16) -> HalResult<(AdcChannel, Trigger, VoltageRef)> {
    let channel = match AdcChannel::from_number((word & CHANNEL_MASK) as u8) {
        Ok(channel) => channel,
        Err(e) => return Err(e),
    };
    let trigger = Trigger::from_code((word >> TRIGGER_SHIFT) & TRIGGER_MASK);
    let reference = VoltageRef::from_code((word >> REF_SHIFT) & REF_MASK);
    Ok((channel, trigger, reference))
}

/// One conversion result word, written by the front end
///
/// Accesses are volatile; the hardware writes the slot behind the
/// compiler's back.
#[repr(transparent)]
pub struct ResultSlot(UnsafeCell<u16>);

// The target is single core and slot accesses are single word.
unsafe impl Sync for ResultSlot {}

impl ResultSlot {
    /// Create a zeroed slot
    pub const fn new() -> Self {
        Self(UnsafeCell::new(0))
    }

    /// Read the slot
    pub fn get(&self) -> u16 {
        // SAFETY: the cell is valid for the lifetime of `self`; word access.
        unsafe { self.0.get().read_volatile() }
    }

    /// Write the slot
    pub fn set(&self, value: u16) {
        // SAFETY: as in `get`.
        unsafe { self.0.get().write_volatile(value) }
    }
}

impl Default for ResultSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for ResultSlot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ResultSlot({})", self.get())
    }
}

/// Destination of a conversion pass: consecutive result slots
#[derive(Debug, Clone, Copy)]
pub struct DmaTarget {
    slots: &'static [ResultSlot],
}

impl DmaTarget {
    /// Target the given slots
    pub const fn new(slots: &'static [ResultSlot]) -> Self {
        Self { slots }
    }

    /// Target a single slot
    pub const fn single(slot: &'static ResultSlot) -> Self {
        Self {
            slots: core::slice::from_ref(slot),
        }
    }

    /// Address of the first slot
    pub fn base(&self) -> NonNull<u16> {
        match self.slots.first() {
            Some(slot) => NonNull::from(slot).cast(),
            None => NonNull::dangling(),
        }
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the target holds no slot
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Store a result at `index`; out-of-range writes are dropped
    pub fn store(&self, index: usize, value: u16) {
        if let Some(slot) = self.slots.get(index) {
            slot.set(value);
        }
    }
}

/// ADC front end register access
pub trait AdcFrontEnd {
    /// Read the control register
    fn control(&self) -> u16;

    /// Overwrite the control register
    fn write_control(&mut self, bits: u16);

    /// Point the sequencer at a table of entry words
    fn set_source(&mut self, table: &'static [u16]);

    /// Point the sequencer at its result slots
    fn set_destination(&mut self, target: DmaTarget);

    /// Check the conversion-complete flag
    fn completion_pending(&self) -> bool;

    /// Clear the conversion-complete flag
    fn clear_completion(&mut self);

    /// Mask or unmask the conversion-complete interrupt
    fn set_completion_irq(&mut self, enabled: bool);

    /// Check if the conversion-complete interrupt is unmasked
    fn completion_irq_enabled(&self) -> bool;

    /// Front end still powered and sequencing
    fn is_busy(&self) -> bool {
        self.control() & ctrl::START != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_layout() {
        let word = encode_entry(AdcChannel::Mcur, Trigger::PwmCompare(3), VoltageRef::V1_5);
        assert_eq!(word, 0x130D);

        let word = encode_entry(AdcChannel::Tj, Trigger::Software, VoltageRef::Off);
        assert_eq!(word, 0x3001);
    }

    #[test]
    fn test_channel_numbers() {
        assert_eq!(AdcChannel::Io(4).number(), 8);
        assert_eq!(AdcChannel::Io(5).number(), 12);
        assert_eq!(AdcChannel::PhT.number(), 25);
        assert_eq!(AdcChannel::from_number(7), Ok(AdcChannel::Io(3)));
        assert_eq!(AdcChannel::from_number(20), Err(HalError::InvalidChannel(20)));
    }

    #[test]
    fn test_decode_counter_trigger() {
        let word = encode_entry(AdcChannel::Vsm, Trigger::PwmCounter, VoltageRef::V2_5);
        assert_eq!(
            decode_entry(word),
            Ok((AdcChannel::Vsm, Trigger::PwmCounter, VoltageRef::V2_5))
        );
    }

    #[test]
    fn test_dma_target_drops_overflow() {
        static SLOTS: [ResultSlot; 2] = [ResultSlot::new(), ResultSlot::new()];
        let target = DmaTarget::new(&SLOTS);
        target.store(1, 42);
        target.store(5, 7);
        assert_eq!(SLOTS[1].get(), 42);
        assert_eq!(target.len(), 2);
    }
}
