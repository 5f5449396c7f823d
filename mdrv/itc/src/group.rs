//! Source group register access
//!
//! Pending and mask registers are managed independently. Enabling a source
//! latches it pending as well as unmasking it, so a source enabled while its
//! condition is present is served at once. Disabling only masks: a latched
//! condition survives and is served again when the source is re-enabled.

use mdrv_hal::interrupt::{IrqGroupRegisters, CLEAR_ALL};

use crate::source::Group;

/// One group of up to sixteen virtual sources
pub struct SourceGroup<R> {
    group: Group,
    regs: R,
}

impl<R: IrqGroupRegisters> SourceGroup<R> {
    /// Wrap the registers of `group`
    pub const fn new(group: Group, regs: R) -> Self {
        Self { group, regs }
    }

    /// Group served by these registers
    pub const fn group(&self) -> Group {
        self.group
    }

    /// Mask every source, then clear every latched condition
    pub fn reset(&mut self) {
        self.regs.write_mask(0);
        self.regs.clear_pending(CLEAR_ALL);
    }

    /// Latch and unmask the sources in `bits`
    pub fn enable(&mut self, bits: u16) {
        critical_section::with(|_| {
            self.regs.latch_pending(bits);
            let mask = self.regs.mask();
            self.regs.write_mask(mask | bits);
        });
    }

    /// Mask the sources in `bits`, leaving them pending
    pub fn disable(&mut self, bits: u16) {
        critical_section::with(|_| {
            let mask = self.regs.mask();
            self.regs.write_mask(mask & !bits);
        });
    }

    /// Clear the pending condition of the sources in `bits`
    pub fn acknowledge(&mut self, bits: u16) {
        self.regs.clear_pending(bits);
    }

    /// Pending register
    pub fn pending(&self) -> u16 {
        self.regs.pending()
    }

    /// Mask register
    pub fn mask(&self) -> u16 {
        self.regs.mask()
    }

    /// Sources both pending and unmasked
    pub fn active(&self) -> u16 {
        self.regs.active()
    }

    /// Lowest active bit: the source the priority encoder selects
    pub fn lowest_active(&self) -> Option<u8> {
        let active = self.active();
        if active == 0 {
            None
        } else {
            Some(active.trailing_zeros() as u8)
        }
    }
}
