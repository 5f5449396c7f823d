//! Second-level interrupt group registers

use mdrv_hal::interrupt::IrqGroupRegisters;
use tock_registers::interfaces::{Readable, Writeable};

use crate::registers::{IrqGroupBlock, MmioRef};

/// One pending/mask register pair
pub struct MlxIrqGroup {
    regs: MmioRef<IrqGroupBlock>,
}

impl MlxIrqGroup {
    /// Wrap a register block
    pub const fn new(regs: MmioRef<IrqGroupBlock>) -> Self {
        Self { regs }
    }
}

impl IrqGroupRegisters for MlxIrqGroup {
    fn pending(&self) -> u16 {
        self.regs.pend.get()
    }

    fn mask(&self) -> u16 {
        self.regs.mask.get()
    }

    fn write_mask(&mut self, bits: u16) {
        self.regs.mask.set(bits);
    }

    fn latch_pending(&mut self, bits: u16) {
        // PEND has no separate set port. The enable sequence writes the
        // source bit with the same write-one access as `clear_pending`.
        self.regs.pend.set(bits);
    }

    fn clear_pending(&mut self, bits: u16) {
        self.regs.pend.set(bits);
    }
}
