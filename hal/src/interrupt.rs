//! Second-level interrupt register group abstraction
//!
//! A group is one 16-bit pending register and one 16-bit mask register
//! shared by up to sixteen virtual interrupt sources. The registers are
//! managed independently: nothing written to one touches the other.

/// Width of a pending/mask register
pub const GROUP_WIDTH: u8 = 16;

/// Pattern written to a pending register to clear every latched source
pub const CLEAR_ALL: u16 = 0xFFFF;

/// Register pair of one interrupt source group
pub trait IrqGroupRegisters {
    /// Read the pending register
    fn pending(&self) -> u16;

    /// Read the mask register
    fn mask(&self) -> u16;

    /// Overwrite the mask register
    fn write_mask(&mut self, bits: u16);

    /// Latch `bits` as pending
    ///
    /// Register-backed groups issue the pending write of the enable sequence.
    fn latch_pending(&mut self, bits: u16);

    /// Clear the pending `bits` (write-one-to-clear)
    fn clear_pending(&mut self, bits: u16);

    /// Sources that are both pending and allowed to propagate
    fn active(&self) -> u16 {
        self.pending() & self.mask()
    }
}

impl<T: IrqGroupRegisters + ?Sized> IrqGroupRegisters for &mut T {
    fn pending(&self) -> u16 {
        (**self).pending()
    }

    fn mask(&self) -> u16 {
        (**self).mask()
    }

    fn write_mask(&mut self, bits: u16) {
        (**self).write_mask(bits)
    }

    fn latch_pending(&mut self, bits: u16) {
        (**self).latch_pending(bits)
    }

    fn clear_pending(&mut self, bits: u16) {
        (**self).clear_pending(bits)
    }
}
