//! Driver stage configuration register

use mdrv_hal::driver::DriverStage;
use tock_registers::interfaces::{Readable, Writeable};

use crate::registers::{DriverBlock, MmioRef, DRVCFG};

// The HAL constant and the register map describe the same bit.
const _: () = assert!(mdrv_hal::driver::DIS_DRV == 1 << DRVCFG::DIS_DRV.shift);

/// Driver stage
pub struct MlxDriver {
    regs: MmioRef<DriverBlock>,
}

impl MlxDriver {
    /// Wrap a register block
    pub const fn new(regs: MmioRef<DriverBlock>) -> Self {
        Self { regs }
    }
}

impl DriverStage for MlxDriver {
    fn config(&self) -> u16 {
        self.regs.drvcfg.get()
    }

    fn write_config(&mut self, bits: u16) {
        self.regs.drvcfg.set(bits);
    }
}
