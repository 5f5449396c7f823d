//! ADC sequencer registers

use mdrv_hal::adc::{ctrl, AdcFrontEnd, DmaTarget};
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

use crate::registers::{AdcBlock, MmioRef, ADC_CTRL, ADC_IRQ};

const _: () = {
    assert!(ctrl::START == 1 << ADC_CTRL::START.shift);
    assert!(ctrl::SOFT_TRIG == 1 << ADC_CTRL::SOFT_TRIG.shift);
    assert!(ctrl::LOOP == 1 << ADC_CTRL::LOOP.shift);
    assert!(ctrl::TRIG_SRC == 1 << ADC_CTRL::TRIG_SRC.shift);
    assert!(ctrl::SYNC_SOC == 1 << ADC_CTRL::SYNC_SOC.shift);
};

/// ADC front end
pub struct MlxAdc {
    regs: MmioRef<AdcBlock>,
}

impl MlxAdc {
    /// Wrap a register block
    pub const fn new(regs: MmioRef<AdcBlock>) -> Self {
        Self { regs }
    }
}

/// Data addresses are 16 bits wide on this core
fn bus_address<T>(ptr: *const T) -> u16 {
    ptr as usize as u16
}

impl AdcFrontEnd for MlxAdc {
    fn control(&self) -> u16 {
        self.regs.ctrl.get()
    }

    fn write_control(&mut self, bits: u16) {
        self.regs.ctrl.set(bits);
    }

    fn set_source(&mut self, table: &'static [u16]) {
        self.regs.sbase.set(bus_address(table.as_ptr()));
    }

    fn set_destination(&mut self, target: DmaTarget) {
        self.regs.dbase.set(bus_address(target.base().as_ptr()));
    }

    fn completion_pending(&self) -> bool {
        self.regs.irq_pend.is_set(ADC_IRQ::EOC)
    }

    fn clear_completion(&mut self) {
        self.regs.irq_pend.write(ADC_IRQ::EOC::SET);
    }

    fn set_completion_irq(&mut self, enabled: bool) {
        if enabled {
            self.regs.irq_mask.modify(ADC_IRQ::EOC::SET);
        } else {
            self.regs.irq_mask.modify(ADC_IRQ::EOC::CLEAR);
        }
    }

    fn completion_irq_enabled(&self) -> bool {
        self.regs.irq_mask.is_set(ADC_IRQ::EOC)
    }
}
