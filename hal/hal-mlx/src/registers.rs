//! Register maps

use core::ops::Deref;
use core::ptr::NonNull;

use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

/// Pointer to a register block that lives for the whole program
#[derive(Debug)]
pub struct MmioRef<T> {
    ptr: NonNull<T>,
}

impl<T> MmioRef<T> {
    /// Wrap a register block address
    ///
    /// # Safety
    /// `ptr` must be non-null, aligned and valid for the program lifetime.
    pub const unsafe fn new(ptr: *const T) -> Self {
        Self {
            ptr: NonNull::new_unchecked(ptr as *mut T),
        }
    }
}

impl<T> Clone for MmioRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for MmioRef<T> {}

impl<T> Deref for MmioRef<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: guaranteed by the contract of `new`.
        unsafe { self.ptr.as_ref() }
    }
}

register_bitfields![u16,
    pub ADC_CTRL [
        START OFFSET(0) NUMBITS(1) [],
        SOFT_TRIG OFFSET(2) NUMBITS(1) [],
        LOOP OFFSET(3) NUMBITS(1) [],
        TRIG_SRC OFFSET(4) NUMBITS(1) [],
        SYNC_SOC OFFSET(5) NUMBITS(1) []
    ],
    pub ADC_IRQ [
        EOC OFFSET(0) NUMBITS(1) []
    ],
    pub DRVCFG [
        DIS_DRV OFFSET(6) NUMBITS(1) []
    ]
];

register_structs! {
    /// Second-level interrupt group
    pub IrqGroupBlock {
        /// Pending sources; enable and acknowledge both write one per source
        (0x00 => pub pend: ReadWrite<u16>),
        /// Sources allowed to propagate
        (0x02 => pub mask: ReadWrite<u16>),
        (0x04 => @END),
    },

    /// ADC sequencer
    pub AdcBlock {
        /// Control register
        (0x00 => pub ctrl: ReadWrite<u16, ADC_CTRL::Register>),
        /// Address of the entry table
        (0x02 => pub sbase: ReadWrite<u16>),
        /// Address of the first result word
        (0x04 => pub dbase: ReadWrite<u16>),
        /// End-of-conversion pending, write one to clear
        (0x06 => pub irq_pend: ReadWrite<u16, ADC_IRQ::Register>),
        /// End-of-conversion interrupt mask
        (0x08 => pub irq_mask: ReadWrite<u16, ADC_IRQ::Register>),
        (0x0A => @END),
    },

    /// Analog I/O output control
    pub AnalogIoBlock {
        /// Output enable, one bit per pin
        (0x00 => pub outf: ReadWrite<u16>),
        /// Output level, one bit per pin
        (0x02 => pub outn: ReadWrite<u16>),
        (0x04 => @END),
    },

    /// Driver stage configuration
    pub DriverBlock {
        (0x00 => pub drvcfg: ReadWrite<u16, DRVCFG::Register>),
        (0x02 => @END),
    }
}

/// Peripheral addresses
pub mod map {
    use super::*;

    pub const PWM_IRQ: MmioRef<IrqGroupBlock> = unsafe { MmioRef::new(0x2010 as *const _) };
    pub const TIMER1_IRQ: MmioRef<IrqGroupBlock> = unsafe { MmioRef::new(0x2014 as *const _) };
    pub const TIMER2_IRQ: MmioRef<IrqGroupBlock> = unsafe { MmioRef::new(0x2018 as *const _) };
    pub const EXTIO_IRQ: MmioRef<IrqGroupBlock> = unsafe { MmioRef::new(0x201C as *const _) };
    pub const DIAG_IRQ: MmioRef<IrqGroupBlock> = unsafe { MmioRef::new(0x2020 as *const _) };
    pub const ADC: MmioRef<AdcBlock> = unsafe { MmioRef::new(0x2100 as *const _) };
    pub const ANALOG_IO: MmioRef<AnalogIoBlock> = unsafe { MmioRef::new(0x2140 as *const _) };
    pub const DRIVER: MmioRef<DriverBlock> = unsafe { MmioRef::new(0x2180 as *const _) };
}
