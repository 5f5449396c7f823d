//! MLX8131x HAL implementation
//!
//! Register-level implementation of the `mdrv-hal` traits for the MLX8131x
//! family (16-bit core, 10-bit SAR ADC, 4-phase driver).
//!
//! ## Example
//! ```no_run
//! use mdrv_hal::IrqGroupRegisters;
//! use mdrv_hal_mlx::Peripherals;
//!
//! // SAFETY: called once at start-up, before any other register access.
//! let mut p = unsafe { Peripherals::steal() };
//! p.diag_irq.write_mask(0);
//! ```

#![no_std]

pub mod registers;
pub mod interrupt;
pub mod adc;
pub mod io;
pub mod driver;

pub use adc::MlxAdc;
pub use driver::MlxDriver;
pub use interrupt::MlxIrqGroup;
pub use io::MlxIo;
pub use registers::MmioRef;

/// Every peripheral used by the driver crates
pub struct Peripherals {
    /// PWM interrupt group
    pub pwm_irq: MlxIrqGroup,
    /// Timer 1 interrupt group
    pub timer1_irq: MlxIrqGroup,
    /// Timer 2 interrupt group
    pub timer2_irq: MlxIrqGroup,
    /// External I/O interrupt group
    pub extio_irq: MlxIrqGroup,
    /// Diagnostic interrupt group
    pub diag_irq: MlxIrqGroup,
    /// ADC front end
    pub adc: MlxAdc,
    /// Analog I/O port
    pub io: MlxIo,
    /// Driver stage
    pub driver: MlxDriver,
}

impl Peripherals {
    /// Create handles to every peripheral
    ///
    /// # Safety
    /// Each handle grants unsynchronised register access. Call once, and do
    /// not create other handles to the same blocks.
    pub unsafe fn steal() -> Self {
        use registers::map;

        Self {
            pwm_irq: MlxIrqGroup::new(map::PWM_IRQ),
            timer1_irq: MlxIrqGroup::new(map::TIMER1_IRQ),
            timer2_irq: MlxIrqGroup::new(map::TIMER2_IRQ),
            extio_irq: MlxIrqGroup::new(map::EXTIO_IRQ),
            diag_irq: MlxIrqGroup::new(map::DIAG_IRQ),
            adc: MlxAdc::new(map::ADC),
            io: MlxIo::new(map::ANALOG_IO),
            driver: MlxDriver::new(map::DRIVER),
        }
    }
}
