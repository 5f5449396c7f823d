//! ADC sequencer state machine
//!
//! The sequencer owns the front end. A single-shot pass blocks until the
//! front end drops START; a hardware loop keeps converting on PWM events
//! until [`Sequencer::stop`] drains it.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use mdrv_core::{MdrvError, MdrvResult};
use mdrv_hal::adc::{ctrl, AdcFrontEnd, DmaTarget};

use crate::config::TimingConfig;
use crate::table::{SequenceTable, VREF_OFF};

/// Acquisition mode of a running sequencer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One firmware-triggered pass
    SoftwareSingleShot,
    /// PWM-triggered passes, restarting at the table head
    HardwareLoop,
}

/// Sequencer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Running(Mode),
}

#[cfg(feature = "defmt")]
impl defmt::Format for State {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            State::Idle => defmt::write!(fmt, "Idle"),
            State::Running(Mode::SoftwareSingleShot) => defmt::write!(fmt, "Running(SW)"),
            State::Running(Mode::HardwareLoop) => defmt::write!(fmt, "Running(HW)"),
        }
    }
}

/// Table-driven ADC sequencer
pub struct Sequencer<A, D> {
    adc: A,
    delay: D,
    timing: TimingConfig,
    state: State,
    powered_off: bool,
    configured: bool,
}

impl<A: AdcFrontEnd, D: DelayNs> Sequencer<A, D> {
    /// Create a sequencer; the front end is assumed powered off
    pub fn new(adc: A, delay: D, timing: TimingConfig) -> Self {
        Self {
            adc,
            delay,
            timing,
            state: State::Idle,
            powered_off: true,
            configured: false,
        }
    }

    /// Current state
    pub fn state(&self) -> State {
        self.state
    }

    /// Check if the next start observes the reference settling delay
    pub fn is_powered_off(&self) -> bool {
        self.powered_off
    }

    /// Point the front end at `table` and `target`
    ///
    /// The completion interrupt is masked while both bases change.
    pub fn configure(&mut self, table: &SequenceTable, target: DmaTarget) -> MdrvResult<()> {
        if self.state != State::Idle || self.adc.is_busy() {
            return Err(MdrvError::SequencerBusy);
        }
        let adc = &mut self.adc;
        critical_section::with(|_| {
            let irq = adc.completion_irq_enabled();
            adc.set_completion_irq(false);
            adc.set_source(table.words());
            adc.set_destination(target);
            adc.set_completion_irq(irq);
        });
        self.configured = true;
        Ok(())
    }

    fn poll_completion(&self) -> nb::Result<(), Infallible> {
        if self.adc.is_busy() {
            Err(nb::Error::WouldBlock)
        } else {
            Ok(())
        }
    }

    fn wait_completion(&mut self) {
        nb::block!(self.poll_completion()).unwrap_or_else(|e| match e {});
    }

    /// Run `table` once, writing to `target`, and wait for completion
    pub fn start_software(&mut self, table: &SequenceTable, target: DmaTarget) -> MdrvResult<()> {
        self.configure(table, target)?;
        self.state = State::Running(Mode::SoftwareSingleShot);

        self.adc.clear_completion();
        self.adc.write_control(ctrl::START);
        if self.powered_off {
            self.delay.delay_us(self.timing.settling_us);
            self.powered_off = false;
        }
        self.delay.delay_us(self.timing.setting_us);
        self.adc.write_control(ctrl::START | ctrl::SOFT_TRIG);
        self.wait_completion();

        self.state = State::Idle;
        Ok(())
    }

    /// Repeat the last single-shot pass without reconfiguring
    pub fn retrigger(&mut self) -> MdrvResult<()> {
        if !self.configured {
            return Err(MdrvError::NotConfigured);
        }
        if self.state != State::Idle {
            return Err(MdrvError::SequencerBusy);
        }
        self.state = State::Running(Mode::SoftwareSingleShot);
        self.adc.write_control(ctrl::START | ctrl::SOFT_TRIG);
        self.wait_completion();
        self.state = State::Idle;
        Ok(())
    }

    /// Convert `table` on every PWM period; does not block
    pub fn start_hardware_loop(&mut self, table: &SequenceTable, target: DmaTarget) -> MdrvResult<()> {
        self.configure(table, target)?;
        self.adc.write_control(ctrl::HW_LOOP);
        let control = self.adc.control();
        self.adc.write_control(control | ctrl::START);
        if self.powered_off {
            self.delay.delay_us(self.timing.pwm_period_us);
            self.powered_off = false;
        }
        self.state = State::Running(Mode::HardwareLoop);
        debug!("ADC hardware loop started");
        Ok(())
    }

    /// Stop sequencing
    ///
    /// A conversion in progress is driven to completion with firmware
    /// triggers first. Waits without bound.
    pub fn stop(&mut self) {
        if self.adc.is_busy() {
            let control = self.adc.control();
            self.adc.write_control(control & !ctrl::HW_LOOP);
            while self.adc.is_busy() {
                let control = self.adc.control();
                self.adc.write_control(control | ctrl::SOFT_TRIG);
                self.delay.delay_us(self.timing.drain_pause_us);
            }
        }
        self.adc.write_control(0);
        let adc = &mut self.adc;
        critical_section::with(|_| adc.set_completion_irq(false));
        self.state = State::Idle;
    }

    /// Switch the reference off
    ///
    /// The next start observes the settling delay again.
    pub fn power_off(&mut self, scratch: DmaTarget) {
        self.stop();
        // Idle after stop, so configure cannot fail
        if self.configure(&VREF_OFF, scratch).is_ok() {
            self.adc.clear_completion();
            self.adc.write_control(ctrl::START);
        }
        self.stop();
        self.powered_off = true;
        debug!("ADC powered off");
    }

    /// Release the front end and the delay provider
    pub fn free(self) -> (A, D) {
        (self.adc, self.delay)
    }
}
