//! Host simulation of the driver ASIC peripherals
//!
//! `SimChip` owns the simulated register file and hands out handles that
//! implement the HAL traits. All handles share the same state, so a test can
//! give the handles to the code under test and keep the chip to inject
//! analog values, fire PWM cycles and inspect registers.

use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use heapless::Deque;

use crate::adc::{ctrl, decode_entry, AdcChannel, AdcFrontEnd, DmaTarget, VoltageRef, END_OF_TABLE};
use crate::driver::{DriverStage, DIS_DRV};
use crate::error::{HalError, HalResult};
use crate::gpio::{AnalogIoPort, Level};
use crate::interrupt::IrqGroupRegisters;

/// Number of simulated interrupt groups
pub const SIM_GROUPS: usize = 5;

/// Number of simulated analog I/O pins
pub const SIM_IO_PINS: u8 = 6;

/// Code read back from a pin driven high
pub const IO_HIGH_CODE: u16 = 1023;

const CHANNELS: usize = 32;
const QUEUE_DEPTH: usize = 8;

#[derive(Debug, Default, Clone, Copy)]
struct GroupRegs {
    pending: u16,
    mask: u16,
}

#[derive(Debug)]
struct AdcState {
    control: u16,
    source: &'static [u16],
    destination: Option<DmaTarget>,
    completion_pending: bool,
    completion_irq: bool,
    cursor: usize,
    in_flight: bool,
    hw_pass: bool,
    busy_polls: Option<u8>,
    latency: u8,
    conversions: usize,
}

#[derive(Debug)]
struct ChipState {
    groups: [GroupRegs; SIM_GROUPS],
    adc: AdcState,
    io_enabled: u8,
    io_level: u8,
    io_locked: u8,
    io_override: [Option<u16>; SIM_IO_PINS as usize],
    driver_config: u16,
    inputs: [u16; CHANNELS],
    queued: [Deque<u16, QUEUE_DEPTH>; CHANNELS],
    mcur_driver_disabled: usize,
    delays: Vec<u32>,
}

impl ChipState {
    fn new() -> Self {
        Self {
            groups: [GroupRegs::default(); SIM_GROUPS],
            adc: AdcState {
                control: 0,
                source: &[],
                destination: None,
                completion_pending: false,
                completion_irq: false,
                cursor: 0,
                in_flight: false,
                hw_pass: false,
                busy_polls: None,
                latency: 2,
                conversions: 0,
            },
            io_enabled: 0,
            io_level: 0,
            io_locked: 0,
            io_override: [None; SIM_IO_PINS as usize],
            driver_config: DIS_DRV,
            inputs: [0; CHANNELS],
            queued: core::array::from_fn(|_| Deque::new()),
            mcur_driver_disabled: 0,
            delays: Vec::new(),
        }
    }

    fn sample(&mut self, word: u16) -> u16 {
        let Ok((channel, _, reference)) = decode_entry(word) else {
            return 0;
        };
        if reference == VoltageRef::Off {
            return 0;
        }
        if let AdcChannel::Io(pin) = channel {
            if let Some(code) = self.io_override.get(pin as usize).copied().flatten() {
                return code;
            }
            let bit = 1u8 << pin;
            if self.io_enabled & bit != 0 {
                return if self.io_level & bit != 0 { IO_HIGH_CODE } else { 0 };
            }
        }
        if channel == AdcChannel::Mcur && self.driver_config & DIS_DRV != 0 {
            self.mcur_driver_disabled += 1;
        }
        let index = channel.number() as usize;
        match self.queued[index].pop_front() {
            Some(code) => code,
            None => self.inputs[index],
        }
    }

    /// Convert the entry under the cursor and advance, wrapping at the marker
    fn convert_next(&mut self) -> bool {
        let Some(&word) = self.adc.source.get(self.adc.cursor) else {
            return false;
        };
        if word == END_OF_TABLE {
            return false;
        }
        let value = self.sample(word);
        if let Some(target) = self.adc.destination {
            target.store(self.adc.cursor, value);
        }
        self.adc.cursor += 1;
        self.adc.conversions += 1;
        true
    }

    fn at_end(&self) -> bool {
        self.adc
            .source
            .get(self.adc.cursor)
            .map_or(true, |&w| w == END_OF_TABLE)
    }

    fn write_control(&mut self, bits: u16) {
        let was_started = self.adc.control & ctrl::START != 0;
        self.adc.control = bits;

        if bits & ctrl::START == 0 {
            self.adc.busy_polls = None;
            self.adc.in_flight = false;
            return;
        }
        if !was_started {
            self.adc.cursor = 0;
            self.adc.hw_pass = bits & ctrl::TRIG_SRC != 0;
        }
        if bits & ctrl::SOFT_TRIG != 0 && self.adc.busy_polls.is_none() {
            if self.adc.in_flight {
                self.adc.in_flight = false;
                self.convert_next();
            } else if !self.adc.hw_pass {
                while self.convert_next() {}
            }
            self.adc.busy_polls = Some(self.adc.latency);
        }
    }

    fn poll_control(&mut self) -> u16 {
        if let Some(polls) = self.adc.busy_polls {
            if polls == 0 {
                self.adc.busy_polls = None;
                self.adc.control &= !(ctrl::START | ctrl::SOFT_TRIG);
                self.adc.completion_pending = true;
            } else {
                self.adc.busy_polls = Some(polls - 1);
            }
        }
        self.adc.control
    }

    fn hardware_loop_running(&self) -> bool {
        let c = self.adc.control;
        c & ctrl::START != 0 && c & ctrl::LOOP != 0 && c & ctrl::TRIG_SRC != 0
    }
}

/// Simulated chip
#[derive(Clone)]
pub struct SimChip {
    state: Rc<RefCell<ChipState>>,
}

impl Default for SimChip {
    fn default() -> Self {
        Self::new()
    }
}

impl SimChip {
    /// Create a chip in its reset state
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(ChipState::new())),
        }
    }

    /// Handle to one interrupt group's registers
    pub fn irq_group(&self, index: usize) -> HalResult<SimIrqGroup> {
        if index >= SIM_GROUPS {
            return Err(HalError::InvalidBit(index as u8));
        }
        Ok(SimIrqGroup {
            state: self.state.clone(),
            index,
        })
    }

    /// Handle to the ADC front end
    pub fn adc(&self) -> SimAdc {
        SimAdc {
            state: self.state.clone(),
        }
    }

    /// Handle to the analog I/O port
    pub fn io(&self) -> SimIo {
        SimIo {
            state: self.state.clone(),
        }
    }

    /// Handle to the driver stage
    pub fn driver(&self) -> SimDriver {
        SimDriver {
            state: self.state.clone(),
        }
    }

    /// Delay provider recording every requested delay
    pub fn delay(&self) -> SimDelay {
        SimDelay {
            state: self.state.clone(),
        }
    }

    /// Raise interrupt sources from the hardware side
    pub fn raise(&self, group: usize, bits: u16) {
        if let Some(g) = self.state.borrow_mut().groups.get_mut(group) {
            g.pending |= bits;
        }
    }

    /// Pending and mask registers of a group
    pub fn group_registers(&self, group: usize) -> Option<(u16, u16)> {
        self.state
            .borrow()
            .groups
            .get(group)
            .map(|g| (g.pending, g.mask))
    }

    /// Set the steady value of an analog channel
    pub fn set_input(&self, channel: AdcChannel, code: u16) {
        self.state.borrow_mut().inputs[channel.number() as usize] = code;
    }

    /// Queue a one-time value, consumed before the steady value
    pub fn queue_input(&self, channel: AdcChannel, code: u16) -> HalResult<()> {
        self.state.borrow_mut().queued[channel.number() as usize]
            .push_back(code)
            .map_err(|_| HalError::InvalidChannel(channel.number()))
    }

    /// Force the code read back from an I/O pin, or restore normal loopback
    pub fn set_io_readback(&self, pin: u8, code: Option<u16>) -> HalResult<()> {
        let mut state = self.state.borrow_mut();
        let slot = state
            .io_override
            .get_mut(pin as usize)
            .ok_or(HalError::InvalidPin(pin))?;
        *slot = code;
        Ok(())
    }

    /// Make level writes to `pin` fail, or accept them again
    pub fn set_io_locked(&self, pin: u8, locked: bool) -> HalResult<()> {
        let bit = SimIo::bit(pin)?;
        let mut state = self.state.borrow_mut();
        if locked {
            state.io_locked |= bit;
        } else {
            state.io_locked &= !bit;
        }
        Ok(())
    }

    /// Number of control register polls a soft-triggered pass takes
    pub fn set_conversion_latency(&self, polls: u8) {
        self.state.borrow_mut().adc.latency = polls;
    }

    /// Run one PWM period: a running hardware loop converts the whole table
    pub fn pwm_cycle(&self) {
        let mut state = self.state.borrow_mut();
        if !state.hardware_loop_running() {
            return;
        }
        state.adc.in_flight = false;
        while state.convert_next() {}
        state.adc.cursor = 0;
        state.adc.completion_pending = true;
    }

    /// Convert `entries` entries of a running loop and start the next one
    ///
    /// The started conversion stays in flight until the next trigger.
    pub fn pwm_partial(&self, entries: usize) {
        let mut state = self.state.borrow_mut();
        if !state.hardware_loop_running() {
            return;
        }
        for _ in 0..entries {
            if !state.convert_next() {
                state.adc.cursor = 0;
            }
        }
        state.adc.in_flight = !state.at_end();
    }

    /// Front end control register, without advancing a conversion
    pub fn adc_control(&self) -> u16 {
        self.state.borrow().adc.control
    }

    /// Address of the active table
    pub fn adc_source(&self) -> &'static [u16] {
        self.state.borrow().adc.source
    }

    /// Check the conversion-complete interrupt mask
    pub fn completion_irq_enabled(&self) -> bool {
        self.state.borrow().adc.completion_irq
    }

    /// Check if a conversion is started but not stored
    pub fn conversion_in_flight(&self) -> bool {
        self.state.borrow().adc.in_flight
    }

    /// Total conversions performed
    pub fn conversion_count(&self) -> usize {
        self.state.borrow().adc.conversions
    }

    /// Current samples taken while the driver stage was disabled
    pub fn current_samples_with_driver_disabled(&self) -> usize {
        self.state.borrow().mcur_driver_disabled
    }

    /// Driver configuration register
    pub fn driver_config(&self) -> u16 {
        self.state.borrow().driver_config
    }

    /// Set the driver configuration register
    pub fn set_driver_config(&self, bits: u16) {
        self.state.borrow_mut().driver_config = bits;
    }

    /// Output enable register of the I/O port
    pub fn io_output_enable(&self) -> u8 {
        self.state.borrow().io_enabled
    }

    /// Output level register of the I/O port
    pub fn io_output_level(&self) -> u8 {
        self.state.borrow().io_level
    }

    /// Program the I/O port registers directly
    pub fn set_io(&self, enabled: u8, level: u8) {
        let mut state = self.state.borrow_mut();
        state.io_enabled = enabled;
        state.io_level = level;
    }

    /// Every delay requested so far, in nanoseconds
    pub fn delays(&self) -> Vec<u32> {
        self.state.borrow().delays.clone()
    }

    /// Forget recorded delays
    pub fn clear_delays(&self) {
        self.state.borrow_mut().delays.clear();
    }
}

/// Register pair of one simulated interrupt group
pub struct SimIrqGroup {
    state: Rc<RefCell<ChipState>>,
    index: usize,
}

impl IrqGroupRegisters for SimIrqGroup {
    fn pending(&self) -> u16 {
        self.state.borrow().groups[self.index].pending
    }

    fn mask(&self) -> u16 {
        self.state.borrow().groups[self.index].mask
    }

    fn write_mask(&mut self, bits: u16) {
        self.state.borrow_mut().groups[self.index].mask = bits;
    }

    fn latch_pending(&mut self, bits: u16) {
        self.state.borrow_mut().groups[self.index].pending |= bits;
    }

    fn clear_pending(&mut self, bits: u16) {
        self.state.borrow_mut().groups[self.index].pending &= !bits;
    }
}

/// Simulated ADC front end
pub struct SimAdc {
    state: Rc<RefCell<ChipState>>,
}

impl AdcFrontEnd for SimAdc {
    fn control(&self) -> u16 {
        self.state.borrow_mut().poll_control()
    }

    fn write_control(&mut self, bits: u16) {
        self.state.borrow_mut().write_control(bits);
    }

    fn set_source(&mut self, table: &'static [u16]) {
        let mut state = self.state.borrow_mut();
        state.adc.source = table;
        state.adc.cursor = 0;
    }

    fn set_destination(&mut self, target: DmaTarget) {
        self.state.borrow_mut().adc.destination = Some(target);
    }

    fn completion_pending(&self) -> bool {
        self.state.borrow().adc.completion_pending
    }

    fn clear_completion(&mut self) {
        self.state.borrow_mut().adc.completion_pending = false;
    }

    fn set_completion_irq(&mut self, enabled: bool) {
        self.state.borrow_mut().adc.completion_irq = enabled;
    }

    fn completion_irq_enabled(&self) -> bool {
        self.state.borrow().adc.completion_irq
    }
}

/// Simulated analog I/O port
pub struct SimIo {
    state: Rc<RefCell<ChipState>>,
}

impl SimIo {
    fn bit(pin: u8) -> HalResult<u8> {
        if pin < SIM_IO_PINS {
            Ok(1 << pin)
        } else {
            Err(HalError::InvalidPin(pin))
        }
    }
}

impl AnalogIoPort for SimIo {
    fn pin_count(&self) -> u8 {
        SIM_IO_PINS
    }

    fn output_enabled(&self, pin: u8) -> HalResult<bool> {
        let bit = Self::bit(pin)?;
        Ok(self.state.borrow().io_enabled & bit != 0)
    }

    fn set_output_enabled(&mut self, pin: u8, enabled: bool) -> HalResult<()> {
        let bit = Self::bit(pin)?;
        let mut state = self.state.borrow_mut();
        if enabled {
            state.io_enabled |= bit;
        } else {
            state.io_enabled &= !bit;
        }
        Ok(())
    }

    fn output_level(&self, pin: u8) -> HalResult<Level> {
        let bit = Self::bit(pin)?;
        Ok(Level::from(self.state.borrow().io_level & bit != 0))
    }

    fn set_output_level(&mut self, pin: u8, level: Level) -> HalResult<()> {
        let bit = Self::bit(pin)?;
        let mut state = self.state.borrow_mut();
        if state.io_locked & bit != 0 {
            return Err(HalError::InvalidPin(pin));
        }
        match level {
            Level::High => state.io_level |= bit,
            Level::Low => state.io_level &= !bit,
        }
        Ok(())
    }
}

/// Simulated driver stage
pub struct SimDriver {
    state: Rc<RefCell<ChipState>>,
}

impl DriverStage for SimDriver {
    fn config(&self) -> u16 {
        self.state.borrow().driver_config
    }

    fn write_config(&mut self, bits: u16) {
        self.state.borrow_mut().driver_config = bits;
    }
}

/// Delay provider that records instead of waiting
pub struct SimDelay {
    state: Rc<RefCell<ChipState>>,
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.state.borrow_mut().delays.push(ns);
    }
}
