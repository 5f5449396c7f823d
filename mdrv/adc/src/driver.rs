//! Motor ADC driver
//!
//! [`AdcDriver`] ties the sequencer to the results record and the
//! calibration state. It runs the power-up self-test, selects and starts the
//! motor-run table, and converts the latest raw samples on request.

use embedded_hal::delay::DelayNs;
use mdrv_core::{DiagnosticLog, ElectricFault, ErrorCode, MdrvResult};
use mdrv_hal::adc::{AdcFrontEnd, DmaTarget};
use mdrv_hal::driver::{DriverStage, DIS_DRV};
use mdrv_hal::gpio::{AnalogIoPort, Level};
use mdrv_hal::HalResult;

use crate::calibration::{validate_offset, CalibrationState};
use crate::config::AdcConfig;
use crate::convert;
use crate::record::{Field, RecordLayout, ResultsRecord, SelfTestPass, SelfTestRecord};
use crate::sequencer::{Sequencer, State};
use crate::table::{self, Phase, PhaseMode, SequenceTable, Topology};

/// ADC driver of the stepper motor
pub struct AdcDriver<A, D, P, S> {
    sequencer: Sequencer<A, D>,
    io: P,
    stage: S,
    record: &'static ResultsRecord,
    layout: RecordLayout,
    topology: Topology,
    config: AdcConfig,
    calibration: CalibrationState,
    fault: ElectricFault,
}

impl<A, D, P, S> AdcDriver<A, D, P, S>
where
    A: AdcFrontEnd,
    D: DelayNs,
    P: AnalogIoPort,
    S: DriverStage,
{
    /// Create the driver; call [`init`](Self::init) before anything else
    pub fn new(
        adc: A,
        delay: D,
        io: P,
        stage: S,
        record: &'static ResultsRecord,
        config: AdcConfig,
    ) -> Self {
        let motor = config.motor;
        let phase = table::phase_for(motor.pairing, motor.topology, 0);
        let run = table::select(motor.topology, motor.phase_short_detection, phase);
        Self {
            sequencer: Sequencer::new(adc, delay, config.timing),
            io,
            stage,
            record,
            layout: RecordLayout::for_table(run),
            topology: motor.topology,
            config,
            calibration: CalibrationState::default(),
            fault: ElectricFault::None,
        }
    }

    /// Run `table` once into `target`
    ///
    /// Stops the sequencer first, so the pass cannot be refused.
    fn single_shot(&mut self, table: &SequenceTable, target: DmaTarget) {
        self.sequencer.stop();
        if let Err(e) = self.sequencer.start_software(table, target) {
            error!("single-shot refused: {}", e);
        }
    }

    fn measure_scratch(&mut self, table: &SequenceTable) -> u16 {
        let scratch = self.record.scratch_target();
        self.single_shot(table, scratch);
        self.record.scratch()
    }

    fn fail(&mut self, code: ErrorCode, log: &mut impl DiagnosticLog) {
        error!("self-test: {}", code);
        self.fault.set_permanent();
        log.log_error(code);
    }

    /// Power-up self-test and zero current calibration
    ///
    /// Electrical problems do not abort the test; they are logged and leave
    /// the returned fault permanent.
    pub fn init(&mut self, log: &mut impl DiagnosticLog) -> ElectricFault {
        self.sequencer.stop();
        let limits = self.config.limits;

        let vdda = self.measure_scratch(&table::VDDA);
        if !limits.vdda_ok(vdda) {
            self.fail(ErrorCode::Vdda, log);
        }
        let vddd = self.measure_scratch(&table::VDDD);
        if !limits.vddd_ok(vddd) {
            self.fail(ErrorCode::Vddd, log);
        }

        for pin in 0..self.io.pin_count() {
            if self.io.output_enabled(pin) != Ok(true) {
                continue;
            }
            let passed = self.io_loopback(pin).unwrap_or_else(|e| {
                error!("io {} loopback: {}", pin, e);
                false
            });
            if !passed {
                if let Err(e) = self.io.set_output_enabled(pin, false) {
                    error!("io {} stays enabled: {}", pin, e);
                }
                self.fail(ErrorCode::Vio(pin), log);
            }
        }

        let measured = self.measure_zero_offset();
        self.calibration.current_gain = self.config.calibration.current_gain;
        let offset = validate_offset(measured, self.config.calibration.stored_zero_offset);
        if offset != measured {
            warn!("zero current offset {} implausible, using {}", measured, offset);
        }
        self.calibration.zero_current_offset = offset;
        debug!("zero current offset {}", offset);

        self.fault
    }

    /// Drive `pin` high then low and read it back
    ///
    /// The pin's driven level is restored after each half of the check.
    fn io_loopback(&mut self, pin: u8) -> HalResult<bool> {
        let Some(probe) = table::IO_PROBES.get(pin as usize) else {
            return Ok(true);
        };
        let level = self.io.output_level(pin)?;
        let limits = self.config.limits;

        self.io.set_output_level(pin, Level::High)?;
        let high = self.measure_scratch(probe);
        self.io.set_output_level(pin, level)?;
        if high < limits.io_high_min {
            return Ok(false);
        }

        self.io.set_output_level(pin, Level::Low)?;
        let low = self.measure_scratch(probe);
        self.io.set_output_level(pin, level)?;
        Ok(low <= limits.io_low_max)
    }

    /// Average of two current samples taken with the driver stage enabled
    fn measure_zero_offset(&mut self) -> u16 {
        let saved = self.stage.config();
        self.stage.write_config(saved & !DIS_DRV);

        let first = self.measure_scratch(&table::CURRENT_OFFSET);
        let second = match self.sequencer.retrigger() {
            Ok(()) => self.record.scratch(),
            Err(_) => first,
        };

        self.stage.write_config(saved);
        ((first as u32 + second as u32) >> 1) as u16
    }

    /// Start motor-run acquisition for `topology`
    pub fn start(&mut self, topology: Topology, mode: PhaseMode) -> MdrvResult<()> {
        let motor = self.config.motor;
        let index = mode.resolve(motor.micro_step_bits, motor.double_micro_step);
        let phase = table::phase_for(motor.pairing, topology, index);
        let run = table::select(topology, motor.phase_short_detection, phase);

        self.sequencer.stop();
        self.layout = RecordLayout::for_table(run);
        self.topology = topology;
        let target = self.record.run_target();
        self.sequencer.start_hardware_loop(run, target)
    }

    /// Stop acquisition
    pub fn stop(&mut self) {
        self.sequencer.stop();
    }

    /// Stop acquisition and switch the reference off
    pub fn power_off(&mut self) {
        let scratch = self.record.scratch_target();
        self.sequencer.power_off(scratch);
    }

    /// Run one motor self-test pass into `record`
    pub fn start_self_test(
        &mut self,
        pass: SelfTestPass,
        record: &'static SelfTestRecord,
    ) -> MdrvResult<()> {
        self.sequencer.stop();
        self.sequencer.start_hardware_loop(pass.table(), record.target())
    }

    fn raw(&self, field: Field) -> u16 {
        self.record.get(&self.layout, field)
    }

    /// Supply voltage [10 mV]
    pub fn get_supply_voltage(&self) -> i16 {
        let cal = &self.config.calibration;
        convert::voltage(self.raw(Field::SupplyVoltage), cal.adc_offset, cal.adc_gain)
    }

    /// Motor driver voltage [10 mV]
    pub fn get_motor_voltage(&self) -> i16 {
        let cal = &self.config.calibration;
        let (offset, gain) = if self.config.motor.filtered_vsm {
            (cal.motor_voltage_offset, cal.motor_voltage_gain)
        } else {
            (cal.adc_offset, cal.adc_gain)
        };
        convert::voltage(self.raw(Field::DriverVoltage), offset, gain)
    }

    /// Watched phase voltage [10 mV]
    pub fn get_phase_voltage(&self) -> i16 {
        let cal = &self.config.calibration;
        convert::phase_voltage(self.raw(Field::PhaseVoltage), cal.adc_offset, cal.adc_gain)
    }

    /// Chip temperature [°C]
    ///
    /// Except on the first call, the result moves by at most one degree
    /// when the raw reading jumps.
    pub fn get_chip_temperature(&mut self, is_first_call: bool) -> i16 {
        let code = self.raw(Field::Temperature);
        let naive = self.config.calibration.temperature.temperature(code);
        let temperature =
            convert::limit_jump(naive, self.calibration.last_temperature, is_first_call);
        self.calibration.last_temperature = temperature;
        temperature
    }

    /// Zero the temperature sample
    pub fn reset_chip_temperature(&mut self) {
        self.record.set(&self.layout, Field::Temperature, 0);
    }

    /// Raw supply voltage code
    pub fn raw_supply(&self) -> u16 {
        self.raw(Field::SupplyVoltage)
    }

    /// Raw temperature code
    pub fn raw_temperature(&self) -> u16 {
        self.raw(Field::Temperature)
    }

    /// Offset corrected driver current [ADC LSB]
    pub fn get_motor_current_raw(&self) -> u16 {
        let offset = self.calibration.zero_current_offset;
        if self.topology.is_multi_coil() {
            let (a, b) = critical_section::with(|_| {
                (self.raw(Field::CurrentA), self.raw(Field::CurrentB))
            });
            convert::current_dual(a, b, offset)
        } else {
            convert::current_single(self.raw(Field::CurrentA), offset)
        }
    }

    /// Driver current [mA]
    pub fn get_motor_current_scaled(&self) -> i16 {
        convert::current_scaled(self.get_motor_current_raw(), self.calibration.current_gain)
    }

    /// Single-shot motor voltage, supply voltage and temperature
    pub fn measure_supply_and_temperature(&mut self) {
        let record = self.record;
        let layout = self.layout;
        self.single_shot(&table::MOTOR_VOLTAGE, record.field_target(&layout, Field::DriverVoltage));
        self.single_shot(&table::SUPPLY_VOLTAGE, record.field_target(&layout, Field::SupplyVoltage));
        self.single_shot(&table::TEMPERATURE, record.field_target(&layout, Field::Temperature));
    }

    /// Single-shot driver current with the driver stage enabled
    ///
    /// The second coil slot reads as zero current afterwards.
    pub fn measure_motor_current(&mut self) {
        self.sequencer.stop();
        let saved = self.stage.config();
        self.stage.write_config(saved & !DIS_DRV);

        let offset = self.calibration.zero_current_offset;
        self.record.set(&self.layout, Field::CurrentA, offset);
        self.record.set(&self.layout, Field::CurrentB, offset);
        let target = self.record.field_target(&self.layout, Field::CurrentA);
        self.single_shot(&table::MOTOR_CURRENT, target);

        self.stage.write_config(saved);
    }

    /// Single-shot voltage of `phase` [10 mV]
    pub fn measure_phase_voltage(&mut self, phase: Phase) -> i16 {
        let code = self.measure_scratch(&table::PHASE_PROBES[phase.index()]);
        let cal = &self.config.calibration;
        convert::phase_voltage(code, cal.adc_offset, cal.adc_gain)
    }

    /// Fault recorded by the self-test
    pub fn electric_fault(&self) -> ElectricFault {
        self.fault
    }

    /// Calibration derived at power-up
    pub fn calibration(&self) -> &CalibrationState {
        &self.calibration
    }

    /// Driver configuration
    pub fn config(&self) -> &AdcConfig {
        &self.config
    }

    /// Sequencer state
    pub fn state(&self) -> State {
        self.sequencer.state()
    }

    /// Field layout of the active motor-run table
    pub fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    /// Release the peripherals
    pub fn free(self) -> (A, D, P, S) {
        let (adc, delay) = self.sequencer.free();
        (adc, delay, self.io, self.stage)
    }
}
