//! Sequencer state machine tests on the simulated chip

use mdrv_adc::table::{self, Phase, Topology};
use mdrv_adc::{Field, Mode, RecordLayout, ResultsRecord, Sequencer, State, TimingConfig};
use mdrv_core::MdrvError;
use mdrv_hal::adc::{ctrl, AdcChannel, AdcFrontEnd, DmaTarget, ResultSlot};
use mdrv_hal::sim::{SimAdc, SimChip, SimDelay};

fn sequencer(chip: &SimChip) -> Sequencer<SimAdc, SimDelay> {
    Sequencer::new(chip.adc(), chip.delay(), TimingConfig::default())
}

#[test]
fn test_settling_delay_only_after_power_off() {
    static SLOT: ResultSlot = ResultSlot::new();
    let chip = SimChip::new();
    chip.set_input(AdcChannel::Vdda, 660);
    let mut seq = sequencer(&chip);
    assert!(seq.is_powered_off());

    seq.start_software(&table::VDDA, DmaTarget::single(&SLOT)).unwrap();
    assert_eq!(SLOT.get(), 660);
    assert_eq!(chip.delays(), vec![50_000, 2_000]);
    assert_eq!(seq.state(), State::Idle);
    assert!(!seq.is_powered_off());

    chip.clear_delays();
    seq.start_software(&table::VDDA, DmaTarget::single(&SLOT)).unwrap();
    assert_eq!(chip.delays(), vec![2_000]);
    assert_eq!(chip.adc_control() & ctrl::START, 0);
}

#[test]
fn test_retrigger_repeats_last_pass() {
    static SLOT: ResultSlot = ResultSlot::new();
    let chip = SimChip::new();
    let mut seq = sequencer(&chip);
    assert_eq!(seq.retrigger(), Err(MdrvError::NotConfigured));

    chip.queue_input(AdcChannel::Mcur, 98).unwrap();
    chip.queue_input(AdcChannel::Mcur, 104).unwrap();
    seq.start_software(&table::CURRENT_OFFSET, DmaTarget::single(&SLOT)).unwrap();
    assert_eq!(SLOT.get(), 98);

    chip.clear_delays();
    seq.retrigger().unwrap();
    assert_eq!(SLOT.get(), 104);
    assert!(chip.delays().is_empty());
}

#[test]
fn test_hardware_loop_runs_until_stopped() {
    static RECORD: ResultsRecord = ResultsRecord::new();
    let chip = SimChip::new();
    let mut seq = sequencer(&chip);
    let run = table::select(Topology::DoubleMirror, false, Phase::U);

    seq.start_hardware_loop(run, RECORD.run_target()).unwrap();
    assert_eq!(chip.adc_control(), ctrl::HW_LOOP | ctrl::START);
    assert_eq!(seq.state(), State::Running(Mode::HardwareLoop));
    assert_eq!(chip.delays(), vec![50_000]);
    assert_eq!(chip.adc_source(), run.words());

    chip.pwm_cycle();
    chip.pwm_cycle();
    assert_eq!(chip.conversion_count(), 8);

    // tables cannot change under a running loop
    assert_eq!(
        seq.configure(&table::VDDA, RECORD.scratch_target()),
        Err(MdrvError::SequencerBusy)
    );
    assert_eq!(
        seq.start_software(&table::VDDA, RECORD.scratch_target()),
        Err(MdrvError::SequencerBusy)
    );
    assert_eq!(chip.adc_source(), run.words());

    seq.stop();
    assert_eq!(seq.state(), State::Idle);
    assert_eq!(chip.adc_control(), 0);
}

#[test]
fn test_stop_drains_conversion_in_flight() {
    static RECORD: ResultsRecord = ResultsRecord::new();
    let chip = SimChip::new();
    chip.set_input(AdcChannel::Tj, 333);
    let mut seq = sequencer(&chip);
    let run = table::select(Topology::DoubleMirror, false, Phase::U);

    seq.start_hardware_loop(run, RECORD.run_target()).unwrap();
    chip.adc().set_completion_irq(true);
    chip.pwm_partial(2);
    assert!(chip.conversion_in_flight());

    chip.clear_delays();
    seq.stop();

    assert!(!chip.conversion_in_flight());
    assert_eq!(chip.conversion_count(), 3);
    let layout = RecordLayout::for_table(run);
    assert_eq!(RECORD.get(&layout, Field::Temperature), 333);
    assert!(chip.delays().iter().all(|&ns| ns == 7_000));
    assert!(!chip.delays().is_empty());
    assert_eq!(chip.adc_control(), 0);
    assert!(!chip.completion_irq_enabled());

    chip.pwm_cycle();
    assert_eq!(chip.conversion_count(), 3);
}

#[test]
fn test_configure_keeps_completion_irq_state() {
    static SLOT: ResultSlot = ResultSlot::new();
    let chip = SimChip::new();
    let mut seq = sequencer(&chip);

    chip.adc().set_completion_irq(true);
    seq.configure(&table::TEMPERATURE, DmaTarget::single(&SLOT)).unwrap();
    assert!(chip.completion_irq_enabled());
    assert_eq!(chip.adc_source(), table::TEMPERATURE.words());
}

#[test]
fn test_power_off_switches_reference_off() {
    static RECORD: ResultsRecord = ResultsRecord::new();
    let chip = SimChip::new();
    chip.set_input(AdcChannel::Vs, 512);
    let mut seq = sequencer(&chip);

    seq.start_software(&table::SUPPLY_VOLTAGE, RECORD.scratch_target()).unwrap();
    assert_eq!(RECORD.scratch(), 512);

    seq.power_off(RECORD.scratch_target());
    assert!(seq.is_powered_off());
    assert_eq!(chip.adc_source(), table::VREF_OFF.words());
    assert_eq!(RECORD.scratch(), 0);
    assert_eq!(chip.adc_control(), 0);

    chip.clear_delays();
    seq.start_software(&table::SUPPLY_VOLTAGE, RECORD.scratch_target()).unwrap();
    assert_eq!(chip.delays()[0], 50_000);
    assert_eq!(RECORD.scratch(), 512);
}
