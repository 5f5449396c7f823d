//! Second-level controller tests on the simulated chip

use mdrv_hal::sim::{SimChip, SimIrqGroup};
use mdrv_itc::{Binding, BindingTable, Group, SecondLevelController, Source};

type Controller = SecondLevelController<SimIrqGroup>;

#[derive(Default)]
struct Trace {
    served: Vec<Source>,
}

fn on_pwma(ctl: &mut Controller, trace: &mut Trace) {
    ctl.acknowledge(Source::PWMA);
    trace.served.push(Source::PWMA);
}

fn on_over_temp(ctl: &mut Controller, trace: &mut Trace) {
    ctl.acknowledge(Source::OVER_TEMP);
    trace.served.push(Source::OVER_TEMP);
}

fn on_over_current(ctl: &mut Controller, trace: &mut Trace) {
    ctl.acknowledge(Source::OVER_CURRENT);
    trace.served.push(Source::OVER_CURRENT);
}

fn on_vsup_uv(ctl: &mut Controller, trace: &mut Trace) {
    // Serving one source masks another; its condition stays latched.
    ctl.acknowledge(Source::VSUP_UV);
    ctl.disable(Source::OVER_CURRENT);
    trace.served.push(Source::VSUP_UV);
}

static BINDINGS: BindingTable<SimIrqGroup, Trace> = BindingTable::new(&[
    Binding::new(Source::PWMA, on_pwma),
    Binding::new(Source::VSUP_UV, on_vsup_uv),
    Binding::new(Source::OVER_TEMP, on_over_temp),
    Binding::new(Source::OVER_CURRENT, on_over_current),
]);

fn controller(chip: &SimChip) -> Controller {
    let regs = [0, 1, 2, 3, 4].map(|i| chip.irq_group(i).unwrap());
    let mut ctl = SecondLevelController::new(regs);
    ctl.init();
    ctl
}

#[test]
fn test_init_clears_all_groups() {
    let chip = SimChip::new();
    for group in 0..5 {
        chip.raise(group, 0xFFFF);
    }
    let ctl = controller(&chip);

    for group in Group::ALL {
        assert_eq!(ctl.group(group).pending(), 0x0000);
        assert_eq!(ctl.group(group).mask(), 0x0000);
    }
}

#[test]
fn test_enable_then_disable_keeps_pending() {
    let chip = SimChip::new();
    let mut ctl = controller(&chip);
    let source = Source::new(Group::ExtIo, 2).unwrap();

    ctl.enable(source);
    assert_eq!(chip.group_registers(3), Some((0x0004, 0x0004)));

    ctl.disable(source);
    assert_eq!(chip.group_registers(3), Some((0x0004, 0x0000)));
    assert!(ctl.is_pending(source));
    assert!(!ctl.is_enabled(source));
}

#[test]
fn test_dispatch_serves_lowest_bit_first() {
    let chip = SimChip::new();
    let mut ctl = controller(&chip);
    let mut trace = Trace::default();

    ctl.enable(Source::OVER_TEMP);
    ctl.enable(Source::OVER_CURRENT);
    ctl.acknowledge(Source::OVER_TEMP);
    ctl.acknowledge(Source::OVER_CURRENT);

    chip.raise(4, Source::OVER_CURRENT.mask() | Source::OVER_TEMP.mask());
    let served = ctl.dispatch(Group::Diagnostic, &BINDINGS, &mut trace);

    assert_eq!(served, 2);
    assert_eq!(trace.served, vec![Source::OVER_TEMP, Source::OVER_CURRENT]);
    assert_eq!(ctl.group(Group::Diagnostic).active(), 0);
}

#[test]
fn test_enable_latches_and_dispatches() {
    let chip = SimChip::new();
    let mut ctl = controller(&chip);
    let mut trace = Trace::default();

    ctl.enable(Source::PWMA);
    assert_eq!(ctl.dispatch_once(Group::Pwm, &BINDINGS, &mut trace), Some(Source::PWMA));
    assert_eq!(ctl.dispatch_once(Group::Pwm, &BINDINGS, &mut trace), None);
}

#[test]
fn test_reenable_unacknowledged_source_redispatches() {
    let chip = SimChip::new();
    let mut ctl = controller(&chip);
    let mut trace = Trace::default();

    ctl.enable(Source::VSUP_UV);
    ctl.enable(Source::OVER_CURRENT);
    ctl.acknowledge(Source::OVER_CURRENT);
    chip.raise(4, Source::OVER_CURRENT.mask());

    // VSUP_UV is served first and masks OVER_CURRENT before its turn.
    ctl.dispatch(Group::Diagnostic, &BINDINGS, &mut trace);
    assert_eq!(trace.served, vec![Source::VSUP_UV]);
    assert!(ctl.is_pending(Source::OVER_CURRENT));

    ctl.enable(Source::OVER_CURRENT);
    ctl.dispatch(Group::Diagnostic, &BINDINGS, &mut trace);
    assert_eq!(trace.served, vec![Source::VSUP_UV, Source::OVER_CURRENT]);
}

#[test]
fn test_unbound_source_changes_nothing() {
    let chip = SimChip::new();
    let mut ctl = controller(&chip);
    let mut trace = Trace::default();

    ctl.enable(Source::T1_IRQ3);
    let served = ctl.dispatch_once(Group::Timer1, &BINDINGS, &mut trace);

    assert_eq!(served, Some(Source::T1_IRQ3));
    assert!(trace.served.is_empty());
    assert_eq!(chip.group_registers(1), Some((0x0004, 0x0004)));
    assert!(!BINDINGS.is_bound(Source::T1_IRQ3));
}

#[test]
#[should_panic(expected = "bound twice")]
fn test_duplicate_binding_rejected() {
    let bindings: &'static [Binding<SimIrqGroup, Trace>] = Box::leak(Box::new([
        Binding::new(Source::PWMA, on_pwma),
        Binding::new(Source::PWMA, on_over_temp),
    ]));
    let _ = BindingTable::new(bindings);
}
