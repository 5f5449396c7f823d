//! Register access tests against plain memory

use mdrv_hal::adc::{ctrl, AdcFrontEnd, DmaTarget, ResultSlot};
use mdrv_hal::driver::{DriverStage, DIS_DRV};
use mdrv_hal::gpio::{AnalogIoPort, Level};
use mdrv_hal::{HalError, IrqGroupRegisters};
use mdrv_hal_mlx::registers::{AdcBlock, AnalogIoBlock, DriverBlock, IrqGroupBlock};
use mdrv_hal_mlx::{MlxAdc, MlxDriver, MlxIo, MlxIrqGroup, MmioRef};

fn block<T>(words: usize) -> MmioRef<T> {
    let mem: &'static mut [u16] = Box::leak(vec![0u16; words].into_boxed_slice());
    unsafe { MmioRef::new(mem.as_mut_ptr() as *const T) }
}

#[test]
fn test_irq_group_mask_and_pending() {
    let mut group = MlxIrqGroup::new(block::<IrqGroupBlock>(2));
    group.write_mask(0x0004);
    group.latch_pending(0x0004);

    assert_eq!(group.mask(), 0x0004);
    assert_eq!(group.active(), 0x0004);
}

#[test]
fn test_enable_and_acknowledge_write_the_same_pending_word() {
    let mut group = MlxIrqGroup::new(block::<IrqGroupBlock>(2));
    group.latch_pending(0x0010);
    let enabled = group.pending();
    group.clear_pending(0x0010);

    assert_eq!(enabled, 0x0010);
    assert_eq!(group.pending(), enabled);
    assert_eq!(group.mask(), 0);
}

#[test]
fn test_adc_control_and_completion() {
    let mut adc = MlxAdc::new(block::<AdcBlock>(5));
    adc.write_control(ctrl::HW_LOOP | ctrl::START);
    assert!(adc.is_busy());

    adc.set_completion_irq(true);
    assert!(adc.completion_irq_enabled());
    adc.set_completion_irq(false);
    assert!(!adc.completion_irq_enabled());
}

#[test]
fn test_adc_destination_address() {
    static SLOTS: [ResultSlot; 2] = [ResultSlot::new(), ResultSlot::new()];
    let regs = block::<AdcBlock>(5);
    let mut adc = MlxAdc::new(regs);
    adc.set_destination(DmaTarget::new(&SLOTS));

    let expected = SLOTS.as_ptr() as usize as u16;
    assert_eq!(tock_registers::interfaces::Readable::get(&regs.dbase), expected);
}

#[test]
fn test_io_pins() {
    let mut io = MlxIo::new(block::<AnalogIoBlock>(2));
    io.set_output_enabled(5, true).unwrap();
    io.set_output_level(5, Level::High).unwrap();
    io.set_output_level(5, Level::Low).unwrap();

    assert_eq!(io.output_enabled(5), Ok(true));
    assert_eq!(io.output_level(5), Ok(Level::Low));
    assert_eq!(io.output_enabled(6), Err(HalError::InvalidPin(6)));
}

#[test]
fn test_driver_enable_bit() {
    let mut driver = MlxDriver::new(block::<DriverBlock>(1));
    driver.write_config(DIS_DRV);
    assert!(!driver.is_enabled());
    driver.write_config(0);
    assert!(driver.is_enabled());
}
