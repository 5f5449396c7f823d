//! Diagnostic log tests for mdrv-core

use mdrv_core::{DiagnosticLog, ElectricFault, ErrorCode, ErrorLog, MdrvError};

#[test]
fn test_error_log_order() {
    let mut log: ErrorLog<4> = ErrorLog::new();
    log.log_error(ErrorCode::Vddd);
    log.log_error(ErrorCode::Vio(0));

    let codes: Vec<u8> = log.iter().map(|c| c.raw()).collect();
    assert_eq!(codes, vec![0xE2, 0xE8]);
}

#[test]
fn test_error_log_clear() {
    let mut log: ErrorLog<4> = ErrorLog::new();
    log.log_error(ErrorCode::Vdda);
    log.clear();
    assert!(log.is_empty());
    assert_eq!(log.last(), None);
}

#[test]
fn test_electric_fault_is_sticky() {
    let mut fault = ElectricFault::default();
    assert!(!fault.is_faulted());
    fault.set_permanent();
    fault.set_permanent();
    assert_eq!(fault, ElectricFault::Permanent);
}

#[test]
fn test_error_display() {
    assert_eq!(format!("{}", MdrvError::SequencerBusy), "ADC sequencer is busy");
    assert_eq!(format!("{}", ErrorCode::Vio(5)), "IO5 loopback mismatch");
}
