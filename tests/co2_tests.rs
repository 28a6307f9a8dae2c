//! CO2 Sensor Tests
//!
//! Ready polling, warm-up, cache behavior and the command surface of the
//! SCD30 driver, against a scripted I2C bus.

mod common;

use std::cell::RefCell;

use common::{measurement, word_frame, FakeI2c, RecordingDisplay, Timeline};
use grove_firmware::acquisition::frame::crc8;
use grove_firmware::bus::{I2cAddress, RefCellDevice};
use grove_firmware::drivers::scd30::{cmd, Scd30};
use grove_firmware::error::{SensorError, SetupError, TransportError};
use grove_firmware::sensors::{Co2Sensor, Sensor};
use grove_firmware::types::Reading;

const ADDR: u8 = 0x61;
const READY: [u8; 2] = [0x02, 0x02];
const READ: [u8; 2] = [0x03, 0x00];

fn bus_with_scd30() -> RefCell<FakeI2c> {
    RefCell::new(FakeI2c::with_devices(&[ADDR]))
}

// ============================================================================
// Setup
// ============================================================================

#[test]
fn test_construction_starts_measurement_and_settles() {
    let bus = bus_with_scd30();
    let time = Timeline::new();
    let _sensor = Co2Sensor::new(RefCellDevice::new(&bus), time.delay(), None).unwrap();

    let writes = bus.borrow().writes_to(ADDR);
    assert_eq!(writes, vec![vec![0x00, 0x10, 0x00, 0x00, 0x81]]);
    assert_eq!(time.now_us(), 500_000);
}

#[test]
fn test_absent_device_is_setup_error() {
    let bus = RefCell::new(FakeI2c::with_devices(&[]));
    let time = Timeline::new();
    let result = Co2Sensor::new(RefCellDevice::new(&bus), time.delay(), None);
    assert!(matches!(
        result,
        Err(SetupError::DeviceAbsent { address: 0x61, .. })
    ));
}

#[test]
fn test_wrong_port_is_setup_error() {
    let bus = bus_with_scd30();
    let time = Timeline::new();
    let result = Co2Sensor::new(RefCellDevice::new(&bus), time.delay(), Some(2));
    assert!(matches!(result, Err(SetupError::WrongPort { .. })));
    // Rejected before touching the bus
    assert!(bus.borrow().writes.is_empty());
}

// ============================================================================
// Ready Polling
// ============================================================================

#[test]
fn test_warmup_after_bad_ready_frame() {
    let bus = bus_with_scd30();
    let time = Timeline::new();
    let delay = time.delay();
    let delays = delay.total_ms_calls.clone();
    let mut sensor = Co2Sensor::new(RefCellDevice::new(&bus), delay, None).unwrap();

    {
        let mut fake = bus.borrow_mut();
        // Corrupt checksum, then not ready, then ready
        fake.respond(ADDR, &READY, vec![0x00, 0x01, 0x00]);
        fake.respond(ADDR, &READY, word_frame(0));
        fake.respond(ADDR, &READY, word_frame(1));
        fake.respond(ADDR, &READ, measurement(300.0, 25.0, 40.0));
    }
    let before = delays.get();

    let reading = sensor.get_data().unwrap();

    assert_eq!(
        reading,
        Reading::Co2 {
            ppm: 300.0,
            fahrenheit: 77.0,
            humidity: 40.0,
        }
    );
    // Two warm-up polls: one not-ready, one ready
    assert_eq!(delays.get() - before, 2);
}

#[test]
fn test_cached_reading_returned_while_not_ready() {
    let bus = bus_with_scd30();
    let time = Timeline::new();
    let delay = time.delay();
    let delays = delay.total_ms_calls.clone();
    let mut sensor = Co2Sensor::new(RefCellDevice::new(&bus), delay, None).unwrap();

    bus.borrow_mut().respond(ADDR, &READY, word_frame(1));
    bus.borrow_mut().respond(ADDR, &READ, measurement(412.5, 20.0, 55.0));
    assert_eq!(sensor.co2(), 412.5);

    bus.borrow_mut().respond_always(ADDR, &READY, word_frame(0));
    bus.borrow_mut().respond_always(ADDR, &READ, measurement(999.0, 0.0, 0.0));
    let before = delays.get();

    assert_eq!(sensor.co2(), 412.5);
    assert_eq!(sensor.temperature(true), 20.0);
    assert_eq!(sensor.humidity(), 55.0);
    assert_eq!(delays.get(), before);
}

#[test]
fn test_corrupt_measurement_keeps_cache() {
    let bus = bus_with_scd30();
    let time = Timeline::new();
    let mut sensor = Co2Sensor::new(RefCellDevice::new(&bus), time.delay(), None).unwrap();

    bus.borrow_mut().respond(ADDR, &READY, word_frame(1));
    bus.borrow_mut().respond(ADDR, &READ, measurement(500.0, 21.0, 30.0));
    assert_eq!(sensor.co2(), 500.0);

    let mut bad = measurement(800.0, 21.0, 30.0);
    bad[2] ^= 0xFF;
    bus.borrow_mut().respond_always(ADDR, &READ, bad);
    assert_eq!(sensor.co2(), 500.0);
}

#[test]
fn test_show_data_uses_two_lines() {
    let bus = bus_with_scd30();
    let time = Timeline::new();
    let mut sensor = Co2Sensor::new(RefCellDevice::new(&bus), time.delay(), None).unwrap();
    bus.borrow_mut().respond(ADDR, &READY, word_frame(1));
    bus.borrow_mut().respond(ADDR, &READ, measurement(300.0, 25.0, 40.0));

    let mut display = RecordingDisplay::new(8);
    sensor.show_data(&mut display, 3).unwrap();

    assert_eq!(display.line(3), Some(">6: 300.00 ppm"));
    assert_eq!(display.line(4), Some(">6: 77.0F 40.0%"));
}

#[test]
fn test_show_data_two_separate_labels() {
    let bus = bus_with_scd30();
    let time = Timeline::new();
    let mut sensor = Co2Sensor::new(RefCellDevice::new(&bus), time.delay(), None).unwrap();
    bus.borrow_mut().respond(ADDR, &READY, word_frame(1));
    bus.borrow_mut().respond(ADDR, &READ, measurement(300.0, 25.0, 40.0));

    let mut display = RecordingDisplay::new(8);
    sensor
        .show_data_two(&mut display, 1, 5, Some("CO2"), Some("Air"))
        .unwrap();

    assert_eq!(display.line(1), Some("CO2: 300.00 ppm"));
    assert_eq!(display.line(5), Some("Air: 77.0F 40.0%"));
}

#[test]
fn test_show_data_labeled_keeps_port_on_second_line() {
    let bus = bus_with_scd30();
    let time = Timeline::new();
    let mut sensor = Co2Sensor::new(RefCellDevice::new(&bus), time.delay(), None).unwrap();
    bus.borrow_mut().respond(ADDR, &READY, word_frame(1));
    bus.borrow_mut().respond(ADDR, &READ, measurement(300.0, 25.0, 40.0));

    let mut display = RecordingDisplay::new(8);
    sensor
        .show_data_labeled(&mut display, 2, Some("CO2"))
        .unwrap();

    assert_eq!(display.line(2), Some("CO2: 300.00 ppm"));
    assert_eq!(display.line(3), Some(">6: 77.0F 40.0%"));
}

#[test]
fn test_show_data_last_line_has_no_room() {
    let bus = bus_with_scd30();
    let time = Timeline::new();
    let mut sensor = Co2Sensor::new(RefCellDevice::new(&bus), time.delay(), None).unwrap();
    let mut display = RecordingDisplay::new(8);

    let result = sensor.show_data(&mut display, 8);
    assert!(matches!(result, Err(SensorError::Display(_))));
    assert!(display.lines.is_empty());
}

// ============================================================================
// Command Surface
// ============================================================================

#[test]
fn test_interval_range_checked_before_write() {
    let bus = bus_with_scd30();
    let time = Timeline::new();
    let mut sensor = Co2Sensor::new(RefCellDevice::new(&bus), time.delay(), None).unwrap();
    let writes_before = bus.borrow().writes.len();

    assert!(matches!(
        sensor.set_measurement_interval(1),
        Err(SensorError::Range(_))
    ));
    assert!(matches!(
        sensor.set_measurement_interval(1801),
        Err(SensorError::Range(_))
    ));
    assert_eq!(bus.borrow().writes.len(), writes_before);

    sensor.set_measurement_interval(2).unwrap();
    let last = bus.borrow().writes.last().unwrap().1.clone();
    assert_eq!(last, vec![0x46, 0x00, 0x00, 0x02, crc8(&[0x00, 0x02])]);
}

#[test]
fn test_measurement_interval_readback() {
    let bus = bus_with_scd30();
    let device = Scd30::new(I2cAddress::SCD30);
    bus.borrow_mut().respond(ADDR, &[0x46, 0x00], word_frame(30));
    let mut handle = RefCellDevice::new(&bus);
    assert_eq!(device.measurement_interval(&mut handle), Ok(30));
}

#[test]
fn test_readbacks_stop_before_reading() {
    let bus = bus_with_scd30();
    let device = Scd30::new(I2cAddress::SCD30);
    bus.borrow_mut().respond(ADDR, &[0x46, 0x00], word_frame(30));
    bus.borrow_mut().respond(ADDR, &[0x51, 0x02], word_frame(500));
    bus.borrow_mut().respond(ADDR, &READY, word_frame(0));
    let mut handle = RefCellDevice::new(&bus);

    assert_eq!(device.measurement_interval(&mut handle), Ok(30));
    assert_eq!(device.altitude(&mut handle), Ok(500));
    assert_eq!(device.data_ready(&mut handle), Ok(false));

    assert_eq!(bus.borrow().repeated_starts, 0);
    assert_eq!(
        bus.borrow().writes_to(ADDR),
        vec![vec![0x46, 0x00], vec![0x51, 0x02], vec![0x02, 0x02]]
    );
}

#[test]
fn test_pressure_range() {
    let bus = bus_with_scd30();
    let device = Scd30::new(I2cAddress::SCD30);
    let mut handle = RefCellDevice::new(&bus);
    assert!(device.start_continuous(&mut handle, 0).is_ok());
    assert!(device.start_continuous(&mut handle, 700).is_ok());
    assert!(device.start_continuous(&mut handle, 1400).is_ok());
    assert!(matches!(
        device.start_continuous(&mut handle, 699),
        Err(SensorError::Range(_))
    ));
    assert!(matches!(
        device.start_continuous(&mut handle, 1401),
        Err(SensorError::Range(_))
    ));
}

#[test]
fn test_forced_recalibration_range() {
    let bus = bus_with_scd30();
    let device = Scd30::new(I2cAddress::SCD30);
    let mut handle = RefCellDevice::new(&bus);
    assert!(device.set_forced_recalibration(&mut handle, 399).is_err());
    assert!(device.set_forced_recalibration(&mut handle, 2001).is_err());
    device.set_forced_recalibration(&mut handle, 400).unwrap();
    assert_eq!(
        &bus.borrow().writes.last().unwrap().1[..2],
        &cmd::FORCED_RECALIBRATION.to_be_bytes()
    );
}

#[test]
fn test_firmware_version() {
    let bus = bus_with_scd30();
    let device = Scd30::new(I2cAddress::SCD30);
    bus.borrow_mut().respond(ADDR, &[0xD1, 0x00], word_frame(0x0342));
    let mut handle = RefCellDevice::new(&bus);
    assert_eq!(device.firmware_version(&mut handle), Ok((3, 0x42)));
}

#[test]
fn test_word_readback_with_bad_checksum() {
    let bus = bus_with_scd30();
    let device = Scd30::new(I2cAddress::SCD30);
    bus.borrow_mut().respond(ADDR, &[0x51, 0x02], vec![0x01, 0xF4, 0x00]);
    let mut handle = RefCellDevice::new(&bus);
    assert_eq!(device.altitude(&mut handle), Err(TransportError::Checksum));
}

#[test]
fn test_self_calibration_round_trip() {
    let bus = bus_with_scd30();
    let device = Scd30::new(I2cAddress::SCD30);
    let mut handle = RefCellDevice::new(&bus);
    device.set_self_calibration(&mut handle, true).unwrap();
    assert_eq!(
        bus.borrow().writes.last().unwrap().1,
        vec![0x53, 0x06, 0x00, 0x01, crc8(&[0x00, 0x01])]
    );
    bus.borrow_mut().respond(ADDR, &[0x53, 0x06], word_frame(1));
    assert_eq!(device.self_calibration(&mut handle), Ok(true));
}

#[test]
fn test_soft_reset_and_stop_are_bare_opcodes() {
    let bus = bus_with_scd30();
    let device = Scd30::new(I2cAddress::SCD30);
    let mut handle = RefCellDevice::new(&bus);
    device.stop_continuous(&mut handle).unwrap();
    device.soft_reset(&mut handle).unwrap();
    assert_eq!(
        bus.borrow().writes_to(ADDR),
        vec![vec![0x01, 0x04], vec![0xD3, 0x04]]
    );
}
