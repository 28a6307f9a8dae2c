//! `SCD30` CO2 Sensor Driver
//!
//! NDIR CO2 sensor with on-board temperature and humidity compensation.
//! Every transaction starts with a 16-bit opcode; arguments and responses
//! are CRC-8 protected words (see [`crate::acquisition::frame`]).
//!
//! The measurement register holds three big-endian floats (CO2 ppm,
//! temperature °C, relative humidity %), each split across two words.

use embedded_hal::i2c::I2c;

use crate::acquisition::frame::{
    encode_command, encode_command_with_arg, read_f32, validate_response, FLOAT_LEN,
    WORD_LEN,
};
use crate::bus::I2cAddress;
use crate::error::{RangeError, SensorError, TransportError};
use crate::types::Co2Sample;

/// `SCD30` command opcodes
pub mod cmd {
    /// Start continuous measurement (argument: ambient pressure in mbar, 0 to disable)
    pub const START_CONTINUOUS: u16 = 0x0010;
    /// Stop continuous measurement
    pub const STOP_CONTINUOUS: u16 = 0x0104;
    /// Read the measurement register
    pub const READ_MEASUREMENT: u16 = 0x0300;
    /// Data-ready flag
    pub const DATA_READY: u16 = 0x0202;
    /// Set/get measurement interval in seconds
    pub const MEASUREMENT_INTERVAL: u16 = 0x4600;
    /// Enable/query automatic self-calibration
    pub const SELF_CALIBRATION: u16 = 0x5306;
    /// Set/get forced recalibration reference in ppm
    pub const FORCED_RECALIBRATION: u16 = 0x5204;
    /// Set/get temperature offset in 0.01 °C
    pub const TEMPERATURE_OFFSET: u16 = 0x5403;
    /// Set/get altitude compensation in meters
    pub const ALTITUDE_COMPENSATION: u16 = 0x5102;
    /// Firmware version (major, minor)
    pub const FIRMWARE_VERSION: u16 = 0xD100;
    /// Soft reset
    pub const SOFT_RESET: u16 = 0xD304;
}

/// Measurement register length: three floats
pub const MEASUREMENT_LEN: usize = 3 * FLOAT_LEN;

/// Accepted measurement interval in seconds
pub const INTERVAL_RANGE_S: (u16, u16) = (2, 1800);

/// Accepted ambient pressure compensation in mbar (0 disables it)
pub const PRESSURE_RANGE_MBAR: (u16, u16) = (700, 1400);

/// Accepted forced recalibration reference in ppm
pub const FRC_RANGE_PPM: (u16, u16) = (400, 2000);

/// `SCD30` driver. Holds only the device address; the bus is borrowed per
/// call so several devices can share it.
#[derive(Clone, Copy, Debug)]
pub struct Scd30 {
    address: I2cAddress,
}

impl Scd30 {
    /// Create a driver for the device at `address`
    #[must_use]
    pub const fn new(address: I2cAddress) -> Self {
        Self { address }
    }

    /// Device address
    #[must_use]
    pub const fn address(&self) -> I2cAddress {
        self.address
    }

    /// Start continuous measurement, optionally compensating for ambient
    /// pressure (`0` disables compensation).
    ///
    /// # Errors
    ///
    /// [`SensorError::Range`] for a pressure outside 700..=1400 mbar (other
    /// than 0), [`SensorError::Transport`] if the bus write fails.
    pub fn start_continuous<I: I2c>(&self, bus: &mut I, pressure_mbar: u16) -> Result<(), SensorError> {
        if pressure_mbar != 0 {
            check_range("pressure_mbar", pressure_mbar, PRESSURE_RANGE_MBAR)?;
        }
        self.send_arg(bus, cmd::START_CONTINUOUS, pressure_mbar)?;
        Ok(())
    }

    /// Stop continuous measurement
    ///
    /// # Errors
    ///
    /// [`TransportError::Bus`] if the write fails.
    pub fn stop_continuous<I: I2c>(&self, bus: &mut I) -> Result<(), TransportError> {
        self.send(bus, cmd::STOP_CONTINUOUS)
    }

    /// True when a measurement is waiting in the register. The flag word
    /// must pass its checksum and be non-zero.
    ///
    /// # Errors
    ///
    /// [`TransportError::Bus`] or [`TransportError::Checksum`].
    pub fn data_ready<I: I2c>(&self, bus: &mut I) -> Result<bool, TransportError> {
        Ok(self.read_word(bus, cmd::DATA_READY)? != 0)
    }

    /// Read and decode the measurement register.
    ///
    /// # Errors
    ///
    /// [`TransportError::Checksum`] if any of the six words fails its
    /// checksum; nothing from a bad response is decoded.
    pub fn read_measurement<I: I2c>(&self, bus: &mut I) -> Result<Co2Sample, TransportError> {
        let mut data = [0u8; MEASUREMENT_LEN];
        self.command_then_read(bus, cmd::READ_MEASUREMENT, &mut data)?;
        Ok(Co2Sample {
            co2_ppm: read_f32(&data, 0),
            celsius: read_f32(&data, FLOAT_LEN),
            humidity: read_f32(&data, 2 * FLOAT_LEN),
        })
    }

    /// Set the measurement interval in seconds.
    ///
    /// Written as a 16-bit register address followed by the checksummed
    /// value.
    ///
    /// # Errors
    ///
    /// [`SensorError::Range`] outside 2..=1800 s.
    pub fn set_measurement_interval<I: I2c>(&self, bus: &mut I, seconds: u16) -> Result<(), SensorError> {
        check_range("interval_s", seconds, INTERVAL_RANGE_S)?;
        self.send_arg(bus, cmd::MEASUREMENT_INTERVAL, seconds)?;
        Ok(())
    }

    /// Read back the measurement interval in seconds.
    ///
    /// # Errors
    ///
    /// [`TransportError::Bus`] or [`TransportError::Checksum`].
    pub fn measurement_interval<I: I2c>(&self, bus: &mut I) -> Result<u16, TransportError> {
        self.read_word(bus, cmd::MEASUREMENT_INTERVAL)
    }

    /// Enable or disable automatic self-calibration
    ///
    /// # Errors
    ///
    /// [`TransportError::Bus`] if the write fails.
    pub fn set_self_calibration<I: I2c>(&self, bus: &mut I, enabled: bool) -> Result<(), TransportError> {
        self.send_arg(bus, cmd::SELF_CALIBRATION, u16::from(enabled))
    }

    /// True when automatic self-calibration is enabled
    ///
    /// # Errors
    ///
    /// [`TransportError::Bus`] or [`TransportError::Checksum`].
    pub fn self_calibration<I: I2c>(&self, bus: &mut I) -> Result<bool, TransportError> {
        Ok(self.read_word(bus, cmd::SELF_CALIBRATION)? == 1)
    }

    /// Recalibrate against a known CO2 reference concentration.
    ///
    /// # Errors
    ///
    /// [`SensorError::Range`] outside 400..=2000 ppm.
    pub fn set_forced_recalibration<I: I2c>(&self, bus: &mut I, reference_ppm: u16) -> Result<(), SensorError> {
        check_range("reference_ppm", reference_ppm, FRC_RANGE_PPM)?;
        self.send_arg(bus, cmd::FORCED_RECALIBRATION, reference_ppm)?;
        Ok(())
    }

    /// Reference concentration last used for forced recalibration
    ///
    /// # Errors
    ///
    /// [`TransportError::Bus`] or [`TransportError::Checksum`].
    pub fn forced_recalibration<I: I2c>(&self, bus: &mut I) -> Result<u16, TransportError> {
        self.read_word(bus, cmd::FORCED_RECALIBRATION)
    }

    /// Set the temperature offset in hundredths of a degree Celsius
    ///
    /// # Errors
    ///
    /// [`TransportError::Bus`] if the write fails.
    pub fn set_temperature_offset<I: I2c>(&self, bus: &mut I, centi_celsius: u16) -> Result<(), TransportError> {
        self.send_arg(bus, cmd::TEMPERATURE_OFFSET, centi_celsius)
    }

    /// Temperature offset in hundredths of a degree Celsius
    ///
    /// # Errors
    ///
    /// [`TransportError::Bus`] or [`TransportError::Checksum`].
    pub fn temperature_offset<I: I2c>(&self, bus: &mut I) -> Result<u16, TransportError> {
        self.read_word(bus, cmd::TEMPERATURE_OFFSET)
    }

    /// Set the altitude above sea level used for compensation, in meters
    ///
    /// # Errors
    ///
    /// [`TransportError::Bus`] if the write fails.
    pub fn set_altitude<I: I2c>(&self, bus: &mut I, meters: u16) -> Result<(), TransportError> {
        self.send_arg(bus, cmd::ALTITUDE_COMPENSATION, meters)
    }

    /// Altitude compensation in meters
    ///
    /// # Errors
    ///
    /// [`TransportError::Bus`] or [`TransportError::Checksum`].
    pub fn altitude<I: I2c>(&self, bus: &mut I) -> Result<u16, TransportError> {
        self.read_word(bus, cmd::ALTITUDE_COMPENSATION)
    }

    /// Firmware version as `(major, minor)`
    ///
    /// # Errors
    ///
    /// [`TransportError::Bus`] or [`TransportError::Checksum`].
    pub fn firmware_version<I: I2c>(&self, bus: &mut I) -> Result<(u8, u8), TransportError> {
        let [major, minor] = self.read_word(bus, cmd::FIRMWARE_VERSION)?.to_be_bytes();
        Ok((major, minor))
    }

    /// Soft reset. The device restarts and needs its start command again.
    ///
    /// # Errors
    ///
    /// [`TransportError::Bus`] if the write fails.
    pub fn soft_reset<I: I2c>(&self, bus: &mut I) -> Result<(), TransportError> {
        self.send(bus, cmd::SOFT_RESET)
    }

    fn send<I: I2c>(&self, bus: &mut I, opcode: u16) -> Result<(), TransportError> {
        bus.write(self.address.addr(), &encode_command(opcode))
            .map_err(|_| TransportError::Bus)
    }

    fn send_arg<I: I2c>(&self, bus: &mut I, opcode: u16, arg: u16) -> Result<(), TransportError> {
        bus.write(self.address.addr(), &encode_command_with_arg(opcode, arg))
            .map_err(|_| TransportError::Bus)
    }

    fn read_word<I: I2c>(&self, bus: &mut I, opcode: u16) -> Result<u16, TransportError> {
        let mut data = [0u8; WORD_LEN];
        self.command_then_read(bus, opcode, &mut data)?;
        Ok(u16::from_be_bytes([data[0], data[1]]))
    }

    /// Opcode write, stop, then a separate read; the device needs the stop
    /// condition before it will clock data out.
    fn command_then_read<I: I2c>(
        &self,
        bus: &mut I,
        opcode: u16,
        data: &mut [u8],
    ) -> Result<(), TransportError> {
        self.send(bus, opcode)?;
        bus.read(self.address.addr(), data)
            .map_err(|_| TransportError::Bus)?;
        if validate_response(data) {
            Ok(())
        } else {
            Err(TransportError::Checksum)
        }
    }
}

fn check_range(param: &'static str, value: u16, (min, max): (u16, u16)) -> Result<(), RangeError> {
    RangeError::check(param, i32::from(value), i32::from(min), i32::from(max))
}
