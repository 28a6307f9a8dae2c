//! CO2, temperature and humidity sensor (SCD30)
//!
//! The device measures continuously on its own interval. Readings come
//! through a [`ReadyPoller`], so a call between measurements returns the
//! last good bundle and only the very first call can block.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::acquisition::ready::{ReadyPoller, ReadySource};
use crate::bus::{require_present, I2cAddress};
use crate::config::{CO2_START_SETTLE_MS, CO2_WARMUP_POLL_MS};
use crate::display::{check_line, format_line, DisplaySink};
use crate::drivers::scd30::Scd30;
use crate::error::{SensorError, SetupError, TransportError};
use crate::port::{DeviceKind, PortBinding};
use crate::types::{Co2Sample, Humiture, Reading};

use super::Sensor;

/// SCD30 on the I2C port.
pub struct Co2Sensor<I, D> {
    binding: PortBinding,
    bus: I,
    device: Scd30,
    poller: ReadyPoller<Co2Sample>,
    delay: D,
}

/// One poll of the device over a borrowed bus
struct Session<'a, I> {
    device: Scd30,
    bus: &'a mut I,
}

impl<I: I2c> ReadySource for Session<'_, I> {
    type Output = Co2Sample;

    fn data_ready(&mut self) -> bool {
        match self.device.data_ready(&mut *self.bus) {
            Ok(ready) => ready,
            Err(TransportError::Checksum) => {
                warn!("CO2 ready flag failed its checksum");
                false
            }
            Err(_) => false,
        }
    }

    fn read_measurement(&mut self) -> Option<Co2Sample> {
        match self.device.read_measurement(&mut *self.bus) {
            Ok(sample) => Some(sample),
            Err(_) => {
                warn!("CO2 measurement discarded");
                None
            }
        }
    }
}

impl<I: I2c, D: DelayNs> Co2Sensor<I, D> {
    /// Bind to port 6, check the device answers, start continuous
    /// measurement without pressure compensation and let it settle.
    ///
    /// # Errors
    ///
    /// [`SetupError::WrongPort`] off port 6, [`SetupError::DeviceAbsent`] if
    /// the scan misses it, [`SetupError::Bus`] if the start command fails.
    pub fn new(mut bus: I, mut delay: D, port: Option<u8>) -> Result<Self, SetupError> {
        let binding = PortBinding::bind(DeviceKind::Co2Sensor, port)?;
        let device = Scd30::new(I2cAddress::SCD30);
        require_present(&mut bus, DeviceKind::Co2Sensor, device.address())?;
        device
            .start_continuous(&mut bus, 0)
            .map_err(|_| SetupError::Bus)?;
        delay.delay_ms(CO2_START_SETTLE_MS);
        info!("{} connected at Port {}", DeviceKind::Co2Sensor.name(), binding.port().number());
        Ok(Self {
            binding,
            bus,
            device,
            poller: ReadyPoller::new(CO2_WARMUP_POLL_MS),
            delay,
        })
    }

    /// Current bundle; blocks through warm-up on first use
    pub fn sample(&mut self) -> Co2Sample {
        let mut session = Session {
            device: self.device,
            bus: &mut self.bus,
        };
        self.poller.get_reading(&mut session, &mut self.delay)
    }

    /// CO2 concentration in ppm
    pub fn co2(&mut self) -> f32 {
        self.sample().co2_ppm
    }

    /// Temperature in °C when `celsius`, otherwise °F
    pub fn temperature(&mut self, celsius: bool) -> f32 {
        let sample = self.sample();
        if celsius {
            sample.celsius
        } else {
            sample.fahrenheit()
        }
    }

    /// Relative humidity in %
    pub fn humidity(&mut self) -> f32 {
        self.sample().humidity
    }

    /// Restart continuous measurement with pressure compensation
    /// (`0` disables it, otherwise 700..=1400 mbar)
    ///
    /// # Errors
    ///
    /// [`SensorError::Range`] or [`SensorError::Transport`].
    pub fn start(&mut self, pressure_mbar: u16) -> Result<(), SensorError> {
        self.device.start_continuous(&mut self.bus, pressure_mbar)
    }

    /// Stop continuous measurement
    ///
    /// # Errors
    ///
    /// [`TransportError::Bus`] if the write fails.
    pub fn stop(&mut self) -> Result<(), TransportError> {
        self.device.stop_continuous(&mut self.bus)
    }

    /// Set the measurement interval, 2..=1800 s
    ///
    /// # Errors
    ///
    /// [`SensorError::Range`] or [`SensorError::Transport`].
    pub fn set_measurement_interval(&mut self, seconds: u16) -> Result<(), SensorError> {
        self.device.set_measurement_interval(&mut self.bus, seconds)
    }

    /// Measurement interval in seconds
    ///
    /// # Errors
    ///
    /// [`TransportError`] on a bus or checksum fault.
    pub fn measurement_interval(&mut self) -> Result<u16, TransportError> {
        self.device.measurement_interval(&mut self.bus)
    }

    /// Enable or disable automatic self-calibration
    ///
    /// # Errors
    ///
    /// [`TransportError::Bus`] if the write fails.
    pub fn set_self_calibration(&mut self, enabled: bool) -> Result<(), TransportError> {
        self.device.set_self_calibration(&mut self.bus, enabled)
    }

    /// Whether automatic self-calibration is enabled
    ///
    /// # Errors
    ///
    /// [`TransportError`] on a bus or checksum fault.
    pub fn self_calibration(&mut self) -> Result<bool, TransportError> {
        self.device.self_calibration(&mut self.bus)
    }

    /// Recalibrate against a reference of 400..=2000 ppm
    ///
    /// # Errors
    ///
    /// [`SensorError::Range`] or [`SensorError::Transport`].
    pub fn set_forced_recalibration(&mut self, reference_ppm: u16) -> Result<(), SensorError> {
        self.device.set_forced_recalibration(&mut self.bus, reference_ppm)
    }

    /// Forced recalibration reference in ppm
    ///
    /// # Errors
    ///
    /// [`TransportError`] on a bus or checksum fault.
    pub fn forced_recalibration(&mut self) -> Result<u16, TransportError> {
        self.device.forced_recalibration(&mut self.bus)
    }

    /// Set the temperature offset in hundredths of a degree Celsius
    ///
    /// # Errors
    ///
    /// [`TransportError::Bus`] if the write fails.
    pub fn set_temperature_offset(&mut self, centi_celsius: u16) -> Result<(), TransportError> {
        self.device.set_temperature_offset(&mut self.bus, centi_celsius)
    }

    /// Temperature offset in hundredths of a degree Celsius
    ///
    /// # Errors
    ///
    /// [`TransportError`] on a bus or checksum fault.
    pub fn temperature_offset(&mut self) -> Result<u16, TransportError> {
        self.device.temperature_offset(&mut self.bus)
    }

    /// Set altitude compensation in meters
    ///
    /// # Errors
    ///
    /// [`TransportError::Bus`] if the write fails.
    pub fn set_altitude(&mut self, meters: u16) -> Result<(), TransportError> {
        self.device.set_altitude(&mut self.bus, meters)
    }

    /// Altitude compensation in meters
    ///
    /// # Errors
    ///
    /// [`TransportError`] on a bus or checksum fault.
    pub fn altitude(&mut self) -> Result<u16, TransportError> {
        self.device.altitude(&mut self.bus)
    }

    /// Firmware version as `(major, minor)`
    ///
    /// # Errors
    ///
    /// [`TransportError`] on a bus or checksum fault.
    pub fn firmware_version(&mut self) -> Result<(u8, u8), TransportError> {
        self.device.firmware_version(&mut self.bus)
    }

    /// Soft reset. Measurement must be started again afterwards.
    ///
    /// # Errors
    ///
    /// [`TransportError::Bus`] if the write fails.
    pub fn soft_reset(&mut self) -> Result<(), TransportError> {
        self.device.soft_reset(&mut self.bus)
    }

    /// Show the ppm line on `line` and temperature/humidity on `line2`,
    /// each with its own label (`>{port}` when `None`).
    ///
    /// # Errors
    ///
    /// [`SensorError::Display`] if either line is out of range or does not
    /// fit.
    pub fn show_data_two<S: DisplaySink>(
        &mut self,
        display: &mut S,
        line: u8,
        line2: u8,
        label: Option<&str>,
        label2: Option<&str>,
    ) -> Result<Reading, SensorError> {
        check_line(line, display.max_lines())?;
        check_line(line2, display.max_lines())?;

        let sample = self.sample();
        let reading = Reading::from(sample);
        let first = format_line(self.port(), label, &reading)?;
        let climate = Humiture {
            celsius: sample.celsius,
            humidity: sample.humidity,
        };
        let second = format_line(self.port(), label2, &Reading::from(climate))?;

        display.show_line(line, &first)?;
        display.show_line(line2, &second)?;
        Ok(reading)
    }
}

impl<I: I2c, D: DelayNs> Sensor for Co2Sensor<I, D> {
    fn binding(&self) -> PortBinding {
        self.binding
    }

    fn get_data(&mut self) -> Result<Reading, SensorError> {
        Ok(self.sample().into())
    }

    /// Two lines: ppm on `line`, temperature and humidity on `line + 1`.
    /// `label` names the first line; the second keeps the `>{port}` label.
    fn show_data_labeled<S: DisplaySink>(
        &mut self,
        display: &mut S,
        line: u8,
        label: Option<&str>,
    ) -> Result<Reading, SensorError> {
        self.show_data_two(display, line, line.saturating_add(1), label, None)
    }
}
