//! Ultrasonic ranger

use embedded_hal::delay::DelayNs;

use crate::acquisition::pulse::PulseTimer;
use crate::config::{DISTANCE_DEFAULT_DIGITS, DISTANCE_MAX_DIGITS, DISTANCE_TIMEOUT_US};
use crate::error::{RangeError, SensorError, SetupError};
use crate::io::{Clock, IoPin};
use crate::port::{DeviceKind, PortBinding};
use crate::types::{Distance, DistanceUnit, Reading};

use super::Sensor;

/// Trigger/echo ranger on a single digital pin (default port 1).
///
/// A missing echo reads as a distance of `0.0`, never as an error.
pub struct DistanceSensor<P, C, D> {
    binding: PortBinding,
    timer: PulseTimer<P>,
    clock: C,
    delay: D,
    unit: DistanceUnit,
    digits: u8,
}

impl<P, C, D> DistanceSensor<P, C, D>
where
    P: IoPin,
    C: Clock,
    D: DelayNs,
{
    /// Bind the ranger with the default echo window.
    ///
    /// # Errors
    ///
    /// [`SetupError`] if the port cannot be bound or the pin driven.
    pub fn new(pin: P, clock: C, delay: D, port: Option<u8>) -> Result<Self, SetupError> {
        Self::with_timeout(pin, clock, delay, port, DISTANCE_TIMEOUT_US)
    }

    /// Bind the ranger with an explicit echo window in µs.
    ///
    /// # Errors
    ///
    /// [`SetupError`] if the port cannot be bound or the pin driven.
    pub fn with_timeout(
        pin: P,
        clock: C,
        delay: D,
        port: Option<u8>,
        timeout_us: u32,
    ) -> Result<Self, SetupError> {
        let binding = PortBinding::bind(DeviceKind::DistanceSensor, port)?;
        let timer = PulseTimer::new(pin, timeout_us).map_err(|_| SetupError::Pin)?;
        info!("{} connected at Port {}", DeviceKind::DistanceSensor.name(), binding.port().number());
        Ok(Self {
            binding,
            timer,
            clock,
            delay,
            unit: DistanceUnit::default(),
            digits: DISTANCE_DEFAULT_DIGITS,
        })
    }

    /// Unit and rounding used by [`Sensor::get_data`]
    ///
    /// # Errors
    ///
    /// [`RangeError`] if `digits` exceeds [`DISTANCE_MAX_DIGITS`]; the
    /// previous format is kept.
    pub fn set_format(&mut self, unit: DistanceUnit, digits: u8) -> Result<(), RangeError> {
        check_digits(digits)?;
        self.unit = unit;
        self.digits = digits;
        Ok(())
    }

    /// Raw echo width in µs, `0` when there was no echo
    pub fn echo_duration_us(&mut self) -> u32 {
        self.timer.measure(&self.clock, &mut self.delay)
    }

    /// Measure once and convert to `unit`, rounded to `digits` decimals
    ///
    /// # Errors
    ///
    /// [`RangeError`] if `digits` exceeds [`DISTANCE_MAX_DIGITS`]. Checked
    /// before the ranger is triggered.
    pub fn get_distance(&mut self, digits: u8, unit: DistanceUnit) -> Result<Distance, RangeError> {
        check_digits(digits)?;
        Ok(Distance::from_echo(self.echo_duration_us(), unit, digits))
    }
}

fn check_digits(digits: u8) -> Result<(), RangeError> {
    RangeError::check("digits", i32::from(digits), 0, i32::from(DISTANCE_MAX_DIGITS))
}

impl<P, C, D> Sensor for DistanceSensor<P, C, D>
where
    P: IoPin,
    C: Clock,
    D: DelayNs,
{
    fn binding(&self) -> PortBinding {
        self.binding
    }

    fn get_data(&mut self) -> Result<Reading, SensorError> {
        Ok(self.get_distance(self.digits, self.unit)?.into())
    }
}
