//! Temperature and humidity sensor (DHT11 / DHT22)

use embedded_hal::delay::DelayNs;

use crate::acquisition::refresh::RefreshState;
use crate::drivers::dht::{Dht, DhtVariant};
use crate::error::{SensorError, SetupError};
use crate::io::{Clock, IoPin};
use crate::port::{DeviceKind, PortBinding};
use crate::types::{Humiture, Reading};

use super::Sensor;

/// DHT-based temperature/humidity sensor on a digital port (default 3).
///
/// Measurements are throttled to the variant's refresh interval. In between,
/// and after a failed transfer, the last good values are returned.
pub struct TempHumSensor<P, C, D> {
    binding: PortBinding,
    dht: Dht<P>,
    gate: RefreshState,
    clock: C,
    delay: D,
}

impl<P, C, D> TempHumSensor<P, C, D>
where
    P: IoPin,
    C: Clock,
    D: DelayNs,
{
    /// Bind and set up the sensor.
    ///
    /// # Errors
    ///
    /// [`SetupError::UnknownPort`] / [`SetupError::WrongPort`] from binding,
    /// [`SetupError::Pin`] if the data line cannot be driven.
    pub fn new(
        pin: P,
        variant: DhtVariant,
        clock: C,
        delay: D,
        port: Option<u8>,
    ) -> Result<Self, SetupError> {
        let binding = PortBinding::bind(DeviceKind::TempHumSensor, port)?;
        let dht = Dht::new(pin, variant).map_err(|_| SetupError::Pin)?;
        info!("{} connected at Port {}", DeviceKind::TempHumSensor.name(), binding.port().number());
        Ok(Self {
            binding,
            dht,
            gate: RefreshState::new(variant.min_refresh_ms()),
            clock,
            delay,
        })
    }

    /// Refresh throttle state
    #[must_use]
    pub const fn refresh_state(&self) -> &RefreshState {
        &self.gate
    }

    /// Current temperature and humidity in metric units
    ///
    /// # Errors
    ///
    /// [`SensorError::Transport`] if a transfer failed and nothing was ever
    /// read, [`SensorError::NoReading`] if throttled before the first
    /// successful transfer.
    pub fn humiture(&mut self) -> Result<Humiture, SensorError> {
        let now = self.clock.now_ms();
        let (dht, clock, delay) = (&mut self.dht, &self.clock, &mut self.delay);
        match self.gate.acquire(now, || dht.measure(clock, delay)) {
            Some(Ok(values)) => Ok(values),
            Some(Err(e)) => {
                debug!("humidity sensor transfer failed, using last values");
                self.dht.last().ok_or(SensorError::Transport(e))
            }
            None => self.dht.last().ok_or(SensorError::NoReading),
        }
    }

    /// Temperature in °C when `celsius`, otherwise °F
    ///
    /// # Errors
    ///
    /// As [`TempHumSensor::humiture`].
    pub fn temperature(&mut self, celsius: bool) -> Result<f32, SensorError> {
        let values = self.humiture()?;
        Ok(if celsius {
            values.celsius
        } else {
            values.fahrenheit()
        })
    }

    /// Relative humidity in %
    ///
    /// # Errors
    ///
    /// As [`TempHumSensor::humiture`].
    pub fn humidity(&mut self) -> Result<f32, SensorError> {
        Ok(self.humiture()?.humidity)
    }
}

impl<P, C, D> Sensor for TempHumSensor<P, C, D>
where
    P: IoPin,
    C: Clock,
    D: DelayNs,
{
    fn binding(&self) -> PortBinding {
        self.binding
    }

    fn get_data(&mut self) -> Result<Reading, SensorError> {
        self.humiture().map(Reading::from)
    }
}
