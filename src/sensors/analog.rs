//! Analog sensors on port 4: soil moisture, water level and sound

use crate::error::{SensorError, SetupError};
use crate::io::AnalogSource;
use crate::port::{DeviceKind, PortBinding};
use crate::types::Reading;

use super::Sensor;

/// A sensor read as a raw ADC count.
pub struct AnalogSensor<A> {
    binding: PortBinding,
    source: A,
}

impl<A: AnalogSource> AnalogSensor<A> {
    /// Soil moisture probe
    ///
    /// # Errors
    ///
    /// [`SetupError::WrongPort`] off port 4.
    pub fn moisture(source: A, port: Option<u8>) -> Result<Self, SetupError> {
        Self::bind(DeviceKind::MoistureSensor, source, port)
    }

    /// Water level probe
    ///
    /// # Errors
    ///
    /// [`SetupError::WrongPort`] off port 4.
    pub fn water_level(source: A, port: Option<u8>) -> Result<Self, SetupError> {
        Self::bind(DeviceKind::WaterSensorAnalog, source, port)
    }

    /// Sound level sensor
    ///
    /// # Errors
    ///
    /// [`SetupError::WrongPort`] off port 4.
    pub fn sound(source: A, port: Option<u8>) -> Result<Self, SetupError> {
        Self::bind(DeviceKind::SoundSensor, source, port)
    }

    fn bind(kind: DeviceKind, source: A, port: Option<u8>) -> Result<Self, SetupError> {
        let binding = PortBinding::bind(kind, port)?;
        info!("{} connected at Port {}", kind.name(), binding.port().number());
        Ok(Self { binding, source })
    }

    /// Which analog device this is
    #[must_use]
    pub const fn kind(&self) -> DeviceKind {
        self.binding.kind()
    }

    /// Sample the ADC once
    pub fn raw(&mut self) -> u16 {
        self.source.read_raw()
    }
}

impl<A: AnalogSource> Sensor for AnalogSensor<A> {
    fn binding(&self) -> PortBinding {
        self.binding
    }

    fn get_data(&mut self) -> Result<Reading, SensorError> {
        Ok(Reading::RawAnalog(self.raw()))
    }
}
