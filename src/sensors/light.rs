//! Ambient light sensor (TSL2561)

use embedded_hal::i2c::I2c;

use crate::bus::{require_present, I2cAddress};
use crate::drivers::tsl2561::Tsl2561;
use crate::error::{SensorError, SetupError};
use crate::port::{DeviceKind, PortBinding};
use crate::types::Reading;

use super::Sensor;

/// Light sensor on the I2C port.
pub struct LightSensor<I> {
    binding: PortBinding,
    bus: I,
    device: Tsl2561,
    last: Option<u32>,
}

impl<I: I2c> LightSensor<I> {
    /// Bind to port 6, check the device answers and power it up.
    ///
    /// # Errors
    ///
    /// [`SetupError::WrongPort`] off port 6, [`SetupError::DeviceAbsent`] if
    /// the scan misses it, [`SetupError::Bus`] if power-up fails.
    pub fn new(mut bus: I, port: Option<u8>) -> Result<Self, SetupError> {
        let binding = PortBinding::bind(DeviceKind::LightSensor, port)?;
        let device = Tsl2561::new(I2cAddress::TSL2561);
        require_present(&mut bus, DeviceKind::LightSensor, device.address())?;
        device.init(&mut bus).map_err(|_| SetupError::Bus)?;
        info!("{} connected at Port {}", DeviceKind::LightSensor.name(), binding.port().number());
        Ok(Self {
            binding,
            bus,
            device,
            last: None,
        })
    }

    /// Illuminance in lux. A failed read returns the previous value.
    ///
    /// # Errors
    ///
    /// [`SensorError::Transport`] if the read fails and there is no previous
    /// value.
    pub fn lux(&mut self) -> Result<u32, SensorError> {
        match self.device.lux(&mut self.bus) {
            Ok(lux) => {
                self.last = Some(lux);
                Ok(lux)
            }
            Err(e) => self.last.ok_or(SensorError::Transport(e)),
        }
    }
}

impl<I: I2c> Sensor for LightSensor<I> {
    fn binding(&self) -> PortBinding {
        self.binding
    }

    fn get_data(&mut self) -> Result<Reading, SensorError> {
        self.lux().map(Reading::Lux)
    }
}
