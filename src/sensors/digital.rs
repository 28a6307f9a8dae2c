//! Level-only sensors: motion, digital water probe, push button

use embedded_hal::digital::InputPin;

use crate::error::{SetupError, TransportError};
use crate::port::{DeviceKind, PortBinding};

/// A sensor whose whole state is one logic level.
pub struct DigitalSensor<P> {
    binding: PortBinding,
    pin: P,
    active_low: bool,
}

impl<P: InputPin> DigitalSensor<P> {
    /// PIR motion detector, high while motion is seen (default port 2)
    ///
    /// # Errors
    ///
    /// [`SetupError`] if the port cannot be bound.
    pub fn motion(pin: P, port: Option<u8>) -> Result<Self, SetupError> {
        Self::bind(DeviceKind::MotionSensor, pin, port, false)
    }

    /// Water probe, pulled low when wet (default port 1)
    ///
    /// # Errors
    ///
    /// [`SetupError`] if the port cannot be bound.
    pub fn water_level(pin: P, port: Option<u8>) -> Result<Self, SetupError> {
        Self::bind(DeviceKind::WaterSensorDigital, pin, port, true)
    }

    /// Push button, high while pressed (default port 2)
    ///
    /// # Errors
    ///
    /// [`SetupError`] if the port cannot be bound.
    pub fn button(pin: P, port: Option<u8>) -> Result<Self, SetupError> {
        Self::bind(DeviceKind::Button, pin, port, false)
    }

    fn bind(kind: DeviceKind, pin: P, port: Option<u8>, active_low: bool) -> Result<Self, SetupError> {
        let binding = PortBinding::bind(kind, port)?;
        info!("{} connected at Port {}", kind.name(), binding.port().number());
        Ok(Self {
            binding,
            pin,
            active_low,
        })
    }

    /// Port binding
    #[must_use]
    pub const fn binding(&self) -> PortBinding {
        self.binding
    }

    /// True while motion is detected, water is present or the button is held
    ///
    /// # Errors
    ///
    /// [`TransportError::Pin`] if the level cannot be read.
    pub fn is_active(&mut self) -> Result<bool, TransportError> {
        let high = self.pin.is_high().map_err(|_| TransportError::Pin)?;
        Ok(high != self.active_low)
    }
}
