//! Port binding
//!
//! Resolves a logical Grove port number to its physical pin and enforces the
//! wiring class of each device kind: I2C devices live on the shared bus port,
//! analog devices on the single analog port, and digital devices anywhere
//! except the analog port.

use core::fmt;

use crate::config::{ANALOG_PORT, BOOT_PORT, I2C_PORT, PORT_COUNT, PORT_PINS};
use crate::error::SetupError;

/// Logical port number, `1..=6`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct Port(u8);

impl Port {
    /// Shared I2C bus port
    pub const I2C: Self = Self(I2C_PORT);

    /// Analog input port
    pub const ANALOG: Self = Self(ANALOG_PORT);

    /// Create from a port number, `None` if there is no such port
    #[must_use]
    pub const fn new(number: u8) -> Option<Self> {
        if number >= 1 && number as usize <= PORT_COUNT {
            Some(Self(number))
        } else {
            None
        }
    }

    /// The number printed next to the connector
    #[must_use]
    pub const fn number(self) -> u8 {
        self.0
    }

    /// Physical pin behind this port
    #[must_use]
    pub const fn pin(self) -> u8 {
        PORT_PINS[(self.0 - 1) as usize]
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a device is electrically connected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum Wiring {
    /// Shared I2C bus
    I2cBus,
    /// Analog-to-digital converter input
    Analog,
    /// Plain digital GPIO
    Digital,
}

impl Wiring {
    /// The only port this wiring class may use, if it is restricted to one
    #[must_use]
    pub const fn required_port(self) -> Option<Port> {
        match self {
            Self::I2cBus => Some(Port::I2C),
            Self::Analog => Some(Port::ANALOG),
            Self::Digital => None,
        }
    }
}

/// Every device the board knows how to bind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum DeviceKind {
    /// TSL2561 ambient light sensor
    LightSensor,
    /// DHT11/DHT22 temperature and humidity sensor
    TempHumSensor,
    /// Capacitive soil moisture probe
    MoistureSensor,
    /// Ultrasonic trigger/echo ranger
    DistanceSensor,
    /// PIR motion detector
    MotionSensor,
    /// Water level probe read through the ADC
    WaterSensorAnalog,
    /// Water level probe read as a digital level
    WaterSensorDigital,
    /// Microphone envelope sensor
    SoundSensor,
    /// SCD30 CO2, temperature and humidity sensor
    Co2Sensor,
    /// SSD1306 OLED text display
    OledScreen,
    /// Momentary push button
    Button,
}

impl DeviceKind {
    /// Human-readable device name used in messages
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LightSensor => "LightSensor",
            Self::TempHumSensor => "TempHumSensor",
            Self::MoistureSensor => "MoistureSensor",
            Self::DistanceSensor => "DistanceSensor",
            Self::MotionSensor => "MotionSensor",
            Self::WaterSensorAnalog => "WaterSensorAnalog",
            Self::WaterSensorDigital => "WaterSensorDigital",
            Self::SoundSensor => "SoundSensor",
            Self::Co2Sensor => "CO2Sensor",
            Self::OledScreen => "OLEDScreen",
            Self::Button => "Button",
        }
    }

    /// Wiring class of the device
    #[must_use]
    pub const fn wiring(self) -> Wiring {
        match self {
            Self::LightSensor | Self::Co2Sensor | Self::OledScreen => Wiring::I2cBus,
            Self::MoistureSensor | Self::WaterSensorAnalog | Self::SoundSensor => Wiring::Analog,
            Self::TempHumSensor
            | Self::DistanceSensor
            | Self::MotionSensor
            | Self::WaterSensorDigital
            | Self::Button => Wiring::Digital,
        }
    }

    /// Port used when the caller does not name one
    #[must_use]
    pub const fn default_port(self) -> Port {
        let number = match self {
            Self::LightSensor | Self::Co2Sensor | Self::OledScreen => 6,
            Self::TempHumSensor => 3,
            Self::MoistureSensor | Self::WaterSensorAnalog | Self::SoundSensor => 4,
            Self::DistanceSensor | Self::WaterSensorDigital => 1,
            Self::MotionSensor | Self::Button => 2,
        };
        Port(number)
    }
}

/// A device kind resolved to a port that its wiring allows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct PortBinding {
    kind: DeviceKind,
    port: Port,
}

impl PortBinding {
    /// Bind `kind` to `port`, or to its default port when `port` is `None`.
    ///
    /// # Errors
    ///
    /// [`SetupError::UnknownPort`] for a number outside `1..=6`, and
    /// [`SetupError::WrongPort`] when the port violates the device's wiring
    /// class (bus-only devices off port 6, analog devices off port 4, digital
    /// devices on port 4).
    pub fn bind(kind: DeviceKind, port: Option<u8>) -> Result<Self, SetupError> {
        let port = match port {
            Some(n) => Port::new(n).ok_or(SetupError::UnknownPort(n))?,
            None => kind.default_port(),
        };

        match kind.wiring().required_port() {
            Some(required) if required != port => {
                return Err(SetupError::WrongPort { kind, port });
            }
            Some(_) => {}
            None => {
                if port == Port::ANALOG {
                    return Err(SetupError::WrongPort { kind, port });
                }
                if port == Port::I2C {
                    warn!(
                        "Port 6 is usually reserved for the OLED screen and I2C sensors; consider Port {}",
                        kind.default_port().number()
                    );
                }
            }
        }

        if port.number() == BOOT_PORT {
            warn!("Port 5 shares the serial line; it may misbehave while programming");
        }

        debug!("{} bound to Port {}", kind.name(), port.number());
        Ok(Self { kind, port })
    }

    /// Device kind this binding was made for
    #[must_use]
    pub const fn kind(&self) -> DeviceKind {
        self.kind
    }

    /// Bound port
    #[must_use]
    pub const fn port(&self) -> Port {
        self.port
    }

    /// Physical pin behind the bound port
    #[must_use]
    pub const fn pin(&self) -> u8 {
        self.port.pin()
    }
}

impl fmt::Display for PortBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} connected at Port {}", self.kind.name(), self.port)
    }
}
