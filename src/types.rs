//! Shared types used across the firmware
//!
//! Readings are plain `Copy` values: once an acquisition produces one it is
//! never mutated, only copied into caches, display lines and uplink payloads.

use core::fmt;
#[cfg(not(feature = "std"))]
use micromath::F32Ext;

/// Convert degrees Celsius to degrees Fahrenheit
#[must_use]
pub fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    celsius * 1.8 + 32.0
}

/// Round `value` to `digits` decimal places
#[must_use]
pub fn round_to(value: f32, digits: u8) -> f32 {
    let scale = 10f32.powi(i32::from(digits));
    (value * scale).round() / scale
}

/// Temperature and relative humidity as produced by the DHT sensors.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct Humiture {
    /// Temperature in °C
    pub celsius: f32,
    /// Relative humidity in %
    pub humidity: f32,
}

impl Humiture {
    /// Temperature in °F
    #[must_use]
    pub fn fahrenheit(&self) -> f32 {
        celsius_to_fahrenheit(self.celsius)
    }
}

/// One decoded SCD30 measurement.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct Co2Sample {
    /// CO2 concentration in ppm
    pub co2_ppm: f32,
    /// Temperature in °C
    pub celsius: f32,
    /// Relative humidity in %
    pub humidity: f32,
}

impl Co2Sample {
    /// Temperature in °F
    #[must_use]
    pub fn fahrenheit(&self) -> f32 {
        celsius_to_fahrenheit(self.celsius)
    }
}

/// Unit for ultrasonic distance readings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum DistanceUnit {
    /// Centimeters
    Centimeters,
    /// Inches
    #[default]
    Inches,
}

impl DistanceUnit {
    /// Round-trip microseconds per unit of distance
    #[must_use]
    pub const fn us_per_unit(self) -> f32 {
        match self {
            Self::Centimeters => crate::config::US_PER_CM,
            Self::Inches => crate::config::US_PER_INCH,
        }
    }

    /// Short suffix used on the display
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Centimeters => "cm",
            Self::Inches => "in",
        }
    }
}

/// Rounded ultrasonic distance. A value of exactly `0.0` means no echo.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct Distance {
    /// Distance in `unit`, rounded to the requested decimals
    pub value: f32,
    /// Unit of `value`
    pub unit: DistanceUnit,
}

impl Distance {
    /// Convert an echo duration to a rounded distance.
    ///
    /// A zero duration is the timeout sentinel and maps to `0.0`.
    #[must_use]
    pub fn from_echo(duration_us: u32, unit: DistanceUnit, digits: u8) -> Self {
        if duration_us == 0 {
            return Self { value: 0.0, unit };
        }
        // u32 -> f32 loses precision only above 2^24 µs, far past any timeout
        #[allow(clippy::cast_precision_loss)]
        let raw = duration_us as f32 / 2.0 / unit.us_per_unit();
        Self {
            value: round_to(raw, digits),
            unit,
        }
    }

    /// True when the ranger saw no echo
    #[must_use]
    pub fn is_no_echo(&self) -> bool {
        self.value == 0.0
    }
}

/// A tagged sensor value.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum Reading {
    /// Temperature in °F and relative humidity in %
    TempHumidity {
        /// Temperature in °F
        fahrenheit: f32,
        /// Relative humidity in %
        humidity: f32,
    },
    /// Illuminance in lux
    Lux(u32),
    /// CO2 bundle from the SCD30
    Co2 {
        /// CO2 concentration in ppm
        ppm: f32,
        /// Temperature in °F
        fahrenheit: f32,
        /// Relative humidity in %
        humidity: f32,
    },
    /// Ultrasonic distance
    Distance(Distance),
    /// Raw ADC count
    RawAnalog(u16),
}

impl From<Humiture> for Reading {
    fn from(h: Humiture) -> Self {
        Self::TempHumidity {
            fahrenheit: h.fahrenheit(),
            humidity: h.humidity,
        }
    }
}

impl From<Co2Sample> for Reading {
    fn from(s: Co2Sample) -> Self {
        Self::Co2 {
            ppm: s.co2_ppm,
            fahrenheit: s.fahrenheit(),
            humidity: s.humidity,
        }
    }
}

impl From<Distance> for Reading {
    fn from(d: Distance) -> Self {
        Self::Distance(d)
    }
}

/// Renders the value part of a display line (everything after the label).
///
/// CO2 bundles render only their ppm part here; the facade puts the
/// temperature/humidity part on a second line.
impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TempHumidity {
                fahrenheit,
                humidity,
            } => write!(f, "{fahrenheit:.1}F {humidity:.1}%"),
            Self::Lux(lux) => write!(f, "{lux} lux"),
            Self::Co2 { ppm, .. } => write!(f, "{ppm:.2} ppm"),
            Self::Distance(d) => write!(f, "{:.2} {}", d.value, d.unit.suffix()),
            Self::RawAnalog(raw) => write!(f, "{raw}"),
        }
    }
}
