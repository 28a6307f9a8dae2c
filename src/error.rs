//! Error types
//!
//! Faults travel on two channels. [`SetupError`] is returned from
//! constructors and is fatal for the device being set up. Everything that can
//! go wrong once a sensor is running is a [`TransportError`] (resolved
//! locally into cached or sentinel data where possible) or a
//! [`RangeError`] for a bad argument. [`SensorError`] collects the
//! steady-state cases for the facade.

use core::fmt;

use crate::port::{DeviceKind, Port};

/// Fatal configuration fault raised while bringing a device up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum SetupError {
    /// Port number outside `1..=6`
    UnknownPort(u8),
    /// Device plugged into a port its wiring class cannot use
    WrongPort {
        /// Device being bound
        kind: DeviceKind,
        /// Port it was bound to
        port: Port,
    },
    /// Device did not answer a bus scan
    DeviceAbsent {
        /// Device that was expected
        kind: DeviceKind,
        /// 7-bit address that was probed
        address: u8,
    },
    /// Bus transaction failed while configuring the device
    Bus,
    /// Pin could not be driven while configuring the device
    Pin,
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPort(n) => write!(f, "there is no Port {n}; ports are numbered 1 to 6"),
            Self::WrongPort { kind, port } => match kind.wiring().required_port() {
                Some(required) => write!(
                    f,
                    "{} goes only to Port {}, not Port {}",
                    kind.name(),
                    required.number(),
                    port.number()
                ),
                None => write!(
                    f,
                    "Port {} is an analog port; connect the {} to another port",
                    port.number(),
                    kind.name()
                ),
            },
            Self::DeviceAbsent { kind, address } => write!(
                f,
                "no {} found at 0x{address:02X}; check it is connected to Port 6 or an I2C hub",
                kind.name()
            ),
            Self::Bus => write!(f, "bus transaction failed during setup"),
            Self::Pin => write!(f, "pin could not be configured"),
        }
    }
}

impl core::error::Error for SetupError {}

/// Argument outside the range a device accepts. Never clamped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct RangeError {
    /// Name of the offending parameter
    pub param: &'static str,
    /// Value that was passed
    pub value: i32,
    /// Smallest accepted value
    pub min: i32,
    /// Largest accepted value
    pub max: i32,
}

impl RangeError {
    /// Check `value` against `min..=max`.
    pub fn check(param: &'static str, value: i32, min: i32, max: i32) -> Result<(), Self> {
        if (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(Self {
                param,
                value,
                min,
                max,
            })
        }
    }
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} is outside {}..={}",
            self.param, self.value, self.min, self.max
        )
    }
}

impl core::error::Error for RangeError {}

/// Transient fault on the wire. Never fatal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum TransportError {
    /// I2C transaction failed
    Bus,
    /// Pin read or write failed
    Pin,
    /// Frame failed its checksum
    Checksum,
    /// Device did not produce an edge within its window
    Timeout,
    /// Converter saturated; the value is meaningless
    Saturated,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => write!(f, "bus transaction failed"),
            Self::Pin => write!(f, "pin access failed"),
            Self::Checksum => write!(f, "checksum mismatch"),
            Self::Timeout => write!(f, "device did not respond in time"),
            Self::Saturated => write!(f, "sensor saturated"),
        }
    }
}

impl core::error::Error for TransportError {}

/// Display sink rejected a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum DisplayError {
    /// Line number is zero or beyond the last line
    LineOutOfRange {
        /// Requested line
        line: u8,
        /// Last valid line
        max_lines: u8,
    },
    /// Text does not fit the line buffer
    TextTooLong,
    /// Frame buffer could not be flushed to the panel
    Bus,
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LineOutOfRange { line, max_lines } => write!(
                f,
                "line {line} does not exist; the display has {max_lines} lines"
            ),
            Self::TextTooLong => write!(f, "text does not fit on one line"),
            Self::Bus => write!(f, "display flush failed"),
        }
    }
}

impl core::error::Error for DisplayError {}

/// Steady-state failure surfaced by a sensor facade.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum SensorError {
    /// Transport fault with no cached value to fall back on
    Transport(TransportError),
    /// Argument out of range
    Range(RangeError),
    /// Display sink refused the rendered line
    Display(DisplayError),
    /// Throttled before any measurement ever succeeded
    NoReading,
}

impl From<TransportError> for SensorError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl From<RangeError> for SensorError {
    fn from(e: RangeError) -> Self {
        Self::Range(e)
    }
}

impl From<DisplayError> for SensorError {
    fn from(e: DisplayError) -> Self {
        Self::Display(e)
    }
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "{e}"),
            Self::Range(e) => write!(f, "{e}"),
            Self::Display(e) => write!(f, "{e}"),
            Self::NoReading => write!(f, "no reading available yet"),
        }
    }
}

impl core::error::Error for SensorError {}
