//! Grove Sensor Firmware Library
//!
//! This library provides the sensor acquisition layer for a microcontroller
//! board with six numbered Grove ports. Each plug-in sensor is exposed through
//! the same small surface ([`sensors::Sensor`]): take a reading, or take a
//! reading and render it on a text display.
//!
//! # Architecture
//!
//! The firmware is organized in layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    APPLICATION LAYER                         │
//! │  Sensor facades  │  Display sink  │  Uplink scheduler         │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   ACQUISITION LAYER                          │
//! │  RefreshGate  │  ChecksumFrame + ReadyPoller  │  PulseTimer   │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   DRIVER / PORT LAYER                        │
//! │  SCD30  │  DHT11/22  │  TSL2561  │  SSD1306  │  PortBinding   │
//! ├─────────────────────────────────────────────────────────────┤
//! │                 embedded-hal 1.0 traits                      │
//! │     embassy-stm32 on target  │  fakes in host tests          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **Composition over inheritance**: a sensor owns a [`port::PortBinding`]
//!   and the acquisition component it needs, and delegates to them
//! - **Explicit bus handle**: the shared I2C bus is passed into constructors,
//!   never reached through a global
//! - **Two error channels**: setup faults are fatal `Result`s from
//!   constructors, steady-state faults degrade to cached or sentinel data
//! - **Injected time**: every bounded wait runs against a [`io::Clock`] and an
//!   `embedded_hal::delay::DelayNs`, so timing logic is tested on the host
//!
//! # Features
//!
//! - `std` (default): host build, logging through `log`
//! - `embedded`: `no_std` STM32G474 build, logging through `defmt`; build with
//!   `--no-default-features --features embedded`

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Must come first so the logging macros are visible to every module below.
#[macro_use]
mod fmt;

// Re-export dependencies needed by applications (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_executor;
#[cfg(feature = "embedded")]
pub use embassy_stm32;
#[cfg(feature = "embedded")]
pub use embassy_time;

/// Hardware Abstraction Layer
///
/// Binds the hardware seams of [`io`] to STM32G474 peripherals.
#[cfg(feature = "embedded")]
pub mod hal;

/// Hardware seams: clock, direction-switching pins, analog sources.
pub mod io;

/// Shared I2C bus handle and bus scanning.
pub mod bus;

/// Logical port numbers, device kinds and wiring constraints.
pub mod port;

/// Sensor Acquisition
///
/// Refresh throttling, checksummed frames, ready polling and pulse timing.
pub mod acquisition;

/// Peripheral Drivers
///
/// Register- and wire-level drivers for the plug-in ICs.
pub mod drivers;

/// Uniform sensor surface built on the acquisition layer.
pub mod sensors;

/// Text display sink contract and line formatting.
pub mod display;

/// Best-effort reading uplink.
pub mod uplink;

/// Error types for setup and steady-state operation.
pub mod error;

/// Shared types used across modules
pub mod types;

/// System configuration and constants
pub mod config;

/// Prelude module for common imports
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::config::*;
    pub use crate::error::{DisplayError, RangeError, SensorError, SetupError, TransportError};
    pub use crate::types::*;

    pub use crate::display::DisplaySink;
    pub use crate::io::{AnalogSource, Clock, IoPin};
    pub use crate::port::{DeviceKind, Port, PortBinding};
    pub use crate::sensors::Sensor;

    // Common traits
    pub use embedded_hal::delay::DelayNs;
    pub use embedded_hal::digital::{InputPin, OutputPin};
    pub use embedded_hal::i2c::I2c;

    // Embassy
    #[cfg(feature = "embedded")]
    pub use embassy_time::{Duration, Instant, Timer};

    // Logging
    #[cfg(feature = "embedded")]
    pub use defmt::{debug, error, info, trace, warn};
}
