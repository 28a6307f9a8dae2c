//! Peripheral Drivers
//!
//! Register- and wire-level drivers for the plug-in ICs. Drivers that sit on
//! the shared I2C bus hold only their address and take the bus per call; the
//! single-wire drivers own their pin.

pub mod dht;
pub mod oled;
pub mod scd30;
pub mod tsl2561;
