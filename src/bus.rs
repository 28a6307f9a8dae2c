//! I2C Bus Handle
//!
//! All I2C devices sit on the one bus behind port 6. The board setup code
//! puts the bus in a `RefCell` once and hands each device a
//! [`RefCellDevice`] onto it. A device borrows the bus for exactly one
//! transaction; two overlapping borrows are a caller bug.

use embedded_hal::i2c::I2c;
pub use embedded_hal_bus::i2c::RefCellDevice;

use crate::config::{I2C_SCAN_END, I2C_SCAN_FIRST};
use crate::error::SetupError;
use crate::port::DeviceKind;

/// I2C device address wrapper
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct I2cAddress(u8);

impl I2cAddress {
    /// SCD30 CO2 sensor address
    pub const SCD30: Self = Self(crate::config::CO2_I2C_ADDR);

    /// TSL2561 light sensor address
    pub const TSL2561: Self = Self(crate::config::LIGHT_I2C_ADDR);

    /// SSD1306 OLED display address
    pub const SSD1306: Self = Self(crate::config::DISPLAY_I2C_ADDR);

    /// Create from 7-bit address
    #[must_use]
    pub const fn new(addr: u8) -> Self {
        Self(addr & 0x7F)
    }

    /// Get the 7-bit address
    #[must_use]
    pub const fn addr(self) -> u8 {
        self.0
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for I2cAddress {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "0x{:02X}", self.0);
    }
}

/// Number of addresses a scan covers
pub const SCAN_CAPACITY: usize = (I2C_SCAN_END - I2C_SCAN_FIRST) as usize;

/// True when a device acknowledges a one-byte read at `address`
#[must_use]
pub fn probe<I: I2c>(bus: &mut I, address: I2cAddress) -> bool {
    let mut buf = [0u8; 1];
    bus.read(address.addr(), &mut buf).is_ok()
}

/// Scan the I2C bus for devices
#[must_use]
pub fn scan<I: I2c>(bus: &mut I) -> heapless::Vec<I2cAddress, SCAN_CAPACITY> {
    (I2C_SCAN_FIRST..I2C_SCAN_END)
        .map(I2cAddress::new)
        .filter(|&addr| probe(bus, addr))
        .collect()
}

/// Fail setup unless a device answers at `address`.
///
/// # Errors
///
/// [`SetupError::DeviceAbsent`] when nothing acknowledges the address.
pub fn require_present<I: I2c>(
    bus: &mut I,
    kind: DeviceKind,
    address: I2cAddress,
) -> Result<(), SetupError> {
    if probe(bus, address) {
        Ok(())
    } else {
        error!(
            "{} not found at 0x{:02X}",
            kind.name(),
            address.addr()
        );
        Err(SetupError::DeviceAbsent {
            kind,
            address: address.addr(),
        })
    }
}
