//! `TSL2561` Light Sensor Driver
//!
//! Two photodiodes: channel 0 sees visible plus infrared, channel 1 mostly
//! infrared. The driver runs the sensor at 402 ms integration and 1x gain
//! and converts both counts to lux with the datasheet's piecewise
//! approximation for the T/FN/CL package.

use embedded_hal::i2c::I2c;
#[cfg(not(feature = "std"))]
use micromath::F32Ext;

use crate::bus::I2cAddress;
use crate::error::TransportError;

/// Register addresses and control bits
mod reg {
    /// Command bit, set on every register access
    pub const COMMAND: u8 = 0x80;
    /// Word protocol bit for 16-bit reads
    pub const WORD: u8 = 0x20;
    /// Power control register
    pub const CONTROL: u8 = 0x00;
    /// Integration time and gain register
    pub const TIMING: u8 = 0x01;
    /// Channel 0 data, little-endian word
    pub const DATA0: u8 = 0x0C;
    /// Channel 1 data, little-endian word
    pub const DATA1: u8 = 0x0E;

    pub const POWER_ON: u8 = 0x03;
    pub const POWER_OFF: u8 = 0x00;
    /// 402 ms integration, 1x gain
    pub const TIMING_402MS_1X: u8 = 0x02;
}

/// Counts are normalized to 16x gain before the lux formula
const GAIN_SCALE: u32 = 16;

/// Raw count reported when a channel clips
const SATURATED: u16 = 0xFFFF;

/// `TSL2561` driver
#[derive(Clone, Copy, Debug)]
pub struct Tsl2561 {
    address: I2cAddress,
}

impl Tsl2561 {
    /// Create a driver for the device at `address`
    #[must_use]
    pub const fn new(address: I2cAddress) -> Self {
        Self { address }
    }

    /// Device address
    #[must_use]
    pub const fn address(&self) -> I2cAddress {
        self.address
    }

    /// Power the device up and select 402 ms / 1x timing.
    ///
    /// # Errors
    ///
    /// [`TransportError::Bus`] if either register write fails.
    pub fn init<I: I2c>(&self, bus: &mut I) -> Result<(), TransportError> {
        self.write_reg(bus, reg::CONTROL, reg::POWER_ON)?;
        self.write_reg(bus, reg::TIMING, reg::TIMING_402MS_1X)
    }

    /// Power the device down
    ///
    /// # Errors
    ///
    /// [`TransportError::Bus`] if the write fails.
    pub fn power_off<I: I2c>(&self, bus: &mut I) -> Result<(), TransportError> {
        self.write_reg(bus, reg::CONTROL, reg::POWER_OFF)
    }

    /// Raw `(channel0, channel1)` counts
    ///
    /// # Errors
    ///
    /// [`TransportError::Bus`] if either read fails.
    pub fn channels<I: I2c>(&self, bus: &mut I) -> Result<(u16, u16), TransportError> {
        Ok((self.read_word(bus, reg::DATA0)?, self.read_word(bus, reg::DATA1)?))
    }

    /// Illuminance in whole lux
    ///
    /// # Errors
    ///
    /// [`TransportError::Saturated`] when either channel clipped,
    /// [`TransportError::Bus`] if a read fails.
    pub fn lux<I: I2c>(&self, bus: &mut I) -> Result<u32, TransportError> {
        let (ch0, ch1) = self.channels(bus)?;
        if ch0 == SATURATED || ch1 == SATURATED {
            warn!("light sensor saturated");
            return Err(TransportError::Saturated);
        }
        Ok(lux_from_channels(ch0, ch1))
    }

    fn write_reg<I: I2c>(&self, bus: &mut I, register: u8, value: u8) -> Result<(), TransportError> {
        bus.write(self.address.addr(), &[reg::COMMAND | register, value])
            .map_err(|_| TransportError::Bus)
    }

    fn read_word<I: I2c>(&self, bus: &mut I, register: u8) -> Result<u16, TransportError> {
        let mut data = [0u8; 2];
        bus.write_read(
            self.address.addr(),
            &[reg::COMMAND | reg::WORD | register],
            &mut data,
        )
        .map_err(|_| TransportError::Bus)?;
        Ok(u16::from_le_bytes(data))
    }
}

/// Datasheet lux approximation for 402 ms integration at 1x gain.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn lux_from_channels(ch0: u16, ch1: u16) -> u32 {
    if ch0 == 0 {
        return 0;
    }
    // u16 * 16 is exact in f32
    #[allow(clippy::cast_precision_loss)]
    let (c0, c1) = (
        (u32::from(ch0) * GAIN_SCALE) as f32,
        (u32::from(ch1) * GAIN_SCALE) as f32,
    );
    let ratio = c1 / c0;

    let lux = if ratio <= 0.50 {
        0.0304 * c0 - 0.062 * c0 * ratio.powf(1.4)
    } else if ratio <= 0.61 {
        0.0224 * c0 - 0.031 * c1
    } else if ratio <= 0.80 {
        0.0128 * c0 - 0.0153 * c1
    } else if ratio <= 1.30 {
        0.00146 * c0 - 0.00112 * c1
    } else {
        0.0
    };

    lux.max(0.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_is_zero() {
        assert_eq!(lux_from_channels(0, 0), 0);
        assert_eq!(lux_from_channels(0, 100), 0);
    }

    #[test]
    fn infrared_dominated_is_zero() {
        assert_eq!(lux_from_channels(100, 200), 0);
    }

    #[test]
    fn no_infrared() {
        // 1000 * 16 * 0.0304
        assert_eq!(lux_from_channels(1000, 0), 486);
    }
}
