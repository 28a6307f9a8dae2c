//! DHT11 / DHT22 Single-Wire Driver
//!
//! The host pulls the data line low to request a reading, then releases it.
//! The sensor answers with an 80 µs low / 80 µs high preamble followed by 40
//! bits. Every bit starts with a ~50 µs low; the length of the following high
//! encodes the value (~27 µs for `0`, ~70 µs for `1`).
//!
//! ```text
//! byte 0      byte 1      byte 2      byte 3      byte 4
//! humidity    humidity    temperature temperature checksum
//! (int/hi)    (dec/lo)    (int/hi)    (dec/lo)    sum of 0..4
//! ```
//!
//! Every edge wait is bounded, so a missing sensor costs at most a few
//! hundred microseconds plus the start signal.

use embedded_hal::delay::DelayNs;

use crate::config::{
    DHT11_REFRESH_MS, DHT22_REFRESH_MS, DHT_EDGE_TIMEOUT_US, DHT_ONE_THRESHOLD_US,
    DHT_START_LOW_MS, DHT_START_RELEASE_US,
};
use crate::error::TransportError;
use crate::io::{Clock, IoPin};
use crate::types::Humiture;

/// Payload bytes in one transfer, checksum included
const FRAME_LEN: usize = 5;

/// Sensor variant. They share the wire protocol but not the encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum DhtVariant {
    /// DHT11: whole degrees and percent, 1 s settle time
    Dht11,
    /// DHT22 / AM2302: tenths, signed temperature, 0.5 s settle time
    Dht22,
}

impl DhtVariant {
    /// Minimum time between measurements
    #[must_use]
    pub const fn min_refresh_ms(self) -> u32 {
        match self {
            Self::Dht11 => DHT11_REFRESH_MS,
            Self::Dht22 => DHT22_REFRESH_MS,
        }
    }

    /// Decode a checksum-valid frame
    #[must_use]
    pub fn decode(self, frame: [u8; FRAME_LEN]) -> Humiture {
        match self {
            Self::Dht11 => Humiture {
                celsius: f32::from(frame[2]),
                humidity: f32::from(frame[0]),
            },
            Self::Dht22 => {
                let humidity = u16::from_be_bytes([frame[0], frame[1]]);
                let magnitude = u16::from_be_bytes([frame[2] & 0x7F, frame[3]]);
                let tenths = if frame[2] & 0x80 != 0 {
                    -f32::from(magnitude)
                } else {
                    f32::from(magnitude)
                };
                Humiture {
                    celsius: tenths / 10.0,
                    humidity: f32::from(humidity) / 10.0,
                }
            }
        }
    }
}

/// Additive checksum over the first four bytes
#[must_use]
pub fn frame_checksum_ok(frame: &[u8; FRAME_LEN]) -> bool {
    let sum = frame[..4].iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    sum == frame[4]
}

/// DHT driver. Keeps the last successfully decoded values, which is what a
/// throttled caller reads back.
pub struct Dht<P> {
    pin: P,
    variant: DhtVariant,
    last: Option<Humiture>,
}

impl<P: IoPin> Dht<P> {
    /// Take the data pin and idle it high
    ///
    /// # Errors
    ///
    /// Returns the pin's error if it cannot be driven.
    pub fn new(mut pin: P, variant: DhtVariant) -> Result<Self, P::Error> {
        pin.make_output();
        pin.set_high()?;
        Ok(Self {
            pin,
            variant,
            last: None,
        })
    }

    /// Sensor variant
    #[must_use]
    pub const fn variant(&self) -> DhtVariant {
        self.variant
    }

    /// Values from the last successful transfer
    #[must_use]
    pub const fn last(&self) -> Option<Humiture> {
        self.last
    }

    /// Run one transfer.
    ///
    /// On success the decoded values also become [`Dht::last`]. On failure
    /// `last` is left untouched.
    ///
    /// # Errors
    ///
    /// [`TransportError::Timeout`] if an edge is missed,
    /// [`TransportError::Checksum`] if the frame does not add up,
    /// [`TransportError::Pin`] if the line cannot be driven or sampled.
    pub fn measure<C, D>(&mut self, clock: &C, delay: &mut D) -> Result<Humiture, TransportError>
    where
        C: Clock,
        D: DelayNs,
    {
        let frame = self.transfer(clock, delay)?;
        if !frame_checksum_ok(&frame) {
            warn!("DHT checksum mismatch");
            return Err(TransportError::Checksum);
        }
        let values = self.variant.decode(frame);
        self.last = Some(values);
        Ok(values)
    }

    fn transfer<C, D>(&mut self, clock: &C, delay: &mut D) -> Result<[u8; FRAME_LEN], TransportError>
    where
        C: Clock,
        D: DelayNs,
    {
        // Start signal
        self.pin.make_output();
        self.pin.set_low().map_err(|_| TransportError::Pin)?;
        delay.delay_ms(DHT_START_LOW_MS);
        self.pin.set_high().map_err(|_| TransportError::Pin)?;
        delay.delay_us(DHT_START_RELEASE_US);
        self.pin.make_input();

        // Preamble: sensor pulls low, then high, then low for the first bit
        self.wait_for(clock, false)?;
        self.wait_for(clock, true)?;
        self.wait_for(clock, false)?;

        let mut frame = [0u8; FRAME_LEN];
        for bit in 0..FRAME_LEN * 8 {
            self.wait_for(clock, true)?;
            let high_us = self.wait_for(clock, false)?;
            if high_us > DHT_ONE_THRESHOLD_US {
                frame[bit / 8] |= 0x80 >> (bit % 8);
            }
        }
        Ok(frame)
    }

    /// Busy-wait until the line reads `high`, returning how long it took
    fn wait_for<C: Clock>(&mut self, clock: &C, high: bool) -> Result<u32, TransportError> {
        let start = clock.now_us();
        loop {
            let elapsed = clock.elapsed_us(start);
            if self.pin.is_high().map_err(|_| TransportError::Pin)? == high {
                return Ok(elapsed);
            }
            if elapsed >= DHT_EDGE_TIMEOUT_US {
                return Err(TransportError::Timeout);
            }
        }
    }
}
