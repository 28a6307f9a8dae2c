//! Ready Poller
//!
//! A sensor that measures on its own schedule raises a "data ready" flag
//! when a fresh result can be read. The poller reads it only when the flag is
//! up and otherwise hands back the last good result. Before the first result
//! exists there is nothing to hand back, so the first call blocks until the
//! device has warmed up.

use embedded_hal::delay::DelayNs;

/// A device with a ready flag and a measurement register.
pub trait ReadySource {
    /// Decoded measurement
    type Output: Copy;

    /// True when a fresh measurement is waiting. Any transport fault,
    /// including a checksum failure on the flag itself, reads as not ready.
    fn data_ready(&mut self) -> bool;

    /// Read and decode the waiting measurement, `None` if the response
    /// failed validation.
    fn read_measurement(&mut self) -> Option<Self::Output>;
}

/// Ready-flag poller with a last-known-good cache.
#[derive(Clone, Copy, Debug)]
pub struct ReadyPoller<T> {
    cache: Option<T>,
    poll_interval_ms: u32,
}

impl<T: Copy> ReadyPoller<T> {
    /// Create a poller that waits `poll_interval_ms` between warm-up polls
    #[must_use]
    pub const fn new(poll_interval_ms: u32) -> Self {
        Self {
            cache: None,
            poll_interval_ms,
        }
    }

    /// Last good measurement, if any
    #[must_use]
    pub const fn cached(&self) -> Option<T> {
        self.cache
    }

    /// Return a current measurement.
    ///
    /// - flag up: read, cache and return it (a response that fails
    ///   validation leaves the cache as it was)
    /// - flag down, cache present: return the cache without re-polling
    /// - flag down, no cache: print a one-time notice and poll every
    ///   `poll_interval_ms` until a measurement arrives
    ///
    /// The last case has no timeout. The device gives no bound on its
    /// warm-up, so neither does this call.
    pub fn get_reading<S, D>(&mut self, source: &mut S, delay: &mut D) -> T
    where
        S: ReadySource<Output = T>,
        D: DelayNs,
    {
        if source.data_ready() {
            if let Some(fresh) = source.read_measurement() {
                self.cache = Some(fresh);
            }
        }

        if let Some(cached) = self.cache {
            return cached;
        }

        info!("Sensor initializing. Please wait.");
        loop {
            delay.delay_ms(self.poll_interval_ms);
            if !source.data_ready() {
                continue;
            }
            if let Some(fresh) = source.read_measurement() {
                debug!("sensor warm-up complete");
                self.cache = Some(fresh);
                return fresh;
            }
        }
    }
}
