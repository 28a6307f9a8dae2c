//! Timer Abstractions
//!
//! The embassy time driver backs both the [`Clock`] used for bounded busy
//! waits and, through `embassy_time::Delay`, the blocking `DelayNs`.

use embassy_time::Instant;

use crate::io::Clock;

/// Monotonic clock over the embassy time driver.
///
/// Truncating the 64-bit tick count to `u32` gives the wrapping counters the
/// acquisition layer expects.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    #[allow(clippy::cast_possible_truncation)]
    fn now_us(&self) -> u32 {
        Instant::now().as_micros() as u32
    }

    #[allow(clippy::cast_possible_truncation)]
    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }
}

impl defmt::Format for EmbassyClock {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "EmbassyClock({}ms)", self.now_ms());
    }
}
