//! Hardware seams
//!
//! The acquisition layer never touches a peripheral directly. It is written
//! against these traits plus the `embedded-hal` 1.0 pin, I2C and delay traits,
//! so the same code runs on the board and against fakes on the host.

use embedded_hal::digital::{InputPin, OutputPin};

/// Monotonic time source.
///
/// Both counters wrap. Callers must compare timestamps with
/// `wrapping_sub`, never with `<`/`>` on raw values.
pub trait Clock {
    /// Current time in microseconds (wrapping).
    fn now_us(&self) -> u32;

    /// Current time in milliseconds (wrapping).
    fn now_ms(&self) -> u32;

    /// Microseconds elapsed since `start`, tolerant of counter rollover.
    fn elapsed_us(&self, start: u32) -> u32 {
        self.now_us().wrapping_sub(start)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_us(&self) -> u32 {
        (**self).now_us()
    }

    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

/// A single-wire pin that switches between driving and sensing.
///
/// Used by the trigger/echo distance sensor and the DHT humidity sensors,
/// which both share one data line between host and device.
pub trait IoPin: InputPin + OutputPin {
    /// Release the line and sample it as an input.
    fn make_input(&mut self);

    /// Drive the line as a push-pull output.
    fn make_output(&mut self);
}

/// Raw single-channel analog input.
pub trait AnalogSource {
    /// Sample the channel once.
    fn read_raw(&mut self) -> u16;
}
