//! Pulse Timer
//!
//! Drives a trigger/echo exchange on a single pin and times the echo pulse:
//!
//! ```text
//!          trigger          echo
//!  ──┐  ┌───────┐  ┐      ┌────────────────┐
//!    └──┘       └──┘......┘                └──────
//!    ≥2µs  ≥5µs      AWAIT_RISING  AWAIT_FALLING
//!                  ^ start
//! ```
//!
//! Both edge waits are bounded by one window measured from `start`; the
//! window is not restarted for the falling edge. Any overrun yields the
//! duration `0`, which is also what a zero-length echo would measure. The
//! two cannot be told apart, and callers already treat `0` as "no echo".

use embedded_hal::delay::DelayNs;

use crate::config::{TRIGGER_PULSE_US, TRIGGER_SETTLE_US};
use crate::io::{Clock, IoPin};

/// Duration reported when the echo window runs out
pub const NO_ECHO: u32 = 0;

/// Bounded time window for one pulse exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct PulseWindow {
    /// Microsecond timestamp the window opened at
    pub start: u32,
    /// Window length in microseconds
    pub timeout_us: u32,
}

impl PulseWindow {
    /// Open a window at the current time
    pub fn open<C: Clock>(clock: &C, timeout_us: u32) -> Self {
        Self {
            start: clock.now_us(),
            timeout_us,
        }
    }

    /// True once `now` is `timeout_us` or more past `start`
    #[must_use]
    pub const fn expired_at(&self, now: u32) -> bool {
        now.wrapping_sub(self.start) >= self.timeout_us
    }
}

/// State of a pulse exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum PulsePhase {
    /// No exchange in progress
    Idle,
    /// Driving the trigger pulse
    Triggering,
    /// Waiting for the echo line to go high
    AwaitRising,
    /// Waiting for the echo line to go low again
    AwaitFalling {
        /// Timestamp of the rising edge
        pulse_begin: u32,
    },
    /// Exchange finished; `0` means the window ran out
    Done(u32),
}

/// Trigger/echo pulse timer on one pin.
pub struct PulseTimer<P> {
    pin: P,
    timeout_us: u32,
    phase: PulsePhase,
}

impl<P: IoPin> PulseTimer<P> {
    /// Take the pin, park it as a low output, and arm a `timeout_us` window.
    ///
    /// # Errors
    ///
    /// Returns the pin's error if it cannot be driven low.
    pub fn new(mut pin: P, timeout_us: u32) -> Result<Self, P::Error> {
        pin.make_output();
        pin.set_low()?;
        Ok(Self {
            pin,
            timeout_us,
            phase: PulsePhase::Idle,
        })
    }

    /// Echo window length
    #[must_use]
    pub const fn timeout_us(&self) -> u32 {
        self.timeout_us
    }

    /// Phase the last exchange ended in
    #[must_use]
    pub const fn phase(&self) -> PulsePhase {
        self.phase
    }

    /// Release the pin
    pub fn release(self) -> P {
        self.pin
    }

    /// Run one trigger/echo exchange and return the echo width in µs,
    /// or [`NO_ECHO`] if either edge missed the window.
    ///
    /// Busy-waits for up to `timeout_us` after the trigger.
    pub fn measure<C, D>(&mut self, clock: &C, delay: &mut D) -> u32
    where
        C: Clock,
        D: DelayNs,
    {
        self.phase = PulsePhase::Triggering;
        if self.trigger(delay).is_err() {
            warn!("trigger pin could not be driven");
            self.phase = PulsePhase::Done(NO_ECHO);
            return NO_ECHO;
        }

        let window = PulseWindow::open(clock, self.timeout_us);
        self.phase = PulsePhase::AwaitRising;

        loop {
            self.phase = match self.phase {
                PulsePhase::Idle | PulsePhase::Triggering => PulsePhase::AwaitRising,
                PulsePhase::AwaitRising => {
                    let now = clock.now_us();
                    match self.pin.is_high() {
                        _ if window.expired_at(now) => PulsePhase::Done(NO_ECHO),
                        Ok(true) => PulsePhase::AwaitFalling { pulse_begin: now },
                        Ok(false) => PulsePhase::AwaitRising,
                        Err(_) => PulsePhase::Done(NO_ECHO),
                    }
                }
                PulsePhase::AwaitFalling { pulse_begin } => {
                    let now = clock.now_us();
                    match self.pin.is_low() {
                        _ if window.expired_at(now) => PulsePhase::Done(NO_ECHO),
                        Ok(true) => PulsePhase::Done(now.wrapping_sub(pulse_begin)),
                        Ok(false) => PulsePhase::AwaitFalling { pulse_begin },
                        Err(_) => PulsePhase::Done(NO_ECHO),
                    }
                }
                PulsePhase::Done(duration) => {
                    if duration == NO_ECHO {
                        debug!("no echo within {} us", self.timeout_us);
                    }
                    return duration;
                }
            };
        }
    }

    fn trigger<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), P::Error> {
        self.pin.make_output();
        self.pin.set_low()?;
        delay.delay_us(TRIGGER_SETTLE_US);
        self.pin.set_high()?;
        delay.delay_us(TRIGGER_PULSE_US);
        self.pin.set_low()?;
        self.pin.make_input();
        Ok(())
    }
}
