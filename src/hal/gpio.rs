//! GPIO Abstractions
//!
//! Single-wire Grove pins and the board's status LED.

use embassy_stm32::gpio::{Flex, Output, Pull, Speed};

use crate::io::IoPin;

/// A port pin that changes direction at run time (DHT data, ranger
/// trigger/echo). `Flex` already implements the `embedded-hal` pin traits.
impl IoPin for Flex<'_> {
    fn make_input(&mut self) {
        self.set_as_input(Pull::None);
    }

    fn make_output(&mut self) {
        self.set_as_output(Speed::VeryHigh);
    }
}

/// Status LED state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LedState {
    /// LED is off
    #[default]
    Off,
    /// LED is on
    On,
}

impl defmt::Format for LedState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Off => defmt::write!(f, "OFF"),
            Self::On => defmt::write!(f, "ON"),
        }
    }
}

/// Status LED driver
pub struct StatusLed<'d> {
    pin: Output<'d>,
    state: LedState,
}

impl<'d> StatusLed<'d> {
    /// Create a new status LED (initially off)
    #[must_use]
    pub fn new(mut pin: Output<'d>) -> Self {
        pin.set_low();
        Self {
            pin,
            state: LedState::Off,
        }
    }

    /// Turn LED on
    pub fn on(&mut self) {
        self.pin.set_high();
        self.state = LedState::On;
    }

    /// Turn LED off
    pub fn off(&mut self) {
        self.pin.set_low();
        self.state = LedState::Off;
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> LedState {
        self.state
    }
}
