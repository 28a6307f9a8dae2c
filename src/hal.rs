//! Hardware Abstraction Layer
//!
//! Binds the seams in [`crate::io`] to STM32G474 peripherals through
//! embassy-stm32. Everything above this module is written against traits,
//! so this is the only place that names a peripheral.

pub mod adc;
pub mod gpio;
pub mod timer;
