//! Sensor Acquisition
//!
//! The components that decide *when* hardware is touched and *whether* what
//! came back is data:
//!
//! - [`refresh`]: throttles slow sensors against a monotonic clock
//! - [`frame`]: CRC-8 protected 16-bit words of the SCD30 register protocol
//! - [`ready`]: polls a ready flag, caching the last good measurement
//! - [`pulse`]: trigger/echo pulse-width timing with a hard timeout

pub mod frame;
pub mod pulse;
pub mod ready;
pub mod refresh;
