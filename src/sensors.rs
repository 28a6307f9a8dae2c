//! Sensor Facades
//!
//! Each plug-in sensor owns a [`PortBinding`] plus the acquisition component
//! it needs and exposes the same surface: [`Sensor::get_data`] for a reading,
//! [`Sensor::show_data`] to take a reading and put it on a display.
//!
//! A sensor that can still answer from cache does so when the wire fails;
//! only a sensor with nothing to fall back on returns an error.

use crate::display::{check_line, format_line, DisplaySink};
use crate::error::SensorError;
use crate::port::{Port, PortBinding};
use crate::types::Reading;

pub mod analog;
pub mod co2;
pub mod digital;
pub mod distance;
pub mod humiture;
pub mod light;

pub use analog::AnalogSensor;
pub use co2::Co2Sensor;
pub use digital::DigitalSensor;
pub use distance::DistanceSensor;
pub use humiture::TempHumSensor;
pub use light::LightSensor;

/// Uniform surface every sensor exposes.
pub trait Sensor {
    /// Port the sensor was bound to
    fn binding(&self) -> PortBinding;

    /// Take a reading, throttled and validated by the sensor's acquisition
    /// component.
    ///
    /// # Errors
    ///
    /// Only when there is neither a fresh nor a cached value to return.
    fn get_data(&mut self) -> Result<Reading, SensorError>;

    /// Logical port number
    fn port(&self) -> Port {
        self.binding().port()
    }

    /// Take a reading, render it as `{label}: {value}` on `line` and return
    /// the reading that was shown. Without a label the line is prefixed
    /// `>{port}`.
    ///
    /// # Errors
    ///
    /// [`SensorError::Display`] for a line the display does not have (checked
    /// before the sensor is touched) or a line that does not fit, plus
    /// anything [`Sensor::get_data`] returns.
    fn show_data_labeled<S: DisplaySink>(
        &mut self,
        display: &mut S,
        line: u8,
        label: Option<&str>,
    ) -> Result<Reading, SensorError> {
        check_line(line, display.max_lines())?;
        let reading = self.get_data()?;
        let text = format_line(self.port(), label, &reading)?;
        display.show_line(line, &text)?;
        Ok(reading)
    }

    /// [`Sensor::show_data_labeled`] with the default `>{port}` label.
    ///
    /// # Errors
    ///
    /// As [`Sensor::show_data_labeled`].
    fn show_data<S: DisplaySink>(&mut self, display: &mut S, line: u8) -> Result<Reading, SensorError> {
        self.show_data_labeled(display, line, None)
    }
}
