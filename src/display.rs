//! Text display sink
//!
//! Sensors render their readings as short text lines. Anything that can put
//! a line of text on a numbered row implements [`DisplaySink`]; the OLED
//! driver is one, the host tests use a recording fake.

use core::fmt::Write;

use heapless::String;

use crate::error::DisplayError;
use crate::port::Port;
use crate::types::Reading;

/// Longest line a sink is asked to show
pub const LINE_CAPACITY: usize = 32;

/// One rendered display line
pub type LineText = String<LINE_CAPACITY>;

/// A display addressed by 1-based text lines.
pub trait DisplaySink {
    /// Number of text lines; valid line numbers are `1..=max_lines()`
    fn max_lines(&self) -> u8;

    /// Replace the contents of `line` with `text`.
    ///
    /// # Errors
    ///
    /// [`DisplayError::LineOutOfRange`] for `line == 0` or
    /// `line > max_lines()`; the sink is left untouched.
    fn show_line(&mut self, line: u8, text: &str) -> Result<(), DisplayError>;
}

impl<S: DisplaySink + ?Sized> DisplaySink for &mut S {
    fn max_lines(&self) -> u8 {
        (**self).max_lines()
    }

    fn show_line(&mut self, line: u8, text: &str) -> Result<(), DisplayError> {
        (**self).show_line(line, text)
    }
}

/// Check `line` against a sink with `max_lines` lines.
///
/// # Errors
///
/// [`DisplayError::LineOutOfRange`] outside `1..=max_lines`.
pub const fn check_line(line: u8, max_lines: u8) -> Result<(), DisplayError> {
    if line == 0 || line > max_lines {
        Err(DisplayError::LineOutOfRange { line, max_lines })
    } else {
        Ok(())
    }
}

/// Render `{label}: {reading}`, with `>{port}` as the label when none is given.
///
/// # Errors
///
/// [`DisplayError::TextTooLong`] if the line does not fit [`LineText`].
pub fn format_line(port: Port, label: Option<&str>, reading: &Reading) -> Result<LineText, DisplayError> {
    let mut text = LineText::new();
    match label {
        Some(label) => write!(text, "{label}: {reading}"),
        None => write!(text, ">{port}: {reading}"),
    }
    .map_err(|_| DisplayError::TextTooLong)?;
    Ok(text)
}

/// Render `{label}: {value}` for an arbitrary displayable value.
///
/// # Errors
///
/// [`DisplayError::TextTooLong`] if the line does not fit [`LineText`].
pub fn format_value(
    port: Port,
    label: Option<&str>,
    value: impl core::fmt::Display,
) -> Result<LineText, DisplayError> {
    let mut text = LineText::new();
    match label {
        Some(label) => write!(text, "{label}: {value}"),
        None => write!(text, ">{port}: {value}"),
    }
    .map_err(|_| DisplayError::TextTooLong)?;
    Ok(text)
}
