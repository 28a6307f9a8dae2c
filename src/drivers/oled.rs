//! OLED Display Driver
//!
//! SSD1306 128x64 panel on the shared I2C bus, used as an 8-line text sink.
//! Drawing goes to a local frame buffer through `embedded-graphics`; each
//! [`DisplaySink::show_line`] clears the line's pixel rows, draws the text
//! and flushes the whole buffer.

use embedded_graphics::mono_font::ascii::FONT_5X8;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use embedded_hal::i2c::I2c;

use crate::bus::{require_present, I2cAddress};
use crate::config::{DISPLAY_HEIGHT, DISPLAY_LINE_HEIGHT, DISPLAY_MAX_LINES, DISPLAY_WIDTH};
use crate::display::{check_line, DisplaySink};
use crate::error::{DisplayError, SetupError};
use crate::port::{DeviceKind, PortBinding};

/// Frame buffer size: one bit per pixel
const BUFFER_LEN: usize = (DISPLAY_WIDTH * DISPLAY_HEIGHT / 8) as usize;

/// Bytes of pixel data per I2C write
const CHUNK_LEN: usize = 32;

/// Control byte prefixes
const CONTROL_COMMAND: u8 = 0x00;
const CONTROL_DATA: u8 = 0x40;

/// SSD1306 commands
mod cmd {
    pub const SET_CONTRAST: u8 = 0x81;
    pub const DISPLAY_ALL_ON_RESUME: u8 = 0xA4;
    pub const NORMAL_DISPLAY: u8 = 0xA6;
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_DISPLAY_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MULTIPLEX: u8 = 0xA8;
    pub const SET_START_LINE: u8 = 0x40;
    pub const MEMORY_MODE: u8 = 0x20;
    pub const COLUMN_ADDR: u8 = 0x21;
    pub const PAGE_ADDR: u8 = 0x22;
    pub const COM_SCAN_DEC: u8 = 0xC8;
    pub const SEG_REMAP: u8 = 0xA0;
    pub const CHARGE_PUMP: u8 = 0x8D;
}

/// Power-up sequence for a 128x64 panel with internal charge pump
const INIT_SEQUENCE: [u8; 25] = [
    cmd::DISPLAY_OFF,
    cmd::SET_DISPLAY_CLOCK_DIV,
    0x80,
    cmd::SET_MULTIPLEX,
    0x3F, // 64 rows
    cmd::SET_DISPLAY_OFFSET,
    0x00,
    cmd::SET_START_LINE,
    cmd::CHARGE_PUMP,
    0x14,
    cmd::MEMORY_MODE,
    0x00, // horizontal addressing
    cmd::SEG_REMAP | 0x01,
    cmd::COM_SCAN_DEC,
    cmd::SET_COM_PINS,
    0x12,
    cmd::SET_CONTRAST,
    0xCF,
    cmd::SET_PRECHARGE,
    0xF1,
    cmd::SET_VCOM_DETECT,
    0x40,
    cmd::DISPLAY_ALL_ON_RESUME,
    cmd::NORMAL_DISPLAY,
    cmd::DISPLAY_ON,
];

/// Display buffer (1 bit per pixel, page-major like the controller's RAM)
pub struct DisplayBuffer {
    buffer: [u8; BUFFER_LEN],
}

impl DisplayBuffer {
    /// Create an empty buffer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: [0; BUFFER_LEN],
        }
    }

    /// Clear every pixel
    pub fn clear(&mut self) {
        self.buffer.fill(0);
    }

    /// Set a pixel; coordinates off the panel are ignored
    pub fn set_pixel(&mut self, x: u32, y: u32, on: bool) {
        if x >= DISPLAY_WIDTH || y >= DISPLAY_HEIGHT {
            return;
        }

        let byte_idx = (y / 8 * DISPLAY_WIDTH + x) as usize;
        let bit = 1 << (y % 8);

        if on {
            self.buffer[byte_idx] |= bit;
        } else {
            self.buffer[byte_idx] &= !bit;
        }
    }

    /// True if the pixel is lit
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> bool {
        if x >= DISPLAY_WIDTH || y >= DISPLAY_HEIGHT {
            return false;
        }
        self.buffer[(y / 8 * DISPLAY_WIDTH + x) as usize] & (1 << (y % 8)) != 0
    }

    /// Raw buffer in controller order
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawTarget for DisplayBuffer {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if let (Ok(x), Ok(y)) = (u32::try_from(coord.x), u32::try_from(coord.y)) {
                self.set_pixel(x, y, color.is_on());
            }
        }
        Ok(())
    }
}

impl OriginDimensions for DisplayBuffer {
    fn size(&self) -> Size {
        Size::new(DISPLAY_WIDTH, DISPLAY_HEIGHT)
    }
}

/// Draw `text` into the pixel rows of `line` (1-based), clearing them first
///
/// # Errors
///
/// [`DisplayError::LineOutOfRange`] for line `0` or a line past the panel;
/// the buffer is left untouched.
pub fn render_line(buffer: &mut DisplayBuffer, line: u8, text: &str) -> Result<(), DisplayError> {
    check_line(line, DISPLAY_MAX_LINES)?;
    let top = i32::from(line - 1) * DISPLAY_LINE_HEIGHT as i32;
    let band = Rectangle::new(Point::new(0, top), Size::new(DISPLAY_WIDTH, DISPLAY_LINE_HEIGHT));
    let _ = band
        .into_styled(PrimitiveStyle::with_fill(BinaryColor::Off))
        .draw(buffer);

    let style = MonoTextStyle::new(&FONT_5X8, BinaryColor::On);
    let _ = Text::with_baseline(text, Point::new(0, top), style, Baseline::Top).draw(buffer);
    Ok(())
}

/// SSD1306 text display
pub struct Oled<I> {
    bus: I,
    binding: PortBinding,
    address: I2cAddress,
    buffer: DisplayBuffer,
}

impl<I: I2c> Oled<I> {
    /// Bind the display to `port` (default 6), check it answers on the bus,
    /// run the power-up sequence and blank the panel.
    ///
    /// # Errors
    ///
    /// [`SetupError::WrongPort`] off port 6, [`SetupError::DeviceAbsent`]
    /// if the panel is not found, [`SetupError::Bus`] if initialization
    /// fails.
    pub fn new(mut bus: I, port: Option<u8>) -> Result<Self, SetupError> {
        let binding = PortBinding::bind(DeviceKind::OledScreen, port)?;
        let address = I2cAddress::SSD1306;
        require_present(&mut bus, DeviceKind::OledScreen, address)?;

        let mut oled = Self {
            bus,
            binding,
            address,
            buffer: DisplayBuffer::new(),
        };
        oled.init().map_err(|_| SetupError::Bus)?;
        info!("{} connected at Port {}", DeviceKind::OledScreen.name(), binding.port().number());
        Ok(oled)
    }

    /// Port binding
    #[must_use]
    pub const fn binding(&self) -> PortBinding {
        self.binding
    }

    /// Frame buffer as last drawn
    #[must_use]
    pub const fn buffer(&self) -> &DisplayBuffer {
        &self.buffer
    }

    /// Blank the panel
    ///
    /// # Errors
    ///
    /// [`DisplayError::Bus`] if the flush fails.
    pub fn clear(&mut self) -> Result<(), DisplayError> {
        self.buffer.clear();
        self.flush()
    }

    /// Set panel contrast
    ///
    /// # Errors
    ///
    /// [`DisplayError::Bus`] if the write fails.
    pub fn set_contrast(&mut self, contrast: u8) -> Result<(), DisplayError> {
        self.send_command(cmd::SET_CONTRAST)?;
        self.send_command(contrast)
    }

    /// Release the bus handle
    pub fn release(self) -> I {
        self.bus
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        for &c in &INIT_SEQUENCE {
            self.send_command(c)?;
        }
        self.clear()
    }

    fn send_command(&mut self, command: u8) -> Result<(), DisplayError> {
        self.bus
            .write(self.address.addr(), &[CONTROL_COMMAND, command])
            .map_err(|_| DisplayError::Bus)
    }

    /// Push the whole buffer to the panel
    fn flush(&mut self) -> Result<(), DisplayError> {
        for c in [cmd::COLUMN_ADDR, 0, 127, cmd::PAGE_ADDR, 0, 7] {
            self.send_command(c)?;
        }

        let mut buf = [0u8; CHUNK_LEN + 1];
        buf[0] = CONTROL_DATA;
        for chunk in self.buffer.as_bytes().chunks(CHUNK_LEN) {
            buf[1..=chunk.len()].copy_from_slice(chunk);
            self.bus
                .write(self.address.addr(), &buf[..=chunk.len()])
                .map_err(|_| DisplayError::Bus)?;
        }
        Ok(())
    }
}

impl<I: I2c> DisplaySink for Oled<I> {
    fn max_lines(&self) -> u8 {
        DISPLAY_MAX_LINES
    }

    fn show_line(&mut self, line: u8, text: &str) -> Result<(), DisplayError> {
        render_line(&mut self.buffer, line, text)?;
        trace!("line {}: {}", line, text);
        self.flush()
    }
}
