//! System configuration and hardware constants
//!
//! This module defines compile-time constants for the Grove carrier board.
//! Port mappings, bus addresses, sensor timing and display geometry are
//! centralized here.

/// Number of Grove ports on the board
pub const PORT_COUNT: usize = 6;

/// Physical pin behind each logical port (index 0 is port 1)
pub const PORT_PINS: [u8; PORT_COUNT] = [14, 12, 13, 0, 3, 5];

/// Port wired to the shared I2C bus
pub const I2C_PORT: u8 = 6;

/// Port wired to the single analog input
pub const ANALOG_PORT: u8 = 4;

/// Port sharing its pin with the serial/boot line
pub const BOOT_PORT: u8 = 5;

/// I2C bus frequency for sensors and display
pub const I2C_FREQUENCY_HZ: u32 = 100_000;

/// First address probed by a bus scan
pub const I2C_SCAN_FIRST: u8 = 0x08;

/// One past the last address probed by a bus scan
pub const I2C_SCAN_END: u8 = 0x78;

/// SCD30 CO2 sensor I2C address
pub const CO2_I2C_ADDR: u8 = 0x61;

/// TSL2561 light sensor I2C address (ADDR pin floating)
pub const LIGHT_I2C_ADDR: u8 = 0x29;

/// SSD1306 OLED I2C address
pub const DISPLAY_I2C_ADDR: u8 = 0x3C;

/// Minimum time between DHT22 ("pro") measurements in milliseconds
pub const DHT22_REFRESH_MS: u32 = 500;

/// Minimum time between DHT11 measurements in milliseconds
pub const DHT11_REFRESH_MS: u32 = 1_000;

/// Poll interval while the CO2 sensor warms up
pub const CO2_WARMUP_POLL_MS: u32 = 1_000;

/// Settle time after starting continuous CO2 measurement
pub const CO2_START_SETTLE_MS: u32 = 500;

/// Echo timeout for the ultrasonic ranger (`500 * 2 * 30` µs)
pub const DISTANCE_TIMEOUT_US: u32 = 500 * 2 * 30;

/// Decimal places used for distances unless the caller asks otherwise
pub const DISTANCE_DEFAULT_DIGITS: u8 = 2;

/// Most decimal places a distance can be rounded to; `f32` carries no more
pub const DISTANCE_MAX_DIGITS: u8 = 6;

/// Round-trip microseconds per centimeter, halved out by the caller
pub const US_PER_CM: f32 = 29.1;

/// Round-trip microseconds per inch, halved out by the caller
pub const US_PER_INCH: f32 = 73.746;

/// Trigger pulse: low hold before the rising edge (µs)
pub const TRIGGER_SETTLE_US: u32 = 2;

/// Trigger pulse: high hold (µs)
pub const TRIGGER_PULSE_US: u32 = 5;

/// DHT start signal: host holds the line low this long (ms)
pub const DHT_START_LOW_MS: u32 = 18;

/// DHT start signal: host releases the line high this long (µs)
pub const DHT_START_RELEASE_US: u32 = 40;

/// DHT per-edge timeout (µs)
pub const DHT_EDGE_TIMEOUT_US: u32 = 100;

/// DHT high pulse longer than this encodes a `1` bit (µs)
pub const DHT_ONE_THRESHOLD_US: u32 = 50;

/// Display width in pixels
pub const DISPLAY_WIDTH: u32 = 128;

/// Display height in pixels
pub const DISPLAY_HEIGHT: u32 = 64;

/// Pixel rows per text line
pub const DISPLAY_LINE_HEIGHT: u32 = 8;

/// Text lines available on the display
pub const DISPLAY_MAX_LINES: u8 = (DISPLAY_HEIGHT / DISPLAY_LINE_HEIGHT) as u8;

/// Minimum time between uplink deliveries in milliseconds
pub const UPLINK_INTERVAL_MS: u32 = 10_000;

/// Period of the board's acquisition loop in milliseconds
pub const SAMPLE_PERIOD_MS: u64 = 10_000;

/// Pin assignments for GPIO
pub mod pins {
    //! STM32G474 pins behind each Grove port on the carrier board

    /// Port 1 signal (digital)
    pub const PORT1: &str = "PB0";

    /// Port 2 signal (digital)
    pub const PORT2: &str = "PB1";

    /// Port 3 signal (digital)
    pub const PORT3: &str = "PB2";

    /// Port 4 signal (ADC1_IN1)
    pub const PORT4: &str = "PA0";

    /// Port 5 signal (shared with USART2 RX)
    pub const PORT5: &str = "PA3";

    /// Port 6 I2C1 SCL
    pub const PORT6_SCL: &str = "PB8";

    /// Port 6 I2C1 SDA
    pub const PORT6_SDA: &str = "PB9";

    /// Status LED (directly on MCU)
    pub const LED_STATUS: &str = "PA5";
}
