//! Host-side fakes for pins, time, the I2C bus and the display.
//!
//! Time is a shared microsecond counter. Delays advance it, and every pin
//! read advances it by 1 µs so busy-wait loops always make progress.

#![allow(dead_code)]

use std::cell::Cell;
use std::collections::{HashMap, VecDeque};
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType as PinErrorType, InputPin, OutputPin};
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

use grove_firmware::acquisition::frame::crc8;
use grove_firmware::display::{check_line, DisplaySink};
use grove_firmware::error::DisplayError;
use grove_firmware::io::{AnalogSource, Clock, IoPin};

// ============================================================================
// Time
// ============================================================================

/// Shared microsecond counter
#[derive(Clone, Default)]
pub struct Timeline(Rc<Cell<u64>>);

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_us(&self) -> u64 {
        self.0.get()
    }

    pub fn advance_us(&self, us: u64) {
        self.0.set(self.0.get() + us);
    }

    pub fn set_ms(&self, ms: u64) {
        self.0.set(ms * 1_000);
    }

    pub fn clock(&self) -> FakeClock {
        FakeClock(self.clone())
    }

    pub fn delay(&self) -> FakeDelay {
        FakeDelay {
            time: self.clone(),
            total_ms_calls: Rc::new(Cell::new(0)),
        }
    }
}

#[derive(Clone)]
pub struct FakeClock(Timeline);

impl Clock for FakeClock {
    fn now_us(&self) -> u32 {
        self.0.now_us() as u32
    }

    fn now_ms(&self) -> u32 {
        (self.0.now_us() / 1_000) as u32
    }
}

/// Delay that advances the shared timeline and counts `delay_ms` calls
#[derive(Clone)]
pub struct FakeDelay {
    time: Timeline,
    pub total_ms_calls: Rc<Cell<u32>>,
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.time.advance_us(u64::from(ns / 1_000));
    }

    fn delay_us(&mut self, us: u32) {
        self.time.advance_us(u64::from(us));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_ms_calls.set(self.total_ms_calls.get() + 1);
        self.time.advance_us(u64::from(ms) * 1_000);
    }
}

// ============================================================================
// Pins
// ============================================================================

/// Echo line for the ranger: high on `[rise_at, fall_at)` in absolute µs
pub struct EchoPin {
    time: Timeline,
    rise_at: Option<u64>,
    fall_at: u64,
}

impl EchoPin {
    pub fn new(time: &Timeline, rise_at: u64, fall_at: u64) -> Self {
        Self {
            time: time.clone(),
            rise_at: Some(rise_at),
            fall_at,
        }
    }

    pub fn silent(time: &Timeline) -> Self {
        Self {
            time: time.clone(),
            rise_at: None,
            fall_at: 0,
        }
    }

    fn sample(&mut self) -> bool {
        let t = self.time.now_us();
        self.time.advance_us(1);
        self.rise_at.is_some_and(|rise| t >= rise && t < self.fall_at)
    }
}

impl PinErrorType for EchoPin {
    type Error = Infallible;
}

impl InputPin for EchoPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.sample())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.sample())
    }
}

impl OutputPin for EchoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl IoPin for EchoPin {
    fn make_input(&mut self) {}

    fn make_output(&mut self) {}
}

/// DHT data line. Each switch to input replays the next scripted frame;
/// `None` (or an empty script) means the sensor stays silent.
pub struct DhtPin {
    time: Timeline,
    frames: VecDeque<Option<[u8; 5]>>,
    segments: Vec<(u64, bool)>,
    armed_at: u64,
    input: bool,
    pub transfers: Rc<Cell<u32>>,
}

impl DhtPin {
    pub fn new(time: &Timeline, frames: impl IntoIterator<Item = Option<[u8; 5]>>) -> Self {
        Self {
            time: time.clone(),
            frames: frames.into_iter().collect(),
            segments: Vec::new(),
            armed_at: 0,
            input: false,
            transfers: Rc::new(Cell::new(0)),
        }
    }

    fn waveform(frame: [u8; 5]) -> Vec<(u64, bool)> {
        let mut segments = vec![(20, true), (80, false), (80, true)];
        for byte in frame {
            for bit in (0..8).rev() {
                let one = byte & (1 << bit) != 0;
                segments.push((50, false));
                segments.push((if one { 70 } else { 26 }, true));
            }
        }
        segments.push((50, false));
        segments
    }

    fn level(&self, t: u64) -> bool {
        let mut edge = self.armed_at;
        for &(len, level) in &self.segments {
            edge += len;
            if t < edge {
                return level;
            }
        }
        true
    }

    fn sample(&mut self) -> bool {
        let t = self.time.now_us();
        self.time.advance_us(1);
        if self.input {
            self.level(t)
        } else {
            true
        }
    }
}

impl PinErrorType for DhtPin {
    type Error = Infallible;
}

impl InputPin for DhtPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.sample())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.sample())
    }
}

impl OutputPin for DhtPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl IoPin for DhtPin {
    fn make_input(&mut self) {
        self.input = true;
        self.armed_at = self.time.now_us();
        self.transfers.set(self.transfers.get() + 1);
        self.segments = match self.frames.pop_front().flatten() {
            Some(frame) => Self::waveform(frame),
            None => Vec::new(),
        };
    }

    fn make_output(&mut self) {
        self.input = false;
    }
}

/// DHT22 frame for `celsius` and `humidity`, with a valid checksum
pub fn dht22_frame(celsius: f32, humidity: f32) -> [u8; 5] {
    let rh = (humidity * 10.0).round() as u16;
    let tenths = (celsius.abs() * 10.0).round() as u16;
    let [h0, h1] = rh.to_be_bytes();
    let [mut t0, t1] = tenths.to_be_bytes();
    if celsius < 0.0 {
        t0 |= 0x80;
    }
    let sum = h0.wrapping_add(h1).wrapping_add(t0).wrapping_add(t1);
    [h0, h1, t0, t1, sum]
}

/// Fixed logic level
pub struct LevelPin(pub bool);

impl PinErrorType for LevelPin {
    type Error = Infallible;
}

impl InputPin for LevelPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.0)
    }
}

/// Constant ADC count
pub struct FakeAnalog(pub u16);

impl AnalogSource for FakeAnalog {
    fn read_raw(&mut self) -> u16 {
        self.0
    }
}

// ============================================================================
// I2C
// ============================================================================

/// Scripted I2C bus.
///
/// Devices in `present` acknowledge; everything else NAKs. A read returns
/// the next response queued under the bytes most recently written to that
/// address. The last response in a queue repeats.
#[derive(Default)]
pub struct FakeI2c {
    present: Vec<u8>,
    pending: HashMap<u8, Vec<u8>>,
    responses: HashMap<(u8, Vec<u8>), VecDeque<Vec<u8>>>,
    pub writes: Vec<(u8, Vec<u8>)>,
    /// Transactions that read after a write without a stop in between
    pub repeated_starts: usize,
}

impl FakeI2c {
    pub fn with_devices(present: &[u8]) -> Self {
        Self {
            present: present.to_vec(),
            ..Self::default()
        }
    }

    /// Queue `bytes` as a response to a read after `key` was written
    pub fn respond(&mut self, address: u8, key: &[u8], bytes: Vec<u8>) {
        self.responses
            .entry((address, key.to_vec()))
            .or_default()
            .push_back(bytes);
    }

    /// Replace every queued response for `key`
    pub fn respond_always(&mut self, address: u8, key: &[u8], bytes: Vec<u8>) {
        let queue = self.responses.entry((address, key.to_vec())).or_default();
        queue.clear();
        queue.push_back(bytes);
    }

    pub fn writes_to(&self, address: u8) -> Vec<Vec<u8>> {
        self.writes
            .iter()
            .filter(|(a, _)| *a == address)
            .map(|(_, w)| w.clone())
            .collect()
    }

    fn read_into(&mut self, address: u8, buf: &mut [u8]) {
        buf.fill(0);
        let Some(key) = self.pending.get(&address) else {
            return;
        };
        let Some(queue) = self.responses.get_mut(&(address, key.clone())) else {
            return;
        };
        let response = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        if let Some(bytes) = response {
            let n = bytes.len().min(buf.len());
            buf[..n].copy_from_slice(&bytes[..n]);
        }
    }
}

impl ErrorType for FakeI2c {
    type Error = ErrorKind;
}

impl I2c for FakeI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if !self.present.contains(&address) {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        let has_write = operations.iter().any(|op| matches!(op, Operation::Write(_)));
        let has_read = operations.iter().any(|op| matches!(op, Operation::Read(_)));
        if has_write && has_read {
            self.repeated_starts += 1;
        }
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    self.writes.push((address, bytes.to_vec()));
                    self.pending.insert(address, bytes.to_vec());
                }
                Operation::Read(buf) => self.read_into(address, buf),
            }
        }
        Ok(())
    }
}

/// `word` followed by its checksum
pub fn word_frame(word: u16) -> Vec<u8> {
    let bytes = word.to_be_bytes();
    vec![bytes[0], bytes[1], crc8(&bytes)]
}

/// A float as two checksummed words
pub fn float_frames(value: f32) -> Vec<u8> {
    let bits = value.to_bits();
    let mut out = word_frame((bits >> 16) as u16);
    out.extend(word_frame(bits as u16));
    out
}

/// Full SCD30 measurement register
pub fn measurement(co2_ppm: f32, celsius: f32, humidity: f32) -> Vec<u8> {
    let mut out = float_frames(co2_ppm);
    out.extend(float_frames(celsius));
    out.extend(float_frames(humidity));
    out
}

// ============================================================================
// Display
// ============================================================================

/// Display sink that records every line it is asked to show
pub struct RecordingDisplay {
    pub max_lines: u8,
    pub lines: Vec<(u8, String)>,
}

impl RecordingDisplay {
    pub fn new(max_lines: u8) -> Self {
        Self {
            max_lines,
            lines: Vec::new(),
        }
    }

    pub fn line(&self, line: u8) -> Option<&str> {
        self.lines
            .iter()
            .rev()
            .find(|(n, _)| *n == line)
            .map(|(_, text)| text.as_str())
    }
}

impl DisplaySink for RecordingDisplay {
    fn max_lines(&self) -> u8 {
        self.max_lines
    }

    fn show_line(&mut self, line: u8, text: &str) -> Result<(), DisplayError> {
        check_line(line, self.max_lines)?;
        self.lines.push((line, text.to_owned()));
        Ok(())
    }
}
