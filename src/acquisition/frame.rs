//! Checksummed Frames
//!
//! The SCD30 speaks in 16-bit big-endian words, each followed on the wire by
//! a CRC-8 of its two bytes:
//!
//! ```text
//! ┌──────┬──────┬──────┐
//! │  hi  │  lo  │ crc  │   one word
//! └──────┴──────┴──────┘
//! ```
//!
//! Floats span two words. The CRC protects each half on its own, never the
//! assembled float, so a decoder that picks the wrong byte offsets still
//! produces a well-formed (but wrong) value that no checksum will catch.
//! The offsets in [`read_f32`] are load-bearing.

use heapless::Vec;

/// CRC-8 initial value
const CRC8_INIT: u8 = 0xFF;

/// CRC-8 polynomial `x^8 + x^5 + x^4 + 1`
const CRC8_POLY: u8 = 0x31;

/// Bytes per word on the wire (two data bytes plus checksum)
pub const WORD_LEN: usize = 3;

/// Bytes per float on the wire (two words)
pub const FLOAT_LEN: usize = 2 * WORD_LEN;

/// Largest command with argument: opcode + one checksummed word
pub const MAX_COMMAND_LEN: usize = 2 + WORD_LEN;

/// CRC-8 as used by the SCD30: init `0xFF`, poly `0x31`, MSB first, no
/// reflection, no final XOR.
#[must_use]
pub const fn crc8(data: &[u8]) -> u8 {
    let mut crc = CRC8_INIT;
    let mut i = 0;
    while i < data.len() {
        crc ^= data[i];
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ CRC8_POLY
            } else {
                crc << 1
            };
            bit += 1;
        }
        i += 1;
    }
    crc
}

/// True iff `crc` is the checksum of `payload`
#[must_use]
pub const fn validate_frame(payload: [u8; 2], crc: u8) -> bool {
    crc8(&payload) == crc
}

/// One 16-bit word with its checksum.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct Frame {
    payload: [u8; 2],
    crc: u8,
}

impl Frame {
    /// Build the frame for `word`, computing its checksum
    #[must_use]
    pub const fn from_word(word: u16) -> Self {
        let payload = word.to_be_bytes();
        Self {
            payload,
            crc: crc8(&payload),
        }
    }

    /// Parse three wire bytes, discarding the frame if its checksum fails
    #[must_use]
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let &[hi, lo, crc] = bytes else {
            return None;
        };
        validate_frame([hi, lo], crc).then_some(Self {
            payload: [hi, lo],
            crc,
        })
    }

    /// Payload as a big-endian word
    #[must_use]
    pub const fn word(&self) -> u16 {
        u16::from_be_bytes(self.payload)
    }

    /// Payload bytes
    #[must_use]
    pub const fn payload(&self) -> [u8; 2] {
        self.payload
    }

    /// Checksum byte
    #[must_use]
    pub const fn crc(&self) -> u8 {
        self.crc
    }

    /// Wire representation
    #[must_use]
    pub const fn to_bytes(&self) -> [u8; WORD_LEN] {
        [self.payload[0], self.payload[1], self.crc]
    }
}

/// Check every consecutive 3-byte group of a response.
///
/// One bad group fails the whole response. A length that is not a whole
/// number of words is rejected too.
#[must_use]
pub fn validate_response(data: &[u8]) -> bool {
    if data.is_empty() || data.len() % WORD_LEN != 0 {
        return false;
    }
    data.chunks_exact(WORD_LEN).all(|group| {
        let ok = validate_frame([group[0], group[1]], group[2]);
        if !ok {
            warn!(
                "checksum mismatch: {:02X} {:02X} crc {:02X}",
                group[0], group[1], group[2]
            );
        }
        ok
    })
}

/// Join two 16-bit halves into a big-endian IEEE-754 single.
#[must_use]
pub fn assemble_f32(high: [u8; 2], low: [u8; 2]) -> f32 {
    f32::from_be_bytes([high[0], high[1], low[0], low[1]])
}

/// Decode the float whose slot starts at byte `k` of a validated response.
///
/// The high half is `[k, k + 2)`, the low half `[k + 3, k + 5)`; the
/// checksum at `k + 2` is skipped.
///
/// # Panics
///
/// Panics if `data` is shorter than `k + 5` bytes.
#[must_use]
pub fn read_f32(data: &[u8], k: usize) -> f32 {
    assemble_f32([data[k], data[k + 1]], [data[k + 3], data[k + 4]])
}

/// Encode a bare 16-bit opcode
#[must_use]
pub const fn encode_command(opcode: u16) -> [u8; 2] {
    opcode.to_be_bytes()
}

/// Encode an opcode followed by one checksummed argument word
#[must_use]
pub fn encode_command_with_arg(opcode: u16, arg: u16) -> Vec<u8, MAX_COMMAND_LEN> {
    let mut out = Vec::new();
    // Capacity is exactly opcode + one word
    let _ = out.extend_from_slice(&opcode.to_be_bytes());
    let _ = out.extend_from_slice(&Frame::from_word(arg).to_bytes());
    out
}
