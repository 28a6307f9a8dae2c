//! Checksummed Frame Tests
//!
//! CRC-8 vectors, single-bit corruption, float reassembly and command
//! encoding for the SCD30 register protocol.

use grove_firmware::acquisition::frame::{
    assemble_f32, crc8, encode_command, encode_command_with_arg, read_f32, validate_frame,
    validate_response, Frame,
};
use proptest::prelude::*;

// ============================================================================
// CRC-8
// ============================================================================

#[test]
fn test_crc8_datasheet_vector() {
    assert_eq!(crc8(&[0xBE, 0xEF]), 0x92);
}

#[test]
fn test_crc8_zero_word() {
    assert_eq!(crc8(&[0x00, 0x00]), 0x81);
}

#[test]
fn test_crc8_empty_is_init() {
    assert_eq!(crc8(&[]), 0xFF);
}

#[test]
fn test_validate_frame_accepts_own_checksum() {
    assert!(validate_frame([0xBE, 0xEF], 0x92));
    assert!(!validate_frame([0xBE, 0xEF], 0x93));
}

#[test]
fn test_every_single_bit_flip_is_detected() {
    for word in 0..=u16::MAX {
        let payload = word.to_be_bytes();
        let crc = crc8(&payload);
        for bit in 0..16 {
            let flipped = (word ^ (1 << bit)).to_be_bytes();
            assert!(
                !validate_frame(flipped, crc),
                "flip of bit {bit} in {word:#06x} went undetected"
            );
        }
    }
}

proptest! {
    #[test]
    fn prop_crc_is_deterministic(data in proptest::collection::vec(any::<u8>(), 0..32)) {
        prop_assert_eq!(crc8(&data), crc8(&data));
    }

    #[test]
    fn prop_checksum_flip_is_detected(word in any::<u16>(), bit in 0u8..8) {
        let frame = Frame::from_word(word);
        prop_assert!(!validate_frame(frame.payload(), frame.crc() ^ (1 << bit)));
    }
}

// ============================================================================
// Frames and Responses
// ============================================================================

#[test]
fn test_frame_parse_valid() {
    let frame = Frame::parse(&[0xBE, 0xEF, 0x92]).unwrap();
    assert_eq!(frame.word(), 0xBEEF);
    assert_eq!(frame.to_bytes(), [0xBE, 0xEF, 0x92]);
}

#[test]
fn test_frame_parse_discards_bad_checksum() {
    assert!(Frame::parse(&[0xBE, 0xEF, 0x00]).is_none());
}

#[test]
fn test_response_one_bad_group_fails_all() {
    let mut data = Vec::new();
    data.extend_from_slice(&Frame::from_word(0x4396).to_bytes());
    data.extend_from_slice(&Frame::from_word(0x0000).to_bytes());
    assert!(validate_response(&data));

    data[5] ^= 0x01;
    assert!(!validate_response(&data));
}

// ============================================================================
// Float Reassembly
// ============================================================================

#[test]
fn test_assemble_300_ppm() {
    assert_eq!(assemble_f32([0x43, 0x96], [0x00, 0x00]), 300.0);
}

#[test]
fn test_read_f32_skips_interleaved_checksum() {
    let mut slot = Vec::new();
    slot.extend_from_slice(&Frame::from_word(0x4396).to_bytes());
    slot.extend_from_slice(&Frame::from_word(0x0000).to_bytes());
    assert_eq!(read_f32(&slot, 0), 300.0);
}

#[test]
fn test_read_f32_at_offset() {
    let mut data = vec![0u8; 6];
    for word in [0x41C8u16, 0x0000] {
        data.extend_from_slice(&Frame::from_word(word).to_bytes());
    }
    assert_eq!(read_f32(&data, 6), 25.0);
}

// ============================================================================
// Command Encoding
// ============================================================================

#[test]
fn test_encode_bare_command() {
    assert_eq!(encode_command(0x0300), [0x03, 0x00]);
}

#[test]
fn test_encode_start_with_zero_pressure() {
    let bytes = encode_command_with_arg(0x0010, 0);
    assert_eq!(bytes.as_slice(), &[0x00, 0x10, 0x00, 0x00, 0x81]);
}

#[test]
fn test_encode_interval_argument() {
    let bytes = encode_command_with_arg(0x4600, 2);
    assert_eq!(&bytes[..4], &[0x46, 0x00, 0x00, 0x02]);
    assert_eq!(bytes[4], crc8(&[0x00, 0x02]));
}
