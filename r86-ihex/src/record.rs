//! Parsing of single Intel HEX records.
//!
//! A record is one physical line of the form
//!
//! ```text
//! :LLAAAATT[DD...]CC
//! ```
//!
//! where `LL` is the number of data bytes, `AAAA` the big-endian 16-bit load address, `TT` the
//! record type, `DD` the payload and `CC` a checksum chosen so that all decoded bytes of the
//! record sum to zero modulo 256.

use crate::error::{HexError, HexResult};

pub const RECORD_MARKER: u8 = b':';

/// Marker, byte count, address, type and checksum.
const RECORD_OVERHEAD: usize = 11;
const HEADER_LENGTH: usize = 9;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RecordType {
    Data,
    EndOfFile,
    ExtendedSegmentAddress,
    Other(u8)
}
impl RecordType {
    pub fn code(&self) -> u8 {
        match *self {
            RecordType::Data => 0x00,
            RecordType::EndOfFile => 0x01,
            RecordType::ExtendedSegmentAddress => 0x02,
            RecordType::Other(code) => code
        }
    }

    /// Human readable name, also for the record types the decoder does not interpret.
    pub fn as_str(&self) -> &'static str {
        match *self {
            RecordType::Data => "data",
            RecordType::EndOfFile => "end of file",
            RecordType::ExtendedSegmentAddress => "extended segment address",
            RecordType::Other(0x03) => "start segment address",
            RecordType::Other(0x04) => "extended linear address",
            RecordType::Other(0x05) => "start linear address",
            RecordType::Other(_) => "unknown"
        }
    }
}
impl From<u8> for RecordType {
    fn from(code: u8) -> Self {
        match code {
            0x00 => RecordType::Data,
            0x01 => RecordType::EndOfFile,
            0x02 => RecordType::ExtendedSegmentAddress,
            _ => RecordType::Other(code)
        }
    }
}

/// A validated record, borrowed from the line it was parsed from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record<'a> {
    line: &'a str,
    byte_count: u8,
    address: u16,
    record_type: RecordType,
    payload: Vec<u8>,
    checksum: u8
}
impl<'a> Record<'a> {
    /// Parses and validates a single trimmed, non-empty line.
    ///
    /// `number` is the 1-based line number, only used to report errors.
    pub fn parse(line: &'a str, number: usize) -> HexResult<Record<'a>> {
        let raw = line.as_bytes();

        if raw.first() != Some(&RECORD_MARKER) {
            return Err(HexError::malformed("line does not start with record marker", number, line));
        }
        if raw.len() < HEADER_LENGTH {
            return Err(HexError::malformed("line is too short to hold a record header", number, line));
        }

        let field = |at: usize| decode_byte(raw, at)
            .ok_or_else(|| HexError::malformed("invalid hexadecimal digit in record", number, line));

        let byte_count = field(1)?;
        let address = ((field(3)? as u16) << 8) | field(5)? as u16;
        let record_type = RecordType::from(field(7)?);

        if raw.len() != byte_count as usize * 2 + RECORD_OVERHEAD {
            return Err(HexError::length_mismatch(number, line));
        }

        let mut payload = Vec::with_capacity(byte_count as usize);
        for i in 0..byte_count as usize {
            payload.push(field(HEADER_LENGTH + i * 2)?);
        }
        let checksum = field(raw.len() - 2)?;

        let sum = [byte_count, (address >> 8) as u8, (address & 0xFF) as u8, record_type.code(), checksum]
            .iter()
            .chain(payload.iter())
            .fold(0u8, |sum, byte| sum.wrapping_add(*byte));
        if sum != 0 {
            return Err(HexError::checksum_mismatch(number, line));
        }

        Ok(Record { line, byte_count, address, record_type, payload, checksum })
    }

    pub fn line(&self) -> &'a str {
        self.line
    }

    pub fn byte_count(&self) -> u8 {
        self.byte_count
    }

    pub fn address(&self) -> u16 {
        self.address
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload[..]
    }

    pub fn checksum(&self) -> u8 {
        self.checksum
    }

    /// First two payload bytes as a big-endian word.
    pub fn payload_word(&self) -> Option<u16> {
        match self.payload[..] {
            [high, low, ..] => Some(((high as u16) << 8) | low as u16),
            _ => None
        }
    }
}

fn decode_digit(digit: u8) -> Option<u8> {
    match digit {
        b'0' ..= b'9' => Some(digit - b'0'),
        b'a' ..= b'f' => Some(10 + (digit - b'a')),
        b'A' ..= b'F' => Some(10 + (digit - b'A')),
        _ => None
    }
}

fn decode_byte(raw: &[u8], at: usize) -> Option<u8> {
    let high = decode_digit(*raw.get(at)?)?;
    let low = decode_digit(*raw.get(at + 1)?)?;
    Some((high << 4) | low)
}
