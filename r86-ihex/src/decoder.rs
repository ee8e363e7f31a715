//! Assembly of Intel HEX records into a flat memory image.
//!
//! Records are applied strictly in input order: data records are placed at their load address
//! plus the offset established by the last extended segment address record, so every line
//! depends on the state left behind by the lines before it.
//!
//! Each call to one of the `decode` functions starts from an empty image and a zero offset, hence
//! independent images can be decoded concurrently, one decoder per thread.

use std::io::BufRead;

use crate::error::{HexError, HexResult};
use crate::image::MemoryImage;
use crate::notify::{Notify, Silent, UnknownRecord};
use crate::record::{Record, RecordType};

/// What to do with the lines following an end of file record.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EndOfFile {
    /// Keep decoding; data records after the end of file are still applied.
    Continue,
    /// Stop at the first end of file record and ignore whatever follows.
    Stop
}
impl Default for EndOfFile {
    fn default() -> Self {
        EndOfFile::Continue
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct DecoderOptions {
    pub end_of_file: EndOfFile
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Flow {
    Continue,
    Stop
}

/// State of a single decode pass.
struct Session {
    options: DecoderOptions,
    image: MemoryImage,
    offset: u32,
    line_number: usize
}
impl Session {
    fn new(options: DecoderOptions) -> Session {
        Session {
            options,
            image: MemoryImage::new(),
            offset: 0,
            line_number: 0
        }
    }

    fn feed<N: Notify>(&mut self, line: &str, notify: &mut N) -> HexResult<Flow> {
        self.line_number += 1;

        let line = line.trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }

        let record = Record::parse(line, self.line_number)?;
        match record.record_type() {
            RecordType::Data => {
                let address = record.address() as usize + self.offset as usize;
                self.image.write(address, record.payload());
            },
            RecordType::EndOfFile => {
                if self.options.end_of_file == EndOfFile::Stop {
                    return Ok(Flow::Stop);
                }
            },
            RecordType::ExtendedSegmentAddress => {
                let segment = record.payload_word()
                    .ok_or_else(|| HexError::malformed("extended segment address record needs a two byte payload", self.line_number, line))?;
                self.offset = segment as u32 * 16;
            },
            RecordType::Other(_) => notify.unknown_record(&UnknownRecord {
                record_type: record.record_type(),
                byte_count: record.byte_count(),
                address: record.address() as u32 + self.offset,
                checksum: record.checksum(),
                line: line.to_owned(),
                line_number: self.line_number
            })
        }

        Ok(Flow::Continue)
    }

    fn finish(self) -> MemoryImage {
        self.image
    }
}

/// Decodes Intel HEX text into a [`MemoryImage`].
///
/// The decoder itself only holds the options and the notification sink, so it can be reused for
/// any number of images.
pub struct HexDecoder<N = Silent> {
    options: DecoderOptions,
    notify: N
}
impl HexDecoder<Silent> {
    pub fn new() -> Self {
        HexDecoder { options: Default::default(), notify: Silent }
    }
}
impl Default for HexDecoder<Silent> {
    fn default() -> Self {
        HexDecoder::new()
    }
}
impl<N: Notify> HexDecoder<N> {
    pub fn with_notify(notify: N) -> Self {
        HexDecoder { options: Default::default(), notify }
    }

    pub fn options(mut self, options: DecoderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn notify(&self) -> &N {
        &self.notify
    }

    pub fn notify_mut(&mut self) -> &mut N {
        &mut self.notify
    }

    pub fn into_notify(self) -> N {
        self.notify
    }

    /// Decodes a sequence of lines.
    ///
    /// Blank lines are skipped; the first malformed line, length mismatch or checksum mismatch
    /// aborts the whole decode.
    pub fn decode<I, S>(&mut self, lines: I) -> HexResult<MemoryImage>
        where
            I: IntoIterator<Item = S>,
            S: AsRef<str>
    {
        let mut session = Session::new(self.options);
        for line in lines {
            if session.feed(line.as_ref(), &mut self.notify)? == Flow::Stop {
                break;
            }
        }
        Ok(session.finish())
    }

    pub fn decode_str(&mut self, text: &str) -> HexResult<MemoryImage> {
        self.decode(text.lines())
    }

    /// Decodes lines as they are read from `reader`.
    ///
    /// Read failures, including invalid UTF-8, abort the decode with [`HexErrorKind::Io`].
    ///
    /// [`HexErrorKind::Io`]: crate::error::HexErrorKind::Io
    pub fn decode_reader<R: BufRead>(&mut self, reader: R) -> HexResult<MemoryImage> {
        let mut session = Session::new(self.options);
        for line in reader.lines() {
            if session.feed(&line?, &mut self.notify)? == Flow::Stop {
                break;
            }
        }
        Ok(session.finish())
    }
}

/// Decodes `lines` with the default options, discarding diagnostics.
pub fn decode<I, S>(lines: I) -> HexResult<MemoryImage>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>
{
    HexDecoder::new().decode(lines)
}

#[cfg(test)]
mod test {
    use rand::Rng;

    use super::*;
    use crate::error::HexErrorKind;
    use crate::notify::Collect;

    const DATA: &str = ":0400000001020304F2";

    #[test]
    fn empty_data_record() {
        let image = decode(&[":0000000000"]).unwrap();
        assert!(image.is_empty());
        assert_eq!(image.len(), 0);
    }

    #[test]
    fn no_lines() {
        let lines: Vec<String> = Vec::new();
        assert!(decode(lines).unwrap().is_empty());
    }

    #[test]
    fn end_to_end() {
        let image = decode(&[
            ":10000000214601360121470136007EFE09D2190141",
            ":00000001FF"
        ]).unwrap();
        assert_eq!(image.as_slice(), &[
            0x21, 0x46, 0x01, 0x36, 0x01, 0x21, 0x47, 0x01,
            0x36, 0x00, 0x7E, 0xFE, 0x09, 0xD2, 0x19, 0x01
        ]);
    }

    #[test]
    fn end_to_end_with_load_address() {
        let image = decode_text(":10010000214601360121470136007EFE09D2190140\n:00000001FF\n");
        assert_eq!(image.len(), 0x110);
        assert!(image.as_slice()[..0x100].iter().all(|b| *b == 0));
        assert_eq!(image.as_slice()[0x100], 0x21);
        assert_eq!(image.as_slice()[0x10F], 0x01);
    }

    #[test]
    fn stale_checksum_is_rejected() {
        // Load address moved from 0100 without updating the checksum.
        let error = decode(&[":10000000214601360121470136007EFE09D2190140"]).unwrap_err();
        assert_eq!(error.kind(), HexErrorKind::ChecksumMismatch);
    }

    #[test]
    fn checksum_law() {
        let mut rng = rand::thread_rng();
        let digits = b"0123456789ABCDEF";

        for _ in 0..64 {
            let mut line = DATA.as_bytes().to_vec();
            let at = rng.gen_range(9..17);
            let mut digit = digits[rng.gen_range(0..16)];
            while digit == line[at] {
                digit = digits[rng.gen_range(0..16)];
            }
            line[at] = digit;

            let line = String::from_utf8(line).unwrap();
            let error = decode(&[&line]).unwrap_err();
            assert_eq!(error.kind(), HexErrorKind::ChecksumMismatch, "{}", line);
            assert_eq!(error.line(), Some(&line[..]));
        }
    }

    #[test]
    fn length_law() {
        for line in &[":04000000010203F2", ":040000000102030405F2", ":0400000001020304F", ":0400000001020304F2F"] {
            let error = decode(&[line]).unwrap_err();
            assert_eq!(error.kind(), HexErrorKind::LengthMismatch);
            assert_eq!(error.line(), Some(*line));
        }
    }

    #[test]
    fn extended_segment_address() {
        let image = decode(&[":020000021000EC", ":01000000AB54"]).unwrap();
        assert_eq!(image.len(), 0x10001);
        assert_eq!(image.as_slice()[0x10000], 0xAB);
        assert!(image.as_slice()[..0x10000].iter().all(|b| *b == 0));
    }

    #[test]
    fn extended_segment_address_replaces_offset() {
        let image = decode(&[
            ":020000021000EC",
            ":0400000201020304F0",
            ":01000000AB54"
        ]).unwrap();
        assert_eq!(image.len(), 0x1021);
        assert_eq!(image.as_slice()[0x1020], 0xAB);
    }

    #[test]
    fn extended_segment_address_without_payload() {
        let error = decode(&[":00000002FE"]).unwrap_err();
        assert_eq!(error.kind(), HexErrorKind::MalformedLine);
        assert_eq!(error.line(), Some(":00000002FE"));
    }

    #[test]
    fn overlapping_records() {
        let image = decode(&[DATA, ":02000100AAABA8"]).unwrap();
        assert_eq!(image.as_slice(), &[0x01, 0xAA, 0xAB, 0x04]);
    }

    #[test]
    fn unknown_record_types() {
        let mut decoder = HexDecoder::with_notify(Collect::new());
        let image = decoder.decode(&[
            ":020000021000EC",
            ":0400000300003800C1",
            ":0200000400FFFB",
            ":01000000AB54"
        ]).unwrap();

        assert_eq!(image.len(), 0x10001);
        assert_eq!(image.as_slice()[0x10000], 0xAB);

        let records = decoder.into_notify().into_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], UnknownRecord {
            record_type: RecordType::Other(0x03),
            byte_count: 4,
            address: 0x10000,
            checksum: 0xC1,
            line: String::from(":0400000300003800C1"),
            line_number: 2
        });
        assert_eq!(records[1].record_type, RecordType::Other(0x04));
        assert_eq!(records[1].line_number, 3);
    }

    #[test]
    fn unknown_record_closure() {
        let mut seen = Vec::new();
        let image = HexDecoder::with_notify(|record: &UnknownRecord| seen.push(record.record_type))
            .decode(&[":0400000300003800C1", DATA])
            .unwrap();
        assert_eq!(image.as_slice(), &[1, 2, 3, 4]);
        assert_eq!(seen, vec![RecordType::Other(0x03)]);
    }

    #[test]
    fn blank_lines() {
        let image = decode(&["", "   ", DATA, "\t", "  :00000001FF  ", "\r"]).unwrap();
        assert_eq!(image.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn line_numbers_count_blank_lines() {
        let error = decode(&["", DATA, "   ", ":00000001FE"]).unwrap_err();
        assert_eq!(error.kind(), HexErrorKind::ChecksumMismatch);
        assert_eq!(error.line_number(), Some(4));
    }

    #[test]
    fn missing_marker() {
        let error = decode(&[DATA, "0400000001020304F2"]).unwrap_err();
        assert_eq!(error.kind(), HexErrorKind::MalformedLine);
        assert_eq!(error.line_number(), Some(2));
    }

    #[test]
    fn data_after_end_of_file() {
        let image = decode(&[":00000001FF", DATA]).unwrap();
        assert_eq!(image.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn stop_at_end_of_file() {
        let options = DecoderOptions { end_of_file: EndOfFile::Stop };
        let lines = [":010002000FEE", ":00000001FF", DATA, "not a record"];

        let image = HexDecoder::new().options(options).decode(&lines).unwrap();
        assert_eq!(image.as_slice(), &[0, 0, 0x0F]);

        let error = HexDecoder::new().decode(&lines).unwrap_err();
        assert_eq!(error.kind(), HexErrorKind::MalformedLine);
        assert_eq!(error.line(), Some("not a record"));
    }

    #[test]
    fn decoder_is_reusable() {
        let mut decoder = HexDecoder::new();
        let first = decoder.decode(&[":020000021000EC", ":01000000AB54"]).unwrap();
        let second = decoder.decode(&[":01000000AB54"]).unwrap();
        assert_eq!(first.len(), 0x10001);
        assert_eq!(second.as_slice(), &[0xAB]);
    }

    #[test]
    fn decode_reader() {
        let text = ":0100050000FA\r\n:0400000001020304F2\r\n:00000001FF\r\n";
        let image = HexDecoder::new().decode_reader(text.as_bytes()).unwrap();
        assert_eq!(image.as_slice(), &[1, 2, 3, 4, 0, 0]);
    }

    #[test]
    fn decode_reader_invalid_utf8() {
        let text: &[u8] = b":00000001FF\n\xFF\xFE\n";
        let error = HexDecoder::new().decode_reader(text).unwrap_err();
        assert_eq!(error.kind(), HexErrorKind::Io);
        assert!(error.line().is_none());
    }

    #[test]
    fn concurrent_decodes() {
        let handles: Vec<_> = (0..4u8)
            .map(|i| std::thread::spawn(move || {
                let line = format!(":01000000{:02X}{:02X}", i, 0u8.wrapping_sub(1 + i));
                decode(&[line]).unwrap()
            }))
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap().as_slice(), &[i as u8]);
        }
    }

    fn decode_text(text: &str) -> MemoryImage {
        HexDecoder::new().decode_str(text).unwrap()
    }
}
