pub mod utils;

pub use clap::Parser;
use std::ffi::OsString;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::decoder::{DecoderOptions, EndOfFile, HexDecoder};
use crate::error::HexResult;
use crate::image::MemoryImage;
use crate::notify::{Collect, UnknownRecord};

pub enum Mode {
    /// Only decode and validate the inputs.
    Check,
    /// Write every decoded image into `directory`.
    Convert {
        directory: PathBuf
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Settings {
    pub decoder: DecoderOptions,
    pub size: Option<usize>,
    pub verbose: u64
}

/// Decodes Intel HEX firmware images into raw binaries for the AT28C256 EEPROM programmer.
#[derive(Parser)]
#[clap(name = "r86-ihex")]
pub struct Options {
    /// Intel HEX files to decode.
    #[clap(required = true, parse(from_os_str))]
    inputs: Vec<PathBuf>,
    /// Directory where the decoded images are written, each one as `<name>.bin`.
    ///
    /// Without it, the images are only decoded and validated.
    #[clap(short, long, parse(from_os_str))]
    output: Option<PathBuf>,
    /// Stops decoding a file at its first end of file record.
    ///
    /// By default records following the end of file are still decoded and applied.
    #[clap(long)]
    strict_eof: bool,
    /// Pads every image with zeros to exactly this many bytes.
    ///
    /// Images spanning more than this many bytes are rejected. Use 32768 for the AT28C256.
    #[clap(long)]
    size: Option<usize>,
    /// Reports unknown records; repeat for per-file details.
    #[clap(short, long, parse(from_occurrences))]
    verbose: u64,
}

impl Options {
    pub fn from_command_line() -> Self {
        Self::parse()
    }

    pub fn into_parts(self) -> (Vec<PathBuf>, Mode, Settings) {
        let mode = match self.output {
            Some(directory) => Mode::Convert { directory },
            None => Mode::Check
        };
        let settings = Settings {
            decoder: DecoderOptions {
                end_of_file: if self.strict_eof { EndOfFile::Stop } else { EndOfFile::Continue }
            },
            size: self.size,
            verbose: self.verbose
        };

        (self.inputs, mode, settings)
    }
}

/// An image decoded from a file, together with the records the decoder skipped.
pub struct Loaded {
    pub image: MemoryImage,
    pub unknown: Vec<UnknownRecord>
}

/// Opens and decodes a single file; the file is closed before returning.
pub fn load_file<P>(path: P, options: DecoderOptions) -> HexResult<Loaded>
    where
        P: AsRef<Path>
{
    let file = File::open(path.as_ref())?;
    let mut decoder = HexDecoder::with_notify(Collect::new()).options(options);
    let image = decoder.decode_reader(BufReader::new(file))?;

    Ok(Loaded { image, unknown: decoder.into_notify().into_records() })
}

/// Destination of the binary decoded from `input`: `<directory>/<input stem>.bin`.
pub fn output_path<P, Q>(directory: P, input: Q) -> PathBuf
    where
        P: AsRef<Path>,
        Q: AsRef<Path>
{
    let input = input.as_ref();
    let mut name = input.file_stem()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("image"));
    name.push(".bin");
    directory.as_ref().join(name)
}
