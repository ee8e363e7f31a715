use std::fmt::{Display, Formatter, Debug};
use std::error::Error;

pub type HexResult<T> = std::result::Result<T, HexError>;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum HexErrorKind {
    MalformedLine,
    LengthMismatch,
    ChecksumMismatch,
    Io
}
impl HexErrorKind {
    pub(self) fn as_str(&self) -> &'static str {
        match *self {
            HexErrorKind::MalformedLine => "malformed line",
            HexErrorKind::LengthMismatch => "length mismatch",
            HexErrorKind::ChecksumMismatch => "checksum mismatch",
            HexErrorKind::Io => "i/o error"
        }
    }
}

#[derive(Debug)]
struct CustomError {
    kind: HexErrorKind,
    error: Box<dyn Error + Send + Sync>,
}

/// The line a format error was raised on.
#[derive(Debug)]
struct OffendingLine {
    kind: HexErrorKind,
    description: &'static str,
    number: usize,
    text: String
}

enum ErrorSource {
    Internal(Box<OffendingLine>),
    External(Box<CustomError>)
}
impl Debug for ErrorSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            ErrorSource::External(ref c) => Debug::fmt(c, f),
            ErrorSource::Internal(ref l) => f.debug_struct("Kind")
                .field("kind", &l.kind)
                .field("line", &l.number)
                .field("text", &l.text)
                .finish()
        }
    }
}

/// Error raised while decoding an Intel HEX image.
///
/// Format errors always carry the raw text of the offending line and its 1-based number, so that
/// the caller can point the user at the broken record.
pub struct HexError {
    source: ErrorSource
}
impl HexError {
    pub fn new<E>(kind: HexErrorKind, error: E) -> Self
        where
            E: Into<Box<dyn Error + Send + Sync>>
    {
        HexError {
            source: ErrorSource::External(Box::new(CustomError {
                kind,
                error: error.into()
            }))
        }
    }

    pub(crate) fn format<S>(kind: HexErrorKind, description: &'static str, number: usize, text: S) -> Self
        where
            S: Into<String>
    {
        HexError {
            source: ErrorSource::Internal(Box::new(OffendingLine {
                kind,
                description,
                number,
                text: text.into()
            }))
        }
    }

    pub(crate) fn malformed<S: Into<String>>(description: &'static str, number: usize, text: S) -> Self {
        HexError::format(HexErrorKind::MalformedLine, description, number, text)
    }

    pub(crate) fn length_mismatch<S: Into<String>>(number: usize, text: S) -> Self {
        HexError::format(HexErrorKind::LengthMismatch, "record length does not match its byte count", number, text)
    }

    pub(crate) fn checksum_mismatch<S: Into<String>>(number: usize, text: S) -> Self {
        HexError::format(HexErrorKind::ChecksumMismatch, "record checksum does not sum to zero", number, text)
    }

    pub fn get_ref(&self) -> Option<&(dyn Error + Send + Sync)> {
        match self.source {
            ErrorSource::External(ref c) => Some(&*c.error),
            ErrorSource::Internal(_) => None
        }
    }

    pub fn get_mut(&mut self) -> Option<&mut (dyn Error + Send + Sync)> {
        match self.source {
            ErrorSource::External(ref mut c) => Some(&mut *c.error),
            ErrorSource::Internal(_) => None
        }
    }

    pub fn into_inner(self) -> Option<Box<dyn Error + Send + Sync>> {
        match self.source {
            ErrorSource::External(c) => Some(c.error),
            ErrorSource::Internal(_) => None
        }
    }

    pub fn kind(&self) -> HexErrorKind {
        match self.source {
            ErrorSource::External(ref c) => c.kind,
            ErrorSource::Internal(ref l) => l.kind
        }
    }

    /// Raw text of the offending line, if the error was raised by a record.
    pub fn line(&self) -> Option<&str> {
        match self.source {
            ErrorSource::Internal(ref l) => Some(&l.text[..]),
            ErrorSource::External(_) => None
        }
    }

    pub fn line_number(&self) -> Option<usize> {
        match self.source {
            ErrorSource::Internal(ref l) => Some(l.number),
            ErrorSource::External(_) => None
        }
    }
}
impl From<std::io::Error> for HexError {
    fn from(error: std::io::Error) -> Self {
        HexError::new(HexErrorKind::Io, error)
    }
}
impl Debug for HexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.source, f)
    }
}
impl Display for HexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.source {
            ErrorSource::External(ref c) => write!(f, "{}: {}", c.kind.as_str(), c.error),
            ErrorSource::Internal(ref l) => write!(f, "{} at line {}: {} (`{}`)", l.kind.as_str(), l.number, l.description, l.text)
        }
    }
}
impl Error for HexError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self.source {
            ErrorSource::Internal(_) => None,
            ErrorSource::External(ref c) => c.error.source()
        }
    }
}
