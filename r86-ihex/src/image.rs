use std::ops::Range;

/// Flat memory image assembled from data records, indexed by absolute address.
///
/// The image is always exactly as long as the highest address written so far plus one. Every
/// byte below that which no record wrote is zero.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct MemoryImage {
    contents: Vec<u8>
}
impl MemoryImage {
    pub fn new() -> MemoryImage {
        MemoryImage { contents: Vec::new() }
    }

    /// Writes `bytes` starting at `address`, zero-filling any gap between the current end of the
    /// image and `address`.
    ///
    /// Bytes already present in the written range are overwritten.
    pub fn write(&mut self, address: usize, bytes: &[u8]) {
        let range = address..address + bytes.len();
        self.ensure_len(range.end);
        self.contents[range].copy_from_slice(bytes);
    }

    /// Grows the image with zero bytes until it is at least `len` bytes long.
    pub fn ensure_len(&mut self, len: usize) {
        if self.contents.len() < len {
            self.contents.resize(len, 0);
        }
    }

    /// Pads the image with zeros to exactly `size` bytes.
    ///
    /// Returns the populated range if the image does not fit in `size` bytes.
    pub fn pad_to(&mut self, size: usize) -> Result<(), Range<usize>> {
        if self.contents.len() > size {
            Err(0..self.contents.len())
        } else {
            self.ensure_len(size);
            Ok(())
        }
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.contents[..]
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.contents
    }
}
impl AsRef<[u8]> for MemoryImage {
    fn as_ref(&self) -> &[u8] {
        &self.contents[..]
    }
}
impl From<MemoryImage> for Vec<u8> {
    fn from(image: MemoryImage) -> Self {
        image.contents
    }
}
