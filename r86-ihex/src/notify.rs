use crate::record::RecordType;

/// A structurally valid record of a type the decoder does not interpret.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct UnknownRecord {
    pub record_type: RecordType,
    pub byte_count: u8,
    /// Load address of the record with the current segment offset applied.
    pub address: u32,
    pub checksum: u8,
    pub line: String,
    pub line_number: usize
}

/// Receives the diagnostics emitted while decoding.
///
/// Unknown records never abort a decode; what happens to them is up to the embedding tool.
pub trait Notify {
    fn unknown_record(&mut self, record: &UnknownRecord);
}

/// Discards every notification.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Silent;
impl Notify for Silent {
    fn unknown_record(&mut self, _record: &UnknownRecord) {}
}

/// Keeps a copy of every notification.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Collect {
    records: Vec<UnknownRecord>
}
impl Collect {
    pub fn new() -> Collect {
        Collect { records: Vec::new() }
    }

    pub fn records(&self) -> &[UnknownRecord] {
        &self.records[..]
    }

    pub fn into_records(self) -> Vec<UnknownRecord> {
        self.records
    }
}
impl Notify for Collect {
    fn unknown_record(&mut self, record: &UnknownRecord) {
        self.records.push(record.clone());
    }
}

impl<F> Notify for F
    where
        F: FnMut(&UnknownRecord)
{
    fn unknown_record(&mut self, record: &UnknownRecord) {
        self(record)
    }
}
