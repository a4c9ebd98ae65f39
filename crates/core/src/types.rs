/// Document keys are strings: slugs, composite module keys, or
/// server-assigned UUIDs.
pub type DocId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
