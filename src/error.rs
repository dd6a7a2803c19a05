//! Fatal record-level errors raised by the aggregation pipeline

use std::fmt;

use thiserror::Error;

/// Identity of an input record: its position in the source and its `key` field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordId {
    pub index: usize,
    pub key: Option<String>,
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "#{} (key {})", self.index, key),
            None => write!(f, "#{} (key -)", self.index),
        }
    }
}

#[derive(Debug, Error)]
pub enum LtvError {
    #[error("record {record}: malformed event_time {value:?}")]
    MalformedEventTime { record: RecordId, value: String },

    #[error("record {record}: malformed total_amount {value:?}")]
    MalformedAmount { record: RecordId, value: String },

    #[error("record {record}: field `{field}` is not a string")]
    InvalidFieldType { record: RecordId, field: &'static str },

    #[error("record #{index} is not a JSON object")]
    NotAnObject { index: usize },
}
