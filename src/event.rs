//! Event normalization: heterogeneous key-value records to a fixed field vector

use serde_json::{Map, Value};

use crate::error::{LtvError, RecordId};

/// Number of recognized fields in a normalized event
pub const FIELD_COUNT: usize = 12;

/// Recognized event fields, in the fixed order of a `NormalizedEvent`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Type,
    Verb,
    Key,
    EventTime,
    LastName,
    AddressCity,
    AddressState,
    CustomerId,
    Tags,
    CameraMake,
    CameraModel,
    TotalAmount,
}

impl Field {
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::Type,
        Field::Verb,
        Field::Key,
        Field::EventTime,
        Field::LastName,
        Field::AddressCity,
        Field::AddressState,
        Field::CustomerId,
        Field::Tags,
        Field::CameraMake,
        Field::CameraModel,
        Field::TotalAmount,
    ];

    /// Key under which the field appears in raw input records
    pub fn source_key(self) -> &'static str {
        match self {
            Field::Type => "type",
            Field::Verb => "verb",
            Field::Key => "key",
            Field::EventTime => "event_time",
            Field::LastName => "last_name",
            Field::AddressCity => "adr_city",
            Field::AddressState => "adr_state",
            Field::CustomerId => "customer_id",
            Field::Tags => "tags",
            Field::CameraMake => "camera_make",
            Field::CameraModel => "camera_model",
            Field::TotalAmount => "total_amount",
        }
    }

    fn position(self) -> usize {
        self as usize
    }
}

/// Event categories that drive aggregation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    Customer,
    SiteVisit,
    Image,
    Order,
    Other(String),
}

impl EventType {
    fn parse(raw: &str) -> Self {
        match raw {
            "CUSTOMER" => EventType::Customer,
            "SITE_VISIT" => EventType::SiteVisit,
            "IMAGE" => EventType::Image,
            "ORDER" => EventType::Order,
            other => EventType::Other(other.to_string()),
        }
    }
}

/// Fixed-width event record. Absent fields are `None`, never a default value.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEvent {
    values: [Option<Value>; FIELD_COUNT],
}

impl NormalizedEvent {
    /// Raw value of a field, if present
    pub fn get(&self, field: Field) -> Option<&Value> {
        self.values[field.position()].as_ref()
    }

    pub fn is_present(&self, field: Field) -> bool {
        self.get(field).is_some()
    }

    /// All twelve slots in field order
    pub fn values(&self) -> &[Option<Value>; FIELD_COUNT] {
        &self.values
    }

    /// Event type, or `None` when the record carries no `type`
    pub fn event_type(&self) -> Option<EventType> {
        self.get(Field::Type).map(|value| match value {
            Value::String(s) => EventType::parse(s),
            other => EventType::Other(other.to_string()),
        })
    }

    /// Field rendered as an identifier. Non-string scalars use their JSON text.
    pub fn identifier(&self, field: Field) -> Option<String> {
        self.get(field).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Field that must hold a string when present
    pub fn text(&self, field: Field, index: usize) -> Result<Option<&str>, LtvError> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(LtvError::InvalidFieldType {
                record: self.record_id(index),
                field: field.source_key(),
            }),
        }
    }

    pub fn record_id(&self, index: usize) -> RecordId {
        RecordId {
            index,
            key: self.identifier(Field::Key),
        }
    }
}

/// Project a raw record onto the recognized field set.
///
/// Unrecognized keys are dropped. A JSON `null` counts as absent.
pub fn normalize(record: &Map<String, Value>) -> NormalizedEvent {
    let values = Field::ALL.map(|field| match record.get(field.source_key()) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value.clone()),
    });
    NormalizedEvent { values }
}

/// Normalize a record that may not be an object
pub fn normalize_value(index: usize, record: &Value) -> Result<NormalizedEvent, LtvError> {
    match record {
        Value::Object(map) => Ok(normalize(map)),
        _ => Err(LtvError::NotAnObject { index }),
    }
}
