use chrono::{DateTime, Utc};
use fitparser::de::from_bytes;

use crate::error::{FitError, Result};

/// One decoded FIT message: its global message number plus the field set.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMessage {
    pub tag: u16,
    pub fields: Vec<MessageField>,
}

impl DecodedMessage {
    pub fn new(tag: u16, fields: Vec<MessageField>) -> Self {
        Self { tag, fields }
    }

    /// Look up a field by its profile name.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageField {
    pub name: String,
    pub value: FieldValue,
}

impl MessageField {
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Scalar field shapes carried by the file_id, session and record messages.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    SInt32(i32),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    Float64(f64),
    Timestamp(DateTime<Utc>),
    Text(String),
}

/// Decode a raw FIT byte stream into its ordered message sequence.
///
/// Header, CRC and profile handling are `fitparser`'s; any failure there is
/// surfaced as a single [`FitError::Decode`]. Message order is preserved.
pub fn decode(bytes: &[u8]) -> Result<Vec<DecodedMessage>> {
    let records = from_bytes(bytes).map_err(|e| FitError::Decode(e.to_string()))?;
    Ok(records.into_iter().map(to_message).collect())
}

fn to_message(record: fitparser::FitDataRecord) -> DecodedMessage {
    let tag = record.kind().as_u16();
    let fields = record
        .into_vec()
        .into_iter()
        .filter_map(|f| {
            let name = f.name().to_owned();
            to_field_value(f.value()).map(|value| MessageField { name, value })
        })
        .collect();
    DecodedMessage { tag, fields }
}

fn to_field_value(value: &fitparser::Value) -> Option<FieldValue> {
    use fitparser::Value;
    match value {
        Value::Timestamp(ts) => Some(FieldValue::Timestamp(ts.with_timezone(&Utc))),
        Value::Enum(v) | Value::Byte(v) | Value::UInt8(v) | Value::UInt8z(v) => {
            Some(FieldValue::UInt8(*v))
        }
        Value::SInt8(v) => Some(FieldValue::SInt32(i32::from(*v))),
        Value::SInt16(v) => Some(FieldValue::SInt32(i32::from(*v))),
        Value::SInt32(v) => Some(FieldValue::SInt32(*v)),
        Value::UInt16(v) | Value::UInt16z(v) => Some(FieldValue::UInt16(*v)),
        Value::UInt32(v) | Value::UInt32z(v) => Some(FieldValue::UInt32(*v)),
        Value::Float32(v) => Some(FieldValue::Float64(f64::from(*v))),
        Value::Float64(v) => Some(FieldValue::Float64(*v)),
        Value::String(v) => Some(FieldValue::Text(v.clone())),
        Value::Array(values) => values.first().and_then(to_field_value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rejects_garbage() {
        let result = decode(&[0xde, 0xad, 0xbe, 0xef]);
        assert!(matches!(result, Err(FitError::Decode(_))));
    }

    #[test]
    fn test_decode_rejects_empty_input() {
        assert!(decode(&[]).is_err());
    }

    #[test]
    fn test_field_lookup_by_name() {
        let message = DecodedMessage::new(
            crate::MSG_RECORD,
            vec![
                MessageField::new("position_lat", FieldValue::SInt32(100_000_000)),
                MessageField::new("altitude", FieldValue::Float64(12.5)),
            ],
        );

        assert_eq!(
            message.field("position_lat"),
            Some(&FieldValue::SInt32(100_000_000))
        );
        assert_eq!(message.field("altitude"), Some(&FieldValue::Float64(12.5)));
        assert_eq!(message.field("heart_rate"), None);
    }

    #[test]
    fn test_array_values_flatten_to_first_element() {
        let value = fitparser::Value::Array(vec![
            fitparser::Value::UInt16(42),
            fitparser::Value::UInt16(7),
        ]);
        assert_eq!(to_field_value(&value), Some(FieldValue::UInt16(42)));
    }
}
