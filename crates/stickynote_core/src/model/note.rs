//! Persisted note record model.
//!
//! # Responsibility
//! - Define the flattened, serializable snapshot of one note.
//! - Encode/decode a surface's ordered record list as JSON.
//!
//! # Invariants
//! - `identifier` is stable across persist/reload and never blank.
//! - Record lists keep collection insertion order.
//! - Runtime state (active flag, gesture state) is never persisted.

use crate::model::geometry::{Point, Size};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable note identifier.
///
/// Freshly created notes get a UUID v4 string; identifiers read back from
/// storage are kept verbatim, whatever their format.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Generates a new random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Flattened snapshot of one note, as written to storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawNoteRecord")]
pub struct NoteRecord {
    pub identifier: NoteId,
    pub width: u32,
    pub height: u32,
    pub position: Point,
    /// Raw editor content; may contain inline markup.
    pub text: String,
}

impl NoteRecord {
    /// Builds a record, rejecting blank identifiers.
    pub fn new(
        identifier: NoteId,
        size: Size,
        position: Point,
        text: impl Into<String>,
    ) -> Result<Self, RecordValidationError> {
        let record = Self {
            identifier,
            width: size.width,
            height: size.height,
            position,
            text: text.into(),
        };
        record.validate()?;
        Ok(record)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Validates record-level invariants.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if self.identifier.is_blank() {
            return Err(RecordValidationError::BlankIdentifier);
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct RawNoteRecord {
    identifier: NoteId,
    width: u32,
    height: u32,
    position: Point,
    text: String,
}

impl TryFrom<RawNoteRecord> for NoteRecord {
    type Error = RecordValidationError;

    fn try_from(raw: RawNoteRecord) -> Result<Self, Self::Error> {
        NoteRecord::new(
            raw.identifier,
            Size::new(raw.width, raw.height),
            raw.position,
            raw.text,
        )
    }
}

/// Record shape violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    BlankIdentifier,
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankIdentifier => write!(f, "note identifier must not be blank"),
        }
    }
}

impl Error for RecordValidationError {}

/// JSON encode/decode failure for a record list.
#[derive(Debug)]
pub enum RecordCodecError {
    Json(serde_json::Error),
}

impl Display for RecordCodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "malformed note records: {err}"),
        }
    }
}

impl Error for RecordCodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for RecordCodecError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Serializes an ordered record list to its JSON text form.
pub fn encode_records(records: &[NoteRecord]) -> Result<String, RecordCodecError> {
    Ok(serde_json::to_string(records)?)
}

/// Parses a JSON record list.
///
/// A JSON `null` payload decodes to an empty list, matching a surface that
/// was never saved.
pub fn decode_records(payload: &str) -> Result<Vec<NoteRecord>, RecordCodecError> {
    let parsed: Option<Vec<NoteRecord>> = serde_json::from_str(payload)?;
    Ok(parsed.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::{decode_records, encode_records, NoteId, NoteRecord, RecordValidationError};
    use crate::model::geometry::{Point, Size};

    fn sample() -> NoteRecord {
        NoteRecord::new(
            NoteId::from("11111111-2222-4333-8444-555555555555"),
            Size::new(200, 100),
            Point::new(12, 34),
            "hello <b>world</b>",
        )
        .expect("sample record should be valid")
    }

    #[test]
    fn generated_ids_are_unique_uuid_strings() {
        let first = NoteId::generate();
        let second = NoteId::generate();
        assert_ne!(first, second);
        assert_eq!(first.as_str().len(), 36);
    }

    #[test]
    fn record_uses_expected_wire_fields() {
        let json = serde_json::to_value(sample()).expect("record should serialize");
        assert_eq!(json["identifier"], "11111111-2222-4333-8444-555555555555");
        assert_eq!(json["width"], 200);
        assert_eq!(json["height"], 100);
        assert_eq!(json["position"]["x"], 12);
        assert_eq!(json["position"]["y"], 34);
        assert_eq!(json["text"], "hello <b>world</b>");
    }

    #[test]
    fn blank_identifier_is_rejected() {
        let err = NoteRecord::new(NoteId::from("  "), Size::default(), Point::default(), "")
            .expect_err("blank identifier must fail");
        assert_eq!(err, RecordValidationError::BlankIdentifier);

        let payload = r#"[{"identifier":"","width":1,"height":1,"position":{"x":0,"y":0},"text":""}]"#;
        let err = decode_records(payload).expect_err("blank identifier must fail decode");
        assert!(err.to_string().contains("must not be blank"));
    }

    #[test]
    fn decode_accepts_null_and_rejects_garbage() {
        assert!(decode_records("null").expect("null decodes").is_empty());
        assert!(decode_records("[]").expect("empty list decodes").is_empty());
        assert!(decode_records("{not json").is_err());
        assert!(decode_records(r#"[{"identifier":"a"}]"#).is_err());
    }

    #[test]
    fn encoded_list_preserves_order() {
        let mut second = sample();
        second.identifier = NoteId::from("b");
        let payload = encode_records(&[sample(), second.clone()]).expect("encode");
        let decoded = decode_records(&payload).expect("decode");
        assert_eq!(decoded[1], second);
        assert_eq!(decoded.len(), 2);
    }
}
