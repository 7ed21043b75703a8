//! Persisted record wire format.
//!
//! ```json
//! {"shapes":[{"id":1,"type":"square","color":"hsl(12, 70%, 60%)"}],"nextId":2}
//! ```
//!
//! # Invariants
//! - Encoding always writes the full record; there are no partial writes.
//! - Decoding rejects the record only when it is not an object carrying a
//!   `shapes` array. Bad entries are skipped, missing fields are defaulted.
//! - Decoded shapes have pairwise distinct ids (first occurrence wins).

use crate::model::shape::{Color, Shape, ShapeId, ShapeKind, MAX_SHAPE_ID};
use log::warn;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const SHAPES_FIELD: &str = "shapes";
const NEXT_ID_FIELD: &str = "nextId";

/// Why a persisted record could not be used at all.
#[derive(Debug)]
pub enum DecodeError {
    Json(serde_json::Error),
    NotAnObject,
    MissingShapes,
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "record is not valid JSON: {err}"),
            Self::NotAnObject => write!(f, "record is not a JSON object"),
            Self::MissingShapes => write!(f, "record has no `{SHAPES_FIELD}` array"),
        }
    }
}

impl Error for DecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::NotAnObject | Self::MissingShapes => None,
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Result of decoding a persisted record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedState {
    pub shapes: Vec<Shape>,
    /// `None` when the counter was missing or malformed.
    pub next_id: Option<ShapeId>,
    /// Number of entries dropped because they could not be repaired.
    pub skipped: usize,
}

#[derive(Serialize)]
struct RecordRef<'a> {
    shapes: &'a [Shape],
    #[serde(rename = "nextId")]
    next_id: ShapeId,
}

/// Serializes the full record.
pub fn encode_record(shapes: &[Shape], next_id: ShapeId) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(&RecordRef { shapes, next_id })
}

/// Parses a persisted record, repairing what can be repaired.
pub fn decode_record(bytes: &[u8]) -> Result<LoadedState, DecodeError> {
    let value: Value = serde_json::from_slice(bytes)?;
    let object = value.as_object().ok_or(DecodeError::NotAnObject)?;
    let entries = object
        .get(SHAPES_FIELD)
        .and_then(Value::as_array)
        .ok_or(DecodeError::MissingShapes)?;

    let mut loaded = LoadedState {
        shapes: Vec::with_capacity(entries.len()),
        next_id: object
            .get(NEXT_ID_FIELD)
            .and_then(Value::as_u64)
            .filter(|next| *next <= MAX_SHAPE_ID),
        skipped: 0,
    };
    let mut seen = HashSet::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        match decode_shape(entry) {
            Ok(shape) if seen.insert(shape.id) => loaded.shapes.push(shape),
            Ok(shape) => {
                warn!(
                    "event=record_decode module=persist status=skip index={index} reason=duplicate_id id={}",
                    shape.id
                );
                loaded.skipped += 1;
            }
            Err(reason) => {
                warn!(
                    "event=record_decode module=persist status=skip index={index} reason={reason}"
                );
                loaded.skipped += 1;
            }
        }
    }

    Ok(loaded)
}

fn decode_shape(entry: &Value) -> Result<Shape, &'static str> {
    let fields = entry.as_object().ok_or("not_an_object")?;
    let id = fields
        .get("id")
        .and_then(Value::as_u64)
        .filter(|id| (1..=MAX_SHAPE_ID).contains(id))
        .ok_or("invalid_id")?;
    let kind = fields
        .get("type")
        .and_then(Value::as_str)
        .and_then(|tag| tag.parse::<ShapeKind>().ok())
        .ok_or("invalid_type")?;
    let color = fields
        .get("color")
        .and_then(Value::as_str)
        .filter(|color| !color.trim().is_empty())
        .map(Color::new)
        .unwrap_or_default();

    Ok(Shape::new(id, kind, color))
}
