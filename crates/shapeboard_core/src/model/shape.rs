//! Shape domain model.
//!
//! # Responsibility
//! - Define the canonical record rendered on the board.
//! - Own the closed set of shape kinds and their wire tags.
//!
//! # Invariants
//! - `id` is assigned once by the store and never reused for another shape.
//! - `kind` is one of the closed `ShapeKind` variants.
//! - `color` is opaque to core; only the view interprets it.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Stable identifier for every shape on the board.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type ShapeId = u64;

/// Largest id the board issues or accepts from storage (2^53 - 1, the
/// largest integer a JSON number carries exactly in every reader).
pub const MAX_SHAPE_ID: ShapeId = (1 << 53) - 1;

/// Color used when a persisted shape carries no usable color.
pub const DEFAULT_COLOR: &str = "hsl(0, 0%, 80%)";

/// Categorical tag of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Square,
    Circle,
}

impl ShapeKind {
    /// Every kind, in display order.
    pub const ALL: [ShapeKind; 2] = [ShapeKind::Square, ShapeKind::Circle];

    /// Wire/CSS tag for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::Circle => "circle",
        }
    }
}

impl Display for ShapeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeKind {
    type Err = InvalidKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "square" => Ok(Self::Square),
            "circle" => Ok(Self::Circle),
            other => Err(InvalidKind(other.to_string())),
        }
    }
}

/// Raised when a caller passes a tag outside the closed `ShapeKind` set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidKind(pub String);

impl Display for InvalidKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown shape kind `{}`; expected square|circle", self.0)
    }
}

impl Error for InvalidKind {}

/// Opaque visual color value (CSS color syntax in practice).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new(DEFAULT_COLOR)
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One shape tracked by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    pub id: ShapeId,
    /// Serialized as `type` to match the persisted record.
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub color: Color,
}

impl Shape {
    pub fn new(id: ShapeId, kind: ShapeKind, color: Color) -> Self {
        Self { id, kind, color }
    }
}
