//! Core domain types for converting OpenStreetMap XML into tables.
//!
//! Responsibilities:
//! - Model parsed elements and the flat records derived from them.
//! - Classify tag keys into a type and a key.
//! - Shape nodes and ways into rows for the `nodes`, `nodes_tags`, `ways`,
//!   `ways_nodes` and `ways_tags` tables.
//! - Validate shaped rows against the table schema on request.
//!
//! Boundaries:
//! - No I/O. Reading XML and writing rows live in `osm2sql-data`.
//!
//! Invariants:
//! - Attribute values are copied verbatim; nothing is parsed or normalised.
//! - Way node positions start at zero and increase by one in document order.

pub mod classify;
pub mod element;
pub mod record;
pub mod schema;
pub mod shape;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use classify::{DEFAULT_TAG_TYPE, PROBLEM_CHARS, TagKey, classify, has_problem_chars};
pub use element::{Descendants, Element, ElementKind};
pub use record::{Cell, NodeRecord, Row, Table, TagRecord, WayNodeRecord, WayRecord};
pub use schema::{
    ElementValidator, FieldKind, FieldRule, Schema, SchemaValidator, SchemaViolation,
    TableSchema, ViolationReason,
};
pub use shape::{MalformedElement, ShapedElement, ShapedNode, ShapedWay, Shaper, shape};
