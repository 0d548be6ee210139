//! Table schemas and the optional per-element validator.
//!
//! Validation is a conformance check on shaped rows before they reach a sink.
//! It parses every numeric cell, so it costs roughly an order of magnitude in
//! throughput; callers should leave it off for full runs and enable it on a
//! sample.

use std::fmt;

use thiserror::Error;

use crate::record::{Cell, Table};
use crate::shape::ShapedElement;

/// Value type a column must coerce to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A signed 64-bit integer.
    Integer,
    /// A floating point number.
    Float,
    /// Any text.
    String,
}

/// Constraint on one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    /// Column name.
    pub name: &'static str,
    /// Type the value must coerce to.
    pub kind: FieldKind,
    /// Whether the row must carry the column.
    pub required: bool,
}

impl FieldRule {
    const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }
}

/// Rules for every column of one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    /// Table the rules apply to.
    pub table: Table,
    /// Column rules.
    pub fields: &'static [FieldRule],
}

const NODE_FIELDS: &[FieldRule] = &[
    FieldRule::required("id", FieldKind::Integer),
    FieldRule::required("lat", FieldKind::Float),
    FieldRule::required("lon", FieldKind::Float),
    FieldRule::required("user", FieldKind::String),
    FieldRule::required("uid", FieldKind::Integer),
    FieldRule::required("version", FieldKind::String),
    FieldRule::required("changeset", FieldKind::Integer),
    FieldRule::required("timestamp", FieldKind::String),
];

const TAG_FIELDS: &[FieldRule] = &[
    FieldRule::required("id", FieldKind::Integer),
    FieldRule::required("key", FieldKind::String),
    FieldRule::required("value", FieldKind::String),
    FieldRule::required("type", FieldKind::String),
];

const WAY_FIELDS: &[FieldRule] = &[
    FieldRule::required("id", FieldKind::Integer),
    FieldRule::required("user", FieldKind::String),
    FieldRule::required("uid", FieldKind::Integer),
    FieldRule::required("version", FieldKind::String),
    FieldRule::required("changeset", FieldKind::Integer),
    FieldRule::required("timestamp", FieldKind::String),
];

const WAY_NODE_FIELDS: &[FieldRule] = &[
    FieldRule::required("id", FieldKind::Integer),
    FieldRule::required("node_id", FieldKind::Integer),
    FieldRule::required("position", FieldKind::Integer),
];

/// The set of table schemas a validator checks against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    tables: Vec<TableSchema>,
}

impl Schema {
    /// Build a schema from explicit table rules.
    #[must_use]
    pub const fn new(tables: Vec<TableSchema>) -> Self {
        Self { tables }
    }

    /// Schema for the five OSM tables.
    ///
    /// Identifiers, `uid`, `changeset`, `node_id` and `position` must be
    /// integers; `lat`/`lon` must be floats; everything else is free text.
    #[must_use]
    pub fn osm() -> Self {
        Self::new(vec![
            TableSchema {
                table: Table::Nodes,
                fields: NODE_FIELDS,
            },
            TableSchema {
                table: Table::NodesTags,
                fields: TAG_FIELDS,
            },
            TableSchema {
                table: Table::Ways,
                fields: WAY_FIELDS,
            },
            TableSchema {
                table: Table::WaysNodes,
                fields: WAY_NODE_FIELDS,
            },
            TableSchema {
                table: Table::WaysTags,
                fields: TAG_FIELDS,
            },
        ])
    }

    /// Rules for `table`, if the schema covers it.
    #[must_use]
    pub fn table(&self, table: Table) -> Option<&TableSchema> {
        self.tables.iter().find(|schema| schema.table == table)
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::osm()
    }
}

/// Why a value failed its rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationReason {
    /// A required column is absent.
    Missing,
    /// The value does not parse as an integer.
    NotAnInteger,
    /// The value does not parse as a float.
    NotAFloat,
    /// An integer was found where text is required.
    NotAString,
    /// The schema has no rules for the row's table.
    UnknownTable,
}

impl fmt::Display for ViolationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Missing => "required field is missing",
            Self::NotAnInteger => "must be of integer type",
            Self::NotAFloat => "must be of float type",
            Self::NotAString => "must be of string type",
            Self::UnknownTable => "table is not covered by the schema",
        })
    }
}

/// A shaped element does not conform to the schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{table} row {row} field `{field}` {reason} (value {value:?})")]
pub struct SchemaViolation {
    /// Table of the offending row.
    pub table: Table,
    /// Index of the row among this element's rows for the table.
    pub row: usize,
    /// Offending column.
    pub field: &'static str,
    /// Offending value, empty when missing.
    pub value: String,
    /// Failed rule.
    pub reason: ViolationReason,
}

/// Checks shaped elements before they are written.
pub trait ElementValidator: fmt::Debug {
    /// Confirm conformance or describe the first violation found.
    ///
    /// # Errors
    /// Returns [`SchemaViolation`] naming the table, row, field and reason.
    fn validate(&self, shaped: &ShapedElement) -> Result<(), SchemaViolation>;
}

/// Validator enforcing a [`Schema`].
///
/// # Examples
/// ```
/// use osm2sql_core::{Element, ElementValidator, SchemaValidator, Table, shape};
///
/// let node = Element::new("node")
///     .with_attribute("id", "not-a-number")
///     .with_attribute("lat", "52.5")
///     .with_attribute("lon", "13.4")
///     .with_attribute("user", "mapper")
///     .with_attribute("uid", "7")
///     .with_attribute("version", "1")
///     .with_attribute("changeset", "99")
///     .with_attribute("timestamp", "2020-01-01T00:00:00Z");
///
/// let violation = SchemaValidator::default()
///     .validate(&shape(&node)?)
///     .expect_err("id is not an integer");
/// assert_eq!(violation.table, Table::Nodes);
/// assert_eq!(violation.field, "id");
/// # Ok::<(), osm2sql_core::MalformedElement>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaValidator {
    schema: Schema,
}

impl SchemaValidator {
    /// Validator for an explicit schema.
    #[must_use]
    pub const fn new(schema: Schema) -> Self {
        Self { schema }
    }

    /// Schema being enforced.
    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }
}

impl ElementValidator for SchemaValidator {
    fn validate(&self, shaped: &ShapedElement) -> Result<(), SchemaViolation> {
        let mut previous: Option<Table> = None;
        let mut index = 0;
        for row in shaped.rows() {
            let table = row.table();
            // Rows of one table are contiguous, so the index restarts on change.
            index = if previous == Some(table) { index + 1 } else { 0 };
            previous = Some(table);
            let Some(rules) = self.schema.table(table) else {
                return Err(SchemaViolation {
                    table,
                    row: index,
                    field: "",
                    value: String::new(),
                    reason: ViolationReason::UnknownTable,
                });
            };
            let cells: Vec<(&str, Cell<'_>)> = row.named_cells().collect();
            for rule in rules.fields {
                let cell = cells
                    .iter()
                    .find(|(column, _)| *column == rule.name)
                    .map(|(_, cell)| *cell);
                check_field(rule, cell).map_err(|(value, reason)| SchemaViolation {
                    table,
                    row: index,
                    field: rule.name,
                    value,
                    reason,
                })?;
            }
        }
        Ok(())
    }
}

fn check_field(
    rule: &FieldRule,
    cell: Option<Cell<'_>>,
) -> Result<(), (String, ViolationReason)> {
    let Some(cell) = cell else {
        return if rule.required {
            Err((String::new(), ViolationReason::Missing))
        } else {
            Ok(())
        };
    };
    match (rule.kind, cell) {
        (FieldKind::Integer, Cell::Integer(_)) | (FieldKind::String, Cell::Text(_)) => Ok(()),
        (FieldKind::Integer, Cell::Text(text)) => text
            .trim()
            .parse::<i64>()
            .map(|_| ())
            .map_err(|_| (text.to_owned(), ViolationReason::NotAnInteger)),
        (FieldKind::Float, Cell::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map(|_| ())
            .map_err(|_| (text.to_owned(), ViolationReason::NotAFloat)),
        (FieldKind::Float, Cell::Integer(_)) => Ok(()),
        (FieldKind::String, Cell::Integer(value)) => {
            Err((value.to_string(), ViolationReason::NotAString))
        }
    }
}
