//! Flat records produced by shaping, and the tables they belong to.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Destination tables with their fixed column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Table {
    /// One row per node.
    Nodes,
    /// Tags attached to nodes.
    NodesTags,
    /// One row per way.
    Ways,
    /// Ordered node references of each way.
    WaysNodes,
    /// Tags attached to ways.
    WaysTags,
}

impl Table {
    /// Every table, in creation order.
    pub const ALL: [Self; 5] = [
        Self::Nodes,
        Self::NodesTags,
        Self::Ways,
        Self::WaysNodes,
        Self::WaysTags,
    ];

    /// SQL table name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nodes => "nodes",
            Self::NodesTags => "nodes_tags",
            Self::Ways => "ways",
            Self::WaysNodes => "ways_nodes",
            Self::WaysTags => "ways_tags",
        }
    }

    /// Column names in the order rows present their cells.
    #[must_use]
    pub const fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Nodes => &[
                "id",
                "lat",
                "lon",
                "user",
                "uid",
                "version",
                "changeset",
                "timestamp",
            ],
            Self::NodesTags | Self::WaysTags => &["id", "key", "value", "type"],
            Self::Ways => &["id", "user", "uid", "version", "changeset", "timestamp"],
            Self::WaysNodes => &["id", "node_id", "position"],
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Top-level attributes of a node, copied verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeRecord {
    /// Node identifier.
    pub id: String,
    /// Latitude in decimal degrees.
    pub lat: String,
    /// Longitude in decimal degrees.
    pub lon: String,
    /// Name of the last editor.
    pub user: String,
    /// Identifier of the last editor.
    pub uid: String,
    /// Element version.
    pub version: String,
    /// Changeset of the last edit.
    pub changeset: String,
    /// Time of the last edit.
    pub timestamp: String,
}

/// Top-level attributes of a way, copied verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WayRecord {
    /// Way identifier.
    pub id: String,
    /// Name of the last editor.
    pub user: String,
    /// Identifier of the last editor.
    pub uid: String,
    /// Element version.
    pub version: String,
    /// Changeset of the last edit.
    pub changeset: String,
    /// Time of the last edit.
    pub timestamp: String,
}

/// A classified tag of a node or way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TagRecord {
    /// Identifier of the owning element.
    pub id: String,
    /// Key after the type prefix has been removed.
    pub key: String,
    /// Tag value, never inspected.
    pub value: String,
    /// Type prefix, or the default type for colon-free keys.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub tag_type: String,
}

/// One node reference of a way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WayNodeRecord {
    /// Identifier of the owning way.
    pub id: String,
    /// Referenced node identifier.
    pub node_id: String,
    /// Zero-based index of the reference within the way.
    pub position: u64,
}

/// A single column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell<'a> {
    /// Text copied from the source document.
    Text(&'a str),
    /// A derived integer.
    Integer(u64),
}

impl fmt::Display for Cell<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Integer(value) => write!(f, "{value}"),
        }
    }
}

/// A record borrowed as a row of a specific table.
///
/// Node and way tags share [`TagRecord`], so the table cannot be derived from
/// the record type alone.
///
/// # Examples
/// ```
/// use osm2sql_core::{Cell, Row, Table, WayNodeRecord};
///
/// let record = WayNodeRecord {
///     id: "9".into(),
///     node_id: "4".into(),
///     position: 2,
/// };
/// let row = Row::WayNode(&record);
///
/// assert_eq!(row.table(), Table::WaysNodes);
/// assert_eq!(row.cells(), [Cell::Text("9"), Cell::Text("4"), Cell::Integer(2)]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row<'a> {
    /// A `nodes` row.
    Node(&'a NodeRecord),
    /// A `nodes_tags` row.
    NodeTag(&'a TagRecord),
    /// A `ways` row.
    Way(&'a WayRecord),
    /// A `ways_nodes` row.
    WayNode(&'a WayNodeRecord),
    /// A `ways_tags` row.
    WayTag(&'a TagRecord),
}

impl<'a> Row<'a> {
    /// Table the row belongs to.
    #[must_use]
    pub const fn table(self) -> Table {
        match self {
            Self::Node(_) => Table::Nodes,
            Self::NodeTag(_) => Table::NodesTags,
            Self::Way(_) => Table::Ways,
            Self::WayNode(_) => Table::WaysNodes,
            Self::WayTag(_) => Table::WaysTags,
        }
    }

    /// Cell values in [`Table::columns`] order.
    #[must_use]
    pub fn cells(self) -> Vec<Cell<'a>> {
        match self {
            Self::Node(node) => vec![
                Cell::Text(&node.id),
                Cell::Text(&node.lat),
                Cell::Text(&node.lon),
                Cell::Text(&node.user),
                Cell::Text(&node.uid),
                Cell::Text(&node.version),
                Cell::Text(&node.changeset),
                Cell::Text(&node.timestamp),
            ],
            Self::NodeTag(tag) | Self::WayTag(tag) => vec![
                Cell::Text(&tag.id),
                Cell::Text(&tag.key),
                Cell::Text(&tag.value),
                Cell::Text(&tag.tag_type),
            ],
            Self::Way(way) => vec![
                Cell::Text(&way.id),
                Cell::Text(&way.user),
                Cell::Text(&way.uid),
                Cell::Text(&way.version),
                Cell::Text(&way.changeset),
                Cell::Text(&way.timestamp),
            ],
            Self::WayNode(way_node) => vec![
                Cell::Text(&way_node.id),
                Cell::Text(&way_node.node_id),
                Cell::Integer(way_node.position),
            ],
        }
    }

    /// Cells paired with their column names.
    pub fn named_cells(self) -> impl Iterator<Item = (&'static str, Cell<'a>)> {
        self.table()
            .columns()
            .iter()
            .copied()
            .zip(self.cells())
    }
}
