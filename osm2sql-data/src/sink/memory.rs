//! In-memory sink holding owned records per table.

use osm2sql_core::{NodeRecord, Row, Table, TagRecord, WayNodeRecord, WayRecord};

use super::{RowSink, SinkError, SinkSummary};

/// Committed contents of a [`MemorySink`], one vector per table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabularOutput {
    /// Rows of `nodes`.
    pub nodes: Vec<NodeRecord>,
    /// Rows of `nodes_tags`.
    pub nodes_tags: Vec<TagRecord>,
    /// Rows of `ways`.
    pub ways: Vec<WayRecord>,
    /// Rows of `ways_nodes`.
    pub ways_nodes: Vec<WayNodeRecord>,
    /// Rows of `ways_tags`.
    pub ways_tags: Vec<TagRecord>,
}

impl TabularOutput {
    /// Row counts per table.
    #[must_use]
    pub fn summary(&self) -> SinkSummary {
        let len = |rows: usize| u64::try_from(rows).unwrap_or(u64::MAX);
        SinkSummary {
            nodes: len(self.nodes.len()),
            nodes_tags: len(self.nodes_tags.len()),
            ways: len(self.ways.len()),
            ways_nodes: len(self.ways_nodes.len()),
            ways_tags: len(self.ways_tags.len()),
        }
    }

    /// Borrow every stored row of `table` in append order.
    #[must_use]
    pub fn rows(&self, table: Table) -> Vec<Row<'_>> {
        match table {
            Table::Nodes => self.nodes.iter().map(Row::Node).collect(),
            Table::NodesTags => self.nodes_tags.iter().map(Row::NodeTag).collect(),
            Table::Ways => self.ways.iter().map(Row::Way).collect(),
            Table::WaysNodes => self.ways_nodes.iter().map(Row::WayNode).collect(),
            Table::WaysTags => self.ways_tags.iter().map(Row::WayTag).collect(),
        }
    }
}

/// Sink that keeps rows in memory until committed.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    output: TabularOutput,
}

impl MemorySink {
    /// Empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows appended so far, not yet committed.
    #[must_use]
    pub const fn pending(&self) -> &TabularOutput {
        &self.output
    }
}

impl RowSink for MemorySink {
    type Output = TabularOutput;

    fn append(&mut self, row: Row<'_>) -> Result<(), SinkError> {
        let output = &mut self.output;
        match row {
            Row::Node(node) => output.nodes.push(node.clone()),
            Row::NodeTag(tag) => output.nodes_tags.push(tag.clone()),
            Row::Way(way) => output.ways.push(way.clone()),
            Row::WayNode(way_node) => output.ways_nodes.push(way_node.clone()),
            Row::WayTag(tag) => output.ways_tags.push(tag.clone()),
        }
        Ok(())
    }

    fn commit(self) -> Result<Self::Output, SinkError> {
        Ok(self.output)
    }
}
