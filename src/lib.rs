//! Facade crate for the osm2sql converter.
//!
//! This crate re-exports the core shaping types and exposes the XML source,
//! row sinks and conversion pipeline behind the `store-sqlite` feature.

#![forbid(unsafe_code)]

pub use osm2sql_core::{
    Cell, DEFAULT_TAG_TYPE, Element, ElementKind, ElementValidator, MalformedElement, NodeRecord,
    PROBLEM_CHARS, Row, Schema, SchemaValidator, SchemaViolation, ShapedElement, ShapedNode,
    ShapedWay, Shaper, Table, TagKey, TagRecord, WayNodeRecord, WayRecord, classify, shape,
};

#[cfg(feature = "store-sqlite")]
pub use osm2sql_data::{
    ConversionReport, ConvertError, ConvertOptions, Converter, MemorySink, OsmXmlSource, RowSink,
    SinkError, SinkSummary, SourceError, SqliteSink, TabularOutput, convert_file, open_osm_file,
};

#[cfg(feature = "test-support")]
pub use osm2sql_core::test_support;
