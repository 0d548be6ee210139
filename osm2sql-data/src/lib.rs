//! Reading OpenStreetMap XML and writing the converted tables.
//!
//! Responsibilities:
//! - Stream node and way elements out of `.osm` and `.osm.bz2` documents.
//! - Persist rows through the two-phase [`RowSink`] interface, to SQLite or
//!   memory.
//! - Drive the conversion from source to sink and report totals.
//!
//! Boundaries:
//! - Shaping, classification and schema rules live in `osm2sql-core`.
//!
//! Invariants:
//! - Single pass, single thread; one element is fully written before the next
//!   is read.
//! - A failed conversion commits nothing.

pub mod fs;
pub mod pipeline;
pub mod sink;
pub mod source;

pub use pipeline::{
    ConversionReport, ConvertError, ConvertOptions, Converter, DEFAULT_PROGRESS_INTERVAL,
    convert_file,
};
pub use sink::{MemorySink, RowSink, SinkError, SinkSummary, SqliteSink, TabularOutput};
pub use source::{OsmXmlSource, SourceError, is_bz2, open_osm_file};
