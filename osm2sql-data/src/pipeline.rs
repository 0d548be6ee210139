//! Conversion pipeline: source, shaper, optional validator and sink.

use std::num::NonZeroU64;

use camino::Utf8PathBuf;
use log::{debug, info, warn};
use osm2sql_core::{
    Element, ElementValidator, MalformedElement, SchemaValidator, SchemaViolation, ShapedElement,
    Shaper,
};
use thiserror::Error;

use crate::sink::{RowSink, SinkError, SinkSummary, SqliteSink};
use crate::source::{SourceError, open_osm_file};

/// Elements between two progress log lines unless configured otherwise.
pub const DEFAULT_PROGRESS_INTERVAL: NonZeroU64 = match NonZeroU64::new(100_000) {
    Some(interval) => interval,
    None => NonZeroU64::MIN,
};

/// Errors that abort a conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Reading the document failed.
    #[error("failed to read OSM elements")]
    Source(#[from] SourceError),
    /// An element lacks a required attribute.
    #[error("malformed OSM element")]
    Shape(#[from] MalformedElement),
    /// A shaped element failed schema validation.
    #[error("element failed schema validation")]
    Validation(#[from] SchemaViolation),
    /// Writing rows failed.
    #[error("failed to write rows")]
    Sink(#[from] SinkError),
}

/// Totals of a finished conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionReport {
    /// Elements read from the source.
    pub elements: u64,
    /// Nodes shaped and written.
    pub nodes: u64,
    /// Ways shaped and written.
    pub ways: u64,
    /// Elements dropped because they are neither nodes nor ways.
    pub unsupported: u64,
    /// Rows handed to the sink, per table.
    pub rows: SinkSummary,
}

/// Drives elements through shaping, validation and a sink.
///
/// The first failure aborts the run. The sink is then dropped without being
/// committed, so a transactional sink keeps nothing.
///
/// # Examples
/// ```
/// use osm2sql_data::{Converter, MemorySink, OsmXmlSource};
///
/// let xml = r#"<osm>
///   <node id="1" lat="0.5" lon="0.5" user="u" uid="2" version="1" changeset="3" timestamp="t">
///     <tag k="addr:city" v="Chicago"/>
///   </node>
/// </osm>"#;
///
/// let (report, tables) = Converter::new().run(OsmXmlSource::new(xml.as_bytes()), MemorySink::new())?;
/// assert_eq!(report.nodes, 1);
/// assert_eq!(tables.nodes_tags[0].tag_type, "addr");
/// # Ok::<(), osm2sql_data::ConvertError>(())
/// ```
#[derive(Debug, Default)]
pub struct Converter {
    shaper: Shaper,
    validator: Option<Box<dyn ElementValidator>>,
    progress_interval: Option<NonZeroU64>,
}

impl Converter {
    /// Converter with default shaping, no validation and the default progress
    /// interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom shaper.
    #[must_use]
    pub fn with_shaper(mut self, shaper: Shaper) -> Self {
        self.shaper = shaper;
        self
    }

    /// Validate every shaped element before writing it.
    #[must_use]
    pub fn with_validator(mut self, validator: impl ElementValidator + 'static) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Log progress every `interval` elements.
    #[must_use]
    pub fn with_progress_interval(mut self, interval: NonZeroU64) -> Self {
        self.progress_interval = Some(interval);
        self
    }

    /// Elements between progress log lines.
    #[must_use]
    pub fn progress_interval(&self) -> NonZeroU64 {
        self.progress_interval.unwrap_or(DEFAULT_PROGRESS_INTERVAL)
    }

    /// Whether shaped elements are validated.
    #[must_use]
    pub const fn validates(&self) -> bool {
        self.validator.is_some()
    }

    /// Convert every element from `elements` into rows of `sink`, then commit.
    ///
    /// # Errors
    /// Returns the first [`ConvertError`]; the sink is not committed then.
    pub fn run<I, S>(
        &self,
        elements: I,
        mut sink: S,
    ) -> Result<(ConversionReport, S::Output), ConvertError>
    where
        I: IntoIterator<Item = Result<Element, SourceError>>,
        S: RowSink,
    {
        let interval = self.progress_interval().get();
        let mut report = ConversionReport::default();

        for element in elements {
            let element = element.inspect_err(|err| warn!("aborting conversion: {err}"))?;
            report.elements += 1;
            if report.elements.is_multiple_of(interval) {
                info!("processed {} elements", report.elements);
            }
            self.convert_element(&element, &mut sink, &mut report)
                .inspect_err(|err| warn!("aborting conversion: {err}"))?;
        }

        info!(
            "read {} elements ({} nodes, {} ways); committing {} rows",
            report.elements,
            report.nodes,
            report.ways,
            report.rows.total()
        );
        let output = sink.commit()?;
        Ok((report, output))
    }

    fn convert_element<S: RowSink>(
        &self,
        element: &Element,
        sink: &mut S,
        report: &mut ConversionReport,
    ) -> Result<(), ConvertError> {
        let shaped = self.shaper.shape(element)?;
        match &shaped {
            ShapedElement::Node(_) => report.nodes += 1,
            ShapedElement::Way(_) => report.ways += 1,
            ShapedElement::Unsupported => {
                debug!("skipping unsupported <{}> element", element.name());
                report.unsupported += 1;
                return Ok(());
            }
        }
        if let Some(validator) = &self.validator {
            validator.validate(&shaped)?;
        }
        for row in shaped.rows() {
            sink.append(row)?;
            report.rows.record(row.table());
        }
        Ok(())
    }
}

/// Settings for [`convert_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Input `.osm` or `.osm.bz2` document.
    pub osm: Utf8PathBuf,
    /// SQLite database receiving the tables.
    pub database: Utf8PathBuf,
    /// Validate shaped elements against the built-in schema.
    pub validate: bool,
    /// Elements between progress log lines.
    pub progress_interval: NonZeroU64,
    /// Type recorded for tag keys without a colon.
    pub default_tag_type: String,
}

impl ConvertOptions {
    /// Options with defaults for everything but the paths.
    #[must_use]
    pub fn new(osm: impl Into<Utf8PathBuf>, database: impl Into<Utf8PathBuf>) -> Self {
        Self {
            osm: osm.into(),
            database: database.into(),
            validate: false,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            default_tag_type: Shaper::default().default_tag_type().to_owned(),
        }
    }

    fn converter(&self) -> Converter {
        let converter = Converter::new()
            .with_shaper(Shaper::new().with_default_tag_type(self.default_tag_type.clone()))
            .with_progress_interval(self.progress_interval);
        if self.validate {
            converter.with_validator(SchemaValidator::default())
        } else {
            converter
        }
    }
}

/// Convert an OSM XML file into the five tables of an SQLite database.
///
/// # Errors
/// Returns [`ConvertError`] when reading, shaping, validating or writing
/// fails. Nothing is committed in that case.
pub fn convert_file(options: &ConvertOptions) -> Result<ConversionReport, ConvertError> {
    info!("converting {} into {}", options.osm, options.database);
    let source = open_osm_file(&options.osm)?;
    let sink = SqliteSink::open(&options.database)?;
    let (report, _) = options.converter().run(source, sink)?;
    Ok(report)
}
