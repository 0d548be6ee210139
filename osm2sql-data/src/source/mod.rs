//! Streaming element source over OpenStreetMap XML.
//!
//! The source walks the document once and yields each wanted top-level
//! element together with its whole subtree. Elements nested inside a yielded
//! element stay in its subtree and are never yielded on their own.

use std::fmt;
use std::io::{self, BufRead, BufReader, Read};

use bzip2::read::MultiBzDecoder;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use osm2sql_core::{Element, ElementKind};
use quick_xml::encoding::Decoder;
use quick_xml::escape::unescape;
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use thiserror::Error;

const BZIP2_EXTENSION: &str = "bz2";

/// Errors raised while reading elements from an XML document.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The input file could not be opened.
    #[error("failed to open OSM file {path:?}")]
    Open {
        /// Path that failed to open.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The document is not well-formed XML.
    #[error("malformed XML near byte {position}")]
    Xml {
        /// Byte offset where the failing event started.
        position: usize,
        /// Error reported by `quick-xml`.
        #[source]
        source: quick_xml::Error,
    },
    /// An attribute could not be parsed.
    #[error("malformed attribute near byte {position}")]
    Attribute {
        /// Byte offset where the owning tag started.
        position: usize,
        /// Error reported by `quick-xml`.
        #[source]
        source: AttrError,
    },
    /// The document ended inside a wanted element.
    #[error("document ended before <{element}> was closed")]
    UnexpectedEof {
        /// Name of the unterminated top-level element.
        element: String,
    },
}

/// Lazy iterator over the wanted elements of an XML document.
///
/// The iterator is forward-only: after it yields an error or reaches the end
/// of the document it returns `None` forever.
///
/// # Examples
/// ```
/// use osm2sql_data::OsmXmlSource;
///
/// let xml = r#"<osm>
///   <bounds minlat="0" minlon="0" maxlat="1" maxlon="1"/>
///   <node id="1" lat="0.5" lon="0.5"><tag k="name" v="A &amp; B"/></node>
///   <relation id="9"/>
/// </osm>"#;
///
/// let elements: Vec<_> = OsmXmlSource::new(xml.as_bytes()).collect::<Result<_, _>>()?;
/// assert_eq!(elements.len(), 1);
/// assert_eq!(elements[0].children()[0].attribute("v"), Some("A & B"));
/// # Ok::<(), osm2sql_data::SourceError>(())
/// ```
pub struct OsmXmlSource<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    names: Vec<String>,
    finished: bool,
}

impl<R> fmt::Debug for OsmXmlSource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OsmXmlSource")
            .field("names", &self.names)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl<R: BufRead> OsmXmlSource<R> {
    /// Source yielding nodes and ways.
    pub fn new(input: R) -> Self {
        Self::with_element_names(input, [ElementKind::Node.name(), ElementKind::Way.name()])
    }

    /// Source yielding top-level elements with any of the given names.
    pub fn with_element_names<I, S>(input: R, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut reader = Reader::from_reader(input);
        reader.trim_text(true);
        Self {
            reader,
            buf: Vec::new(),
            names: names.into_iter().map(Into::into).collect(),
            finished: false,
        }
    }

    /// Element names this source yields.
    pub fn element_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    fn next_element(&mut self) -> Result<Option<Element>, SourceError> {
        loop {
            self.buf.clear();
            let position = self.reader.buffer_position();
            let decoder = self.reader.decoder();
            let event = self
                .reader
                .read_event_into(&mut self.buf)
                .map_err(|source| SourceError::Xml { position, source })?;
            match event {
                Event::Start(start) if is_wanted(&self.names, &start) => {
                    let root = element_from(&start, decoder, position)?;
                    return self.read_subtree(root).map(Some);
                }
                Event::Empty(start) if is_wanted(&self.names, &start) => {
                    return element_from(&start, decoder, position).map(Some);
                }
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }

    fn read_subtree(&mut self, root: Element) -> Result<Element, SourceError> {
        let mut current = root;
        let mut ancestors: Vec<Element> = Vec::new();
        loop {
            self.buf.clear();
            let position = self.reader.buffer_position();
            let decoder = self.reader.decoder();
            let event = self
                .reader
                .read_event_into(&mut self.buf)
                .map_err(|source| SourceError::Xml { position, source })?;
            match event {
                Event::Start(start) => {
                    let child = element_from(&start, decoder, position)?;
                    ancestors.push(std::mem::replace(&mut current, child));
                }
                Event::Empty(start) => {
                    current.push_child(element_from(&start, decoder, position)?);
                }
                Event::End(_) => match ancestors.pop() {
                    Some(mut parent) => {
                        parent.push_child(current);
                        current = parent;
                    }
                    None => return Ok(current),
                },
                Event::Eof => {
                    let outermost = ancestors.first().unwrap_or(&current);
                    return Err(SourceError::UnexpectedEof {
                        element: outermost.name().to_owned(),
                    });
                }
                _ => {}
            }
        }
    }
}

impl<R: BufRead> Iterator for OsmXmlSource<R> {
    type Item = Result<Element, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_element() {
            Ok(Some(element)) => Some(Ok(element)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

/// Open an OSM XML file, decompressing `.bz2` inputs on the fly.
///
/// # Errors
/// Returns [`SourceError::Open`] when the file cannot be opened.
pub fn open_osm_file(path: &Utf8Path) -> Result<OsmXmlSource<Box<dyn BufRead>>, SourceError> {
    let file = fs_utf8::File::open_ambient(path, ambient_authority()).map_err(|source| {
        SourceError::Open {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let input: Box<dyn Read> = if is_bz2(path) {
        Box::new(MultiBzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(OsmXmlSource::new(Box::new(BufReader::new(input))))
}

/// Whether a path names a bzip2-compressed file.
#[must_use]
pub fn is_bz2(path: &Utf8Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(BZIP2_EXTENSION))
}

fn is_wanted(names: &[String], start: &BytesStart<'_>) -> bool {
    let name = start.name();
    names.iter().any(|wanted| wanted.as_bytes() == name.as_ref())
}

fn element_from(
    start: &BytesStart<'_>,
    decoder: Decoder,
    position: usize,
) -> Result<Element, SourceError> {
    let xml = |source| SourceError::Xml { position, source };
    let qname = start.name();
    let name = decoder.decode(qname.as_ref()).map_err(xml)?;
    let mut element = Element::new(name);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|source| SourceError::Attribute { position, source })?;
        let key = decoder.decode(attribute.key.as_ref()).map_err(xml)?;
        let raw = decoder.decode(&attribute.value).map_err(xml)?;
        let value = attribute_value(&raw).map_err(xml)?;
        element.set_attribute(key, value);
    }
    Ok(element)
}

/// Normalise literal whitespace in a raw attribute value, then expand its
/// entity and character references.
///
/// Literal tabs and line breaks become spaces, with `\r\n` counting as one
/// break. Whitespace written as a character reference such as `&#10;` is kept.
fn attribute_value(raw: &str) -> Result<String, quick_xml::Error> {
    let normalised = raw
        .replace("\r\n", " ")
        .replace(['\t', '\n', '\r'], " ");
    Ok(unescape(&normalised)?.into_owned())
}
