//! Element shaping: one parsed element in, a bundle of flat records out.
//!
//! Shaping copies the fixed attribute set of the element, scans the whole
//! subtree for `tag` and `nd` children, and classifies every tag key. A missing
//! attribute anywhere fails the whole element; a rejected tag key only drops
//! that tag.

use thiserror::Error;

use crate::classify::{DEFAULT_TAG_TYPE, classify};
use crate::element::{Element, ElementKind};
use crate::record::{NodeRecord, Row, TagRecord, WayNodeRecord, WayRecord};

const TAG_CHILD: &str = "tag";
const WAY_NODE_CHILD: &str = "nd";

/// Records derived from a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapedNode {
    /// The `nodes` row.
    pub record: NodeRecord,
    /// Surviving tags in document order.
    pub tags: Vec<TagRecord>,
}

/// Records derived from a way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapedWay {
    /// The `ways` row.
    pub record: WayRecord,
    /// Surviving tags in document order.
    pub tags: Vec<TagRecord>,
    /// Node references with their positions.
    pub nodes: Vec<WayNodeRecord>,
}

/// Result of shaping a single element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapedElement {
    /// The element was a node.
    Node(ShapedNode),
    /// The element was a way.
    Way(ShapedWay),
    /// The element was neither; callers drop it.
    Unsupported,
}

impl ShapedElement {
    /// Kind of the shaped element, if supported.
    #[must_use]
    pub const fn kind(&self) -> Option<ElementKind> {
        match self {
            Self::Node(_) => Some(ElementKind::Node),
            Self::Way(_) => Some(ElementKind::Way),
            Self::Unsupported => None,
        }
    }

    /// Identifier of the shaped element, if supported.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Node(node) => Some(&node.record.id),
            Self::Way(way) => Some(&way.record.id),
            Self::Unsupported => None,
        }
    }

    /// All rows in write order: the primary row, then way nodes, then tags.
    #[must_use]
    pub fn rows(&self) -> Vec<Row<'_>> {
        match self {
            Self::Node(node) => std::iter::once(Row::Node(&node.record))
                .chain(node.tags.iter().map(Row::NodeTag))
                .collect(),
            Self::Way(way) => std::iter::once(Row::Way(&way.record))
                .chain(way.nodes.iter().map(Row::WayNode))
                .chain(way.tags.iter().map(Row::WayTag))
                .collect(),
            Self::Unsupported => Vec::new(),
        }
    }
}

/// A node or way lacks an attribute the tables require.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedElement {
    /// The element has no `id`.
    #[error("{kind} element is missing required attribute `id`")]
    MissingId {
        /// Kind of the offending element.
        kind: ElementKind,
    },
    /// A top-level attribute is absent.
    #[error("{kind} {id} is missing required attribute `{attribute}`")]
    MissingAttribute {
        /// Kind of the offending element.
        kind: ElementKind,
        /// Identifier of the offending element.
        id: String,
        /// Name of the absent attribute.
        attribute: &'static str,
    },
    /// A `tag` or `nd` child lacks one of its attributes.
    #[error("<{child}> of {kind} {id} is missing required attribute `{attribute}`")]
    MissingChildAttribute {
        /// Kind of the owning element.
        kind: ElementKind,
        /// Identifier of the owning element.
        id: String,
        /// Tag name of the child.
        child: &'static str,
        /// Name of the absent attribute.
        attribute: &'static str,
    },
}

/// Shapes elements into table records.
///
/// # Examples
/// ```
/// use osm2sql_core::{Element, ShapedElement, Shaper};
///
/// let node = Element::new("node")
///     .with_attribute("id", "1")
///     .with_attribute("lat", "52.5")
///     .with_attribute("lon", "13.4")
///     .with_attribute("user", "mapper")
///     .with_attribute("uid", "7")
///     .with_attribute("version", "1")
///     .with_attribute("changeset", "99")
///     .with_attribute("timestamp", "2020-01-01T00:00:00Z")
///     .with_child(Element::new("tag").with_attribute("k", "amenity").with_attribute("v", "cafe"));
///
/// let ShapedElement::Node(shaped) = Shaper::default().shape(&node)? else {
///     panic!("expected a node");
/// };
/// assert_eq!(shaped.tags[0].tag_type, "regular");
/// # Ok::<(), osm2sql_core::MalformedElement>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shaper {
    default_tag_type: String,
}

impl Default for Shaper {
    fn default() -> Self {
        Self {
            default_tag_type: DEFAULT_TAG_TYPE.to_owned(),
        }
    }
}

impl Shaper {
    /// Shaper with the default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the type recorded for tag keys without a colon.
    #[must_use]
    pub fn with_default_tag_type(mut self, tag_type: impl Into<String>) -> Self {
        self.default_tag_type = tag_type.into();
        self
    }

    /// Type recorded for tag keys without a colon.
    #[must_use]
    pub fn default_tag_type(&self) -> &str {
        &self.default_tag_type
    }

    /// Shape one element.
    ///
    /// # Errors
    /// Returns [`MalformedElement`] when the element or one of its `tag`/`nd`
    /// children lacks a required attribute. Nothing is emitted for the element
    /// in that case.
    pub fn shape(&self, element: &Element) -> Result<ShapedElement, MalformedElement> {
        let Some(kind) = element.kind() else {
            return Ok(ShapedElement::Unsupported);
        };
        let id = element
            .attribute("id")
            .ok_or(MalformedElement::MissingId { kind })?;
        let fields = Fields { element, kind, id };

        let tags = self.tags(&fields)?;
        match kind {
            ElementKind::Node => Ok(ShapedElement::Node(ShapedNode {
                record: fields.node_record()?,
                tags,
            })),
            ElementKind::Way => {
                let nodes = fields.way_nodes()?;
                Ok(ShapedElement::Way(ShapedWay {
                    record: fields.way_record()?,
                    tags,
                    nodes,
                }))
            }
        }
    }

    fn tags(&self, fields: &Fields<'_>) -> Result<Vec<TagRecord>, MalformedElement> {
        let mut tags = Vec::new();
        for tag in fields.element.descendants_named(TAG_CHILD) {
            let raw_key = fields.child_attribute(tag, TAG_CHILD, "k")?;
            let value = fields.child_attribute(tag, TAG_CHILD, "v")?;
            let Some(split) = classify(raw_key) else {
                continue;
            };
            tags.push(TagRecord {
                id: fields.id.to_owned(),
                key: split.key().to_owned(),
                value: value.to_owned(),
                tag_type: split.tag_type_or(&self.default_tag_type).to_owned(),
            });
        }
        Ok(tags)
    }
}

/// Shape one element with the default options.
///
/// # Errors
/// See [`Shaper::shape`].
pub fn shape(element: &Element) -> Result<ShapedElement, MalformedElement> {
    Shaper::default().shape(element)
}

struct Fields<'a> {
    element: &'a Element,
    kind: ElementKind,
    id: &'a str,
}

impl<'a> Fields<'a> {
    fn required(&self, attribute: &'static str) -> Result<String, MalformedElement> {
        self.element
            .attribute(attribute)
            .map(str::to_owned)
            .ok_or_else(|| MalformedElement::MissingAttribute {
                kind: self.kind,
                id: self.id.to_owned(),
                attribute,
            })
    }

    fn child_attribute(
        &self,
        child: &'a Element,
        child_name: &'static str,
        attribute: &'static str,
    ) -> Result<&'a str, MalformedElement> {
        child
            .attribute(attribute)
            .ok_or_else(|| MalformedElement::MissingChildAttribute {
                kind: self.kind,
                id: self.id.to_owned(),
                child: child_name,
                attribute,
            })
    }

    fn node_record(&self) -> Result<NodeRecord, MalformedElement> {
        Ok(NodeRecord {
            id: self.id.to_owned(),
            user: self.required("user")?,
            uid: self.required("uid")?,
            version: self.required("version")?,
            lat: self.required("lat")?,
            lon: self.required("lon")?,
            timestamp: self.required("timestamp")?,
            changeset: self.required("changeset")?,
        })
    }

    fn way_record(&self) -> Result<WayRecord, MalformedElement> {
        Ok(WayRecord {
            id: self.id.to_owned(),
            user: self.required("user")?,
            uid: self.required("uid")?,
            version: self.required("version")?,
            timestamp: self.required("timestamp")?,
            changeset: self.required("changeset")?,
        })
    }

    fn way_nodes(&self) -> Result<Vec<WayNodeRecord>, MalformedElement> {
        let mut nodes = Vec::new();
        let mut position = 0;
        for nd in self.element.descendants_named(WAY_NODE_CHILD) {
            let node_id = self.child_attribute(nd, WAY_NODE_CHILD, "ref")?;
            nodes.push(WayNodeRecord {
                id: self.id.to_owned(),
                node_id: node_id.to_owned(),
                position,
            });
            position += 1;
        }
        Ok(nodes)
    }
}
