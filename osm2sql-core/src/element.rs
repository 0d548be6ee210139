//! Parsed OpenStreetMap XML elements.
//!
//! An [`Element`] is an owned snapshot of one XML element and its subtree:
//! the tag name, the attributes in document order, and the child elements.
//! Text content is not retained; OSM XML carries everything in attributes.

use std::fmt;

/// Kinds of top-level element the shaper understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// An OSM `<node>` carrying a coordinate.
    Node,
    /// An OSM `<way>` referencing an ordered list of nodes.
    Way,
}

impl ElementKind {
    /// XML tag name for the kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Way => "way",
        }
    }

    /// Resolve a tag name into a kind, returning `None` for anything else.
    ///
    /// # Examples
    /// ```
    /// use osm2sql_core::ElementKind;
    ///
    /// assert_eq!(ElementKind::from_name("way"), Some(ElementKind::Way));
    /// assert_eq!(ElementKind::from_name("relation"), None);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "node" => Some(Self::Node),
            "way" => Some(Self::Way),
            _ => None,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One XML element with its attributes and child elements.
///
/// # Examples
/// ```
/// use osm2sql_core::Element;
///
/// let way = Element::new("way")
///     .with_attribute("id", "42")
///     .with_child(Element::new("nd").with_attribute("ref", "7"));
///
/// assert_eq!(way.attribute("id"), Some("42"));
/// assert_eq!(way.descendants_named("nd").count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
}

impl Element {
    /// Create an element without attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute, replacing any existing value under the same name.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Append a child element.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.push_child(child);
        self
    }

    /// Set an attribute in place, replacing any existing value.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|(existing, _)| *existing == name)
        {
            Some((_, slot)) => *slot = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Append a child element in place.
    pub fn push_child(&mut self, child: Self) {
        self.children.push(child);
    }

    /// Tag name of the element.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind of the element, or `None` when it is neither a node nor a way.
    #[must_use]
    pub fn kind(&self) -> Option<ElementKind> {
        ElementKind::from_name(&self.name)
    }

    /// Look up an attribute value by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attributes in document order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Direct children in document order.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Every element below this one, depth first, in document order.
    ///
    /// The element itself is not included.
    #[must_use]
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            pending: self.children.iter().rev().collect(),
        }
    }

    /// Descendants whose tag name equals `name`, in document order.
    pub fn descendants_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Self> {
        self.descendants().filter(move |element| element.name == name)
    }
}

/// Depth-first iterator over an element's subtree.
///
/// Uses an explicit worklist so arbitrarily deep documents cannot exhaust the
/// call stack.
#[derive(Debug, Clone)]
pub struct Descendants<'a> {
    pending: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.pending.pop()?;
        self.pending.extend(next.children.iter().rev());
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn nested() -> Element {
        Element::new("way")
            .with_child(Element::new("nd").with_attribute("ref", "1"))
            .with_child(
                Element::new("group")
                    .with_child(Element::new("nd").with_attribute("ref", "2"))
                    .with_child(Element::new("tag").with_attribute("k", "deep")),
            )
            .with_child(Element::new("nd").with_attribute("ref", "3"))
    }

    #[rstest]
    fn descendants_follow_document_order() {
        let way = nested();
        let names: Vec<&str> = way.descendants().map(Element::name).collect();
        assert_eq!(names, ["nd", "group", "nd", "tag", "nd"]);
    }

    #[rstest]
    fn descendants_named_reaches_nested_children() {
        let way = nested();
        let refs: Vec<&str> = way
            .descendants_named("nd")
            .filter_map(|nd| nd.attribute("ref"))
            .collect();
        assert_eq!(refs, ["1", "2", "3"]);
    }

    #[rstest]
    fn descendants_exclude_the_root() {
        let leaf = Element::new("node");
        assert_eq!(leaf.descendants().count(), 0);
    }

    #[rstest]
    fn setting_an_attribute_twice_keeps_the_latest_value() {
        let node = Element::new("node")
            .with_attribute("id", "1")
            .with_attribute("user", "a")
            .with_attribute("id", "2");
        assert_eq!(node.attribute("id"), Some("2"));
        let names: Vec<&str> = node.attributes().map(|(name, _)| name).collect();
        assert_eq!(names, ["id", "user"]);
    }

    #[rstest]
    #[case("node", Some(ElementKind::Node))]
    #[case("way", Some(ElementKind::Way))]
    #[case("relation", None)]
    #[case("Node", None)]
    fn resolves_kinds(#[case] name: &str, #[case] expected: Option<ElementKind>) {
        assert_eq!(Element::new(name).kind(), expected);
    }
}
