//! Sample elements shared by unit and behaviour tests.
//!
//! The fixtures reproduce a node and a way from the Chicago extract used in
//! the OSM data wrangling course, so expected rows can be checked by hand.

use crate::Element;

/// Identifier of [`chicago_node`].
pub const CHICAGO_NODE_ID: &str = "757860928";
/// Identifier of [`chicago_way`].
pub const CHICAGO_WAY_ID: &str = "209809850";
/// Node references of [`chicago_way`]; the ring closes on its first node.
pub const CHICAGO_WAY_REFS: [&str; 7] = [
    "2199822281",
    "2199822390",
    "2199822392",
    "2199822369",
    "2199822370",
    "2199822284",
    "2199822281",
];

/// Build a `<tag>` child.
#[must_use]
pub fn tag(key: &str, value: &str) -> Element {
    Element::new("tag")
        .with_attribute("k", key)
        .with_attribute("v", value)
}

/// Build an `<nd>` child.
#[must_use]
pub fn nd(node_ref: &str) -> Element {
    Element::new("nd").with_attribute("ref", node_ref)
}

/// A fast-food node with three colon-free tags.
#[must_use]
pub fn chicago_node() -> Element {
    Element::new("node")
        .with_attribute("changeset", "5288876")
        .with_attribute("uid", "26299")
        .with_attribute("timestamp", "2010-07-22T16:16:51Z")
        .with_attribute("version", "2")
        .with_attribute("user", "uboot")
        .with_attribute("lon", "-87.6920102")
        .with_attribute("lat", "41.9747374")
        .with_attribute("id", CHICAGO_NODE_ID)
        .with_child(tag("amenity", "fast_food"))
        .with_child(tag("cuisine", "sausage"))
        .with_child(tag("name", "Shelly's Tasty Freeze"))
}

/// A building outline whose node references form a closed ring.
///
/// Carries address tags, a key rejected for its space, and a key rejected
/// for its underscore.
#[must_use]
pub fn chicago_way() -> Element {
    let way = Element::new("way")
        .with_attribute("changeset", "15353317")
        .with_attribute("user", "chicago-buildings")
        .with_attribute("version", "1")
        .with_attribute("uid", "674454")
        .with_attribute("timestamp", "2013-03-13T15:58:04Z")
        .with_attribute("id", CHICAGO_WAY_ID);
    let way = CHICAGO_WAY_REFS
        .iter()
        .fold(way, |way, node_ref| way.with_child(nd(node_ref)));
    [
        ("addr:housenumber", "1412"),
        ("addr:street", "West Lexington St."),
        ("addr:street:name", "Lexington"),
        ("addr:street name", "Lexington"),
        ("addr:street:prefix", "West"),
        ("addr:street:type", "Street"),
        ("building", "yes"),
        ("building:levels", "1"),
        ("chicago:building_id", "366409"),
    ]
    .into_iter()
    .fold(way, |way, (key, value)| way.with_child(tag(key, value)))
}
