//! Behavioural tests for the `shape` entry point.

use osm2sql_core::{
    Element, ElementKind, MalformedElement, ShapedElement, WayNodeRecord, shape,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::{cell::RefCell, fs, path::PathBuf};

const NODE_ID: &str = "757860928";
const WAY_ID: &str = "209809850";
const RING: [&str; 7] = [
    "2199822281",
    "2199822390",
    "2199822392",
    "2199822369",
    "2199822370",
    "2199822284",
    "2199822281",
];

fn tag(key: &str, value: &str) -> Element {
    Element::new("tag")
        .with_attribute("k", key)
        .with_attribute("v", value)
}

fn node_attributes(include_uid: bool) -> Element {
    let node = Element::new("node")
        .with_attribute("id", NODE_ID)
        .with_attribute("user", "uboot")
        .with_attribute("version", "2")
        .with_attribute("lat", "41.9747374")
        .with_attribute("lon", "-87.6920102")
        .with_attribute("timestamp", "2010-07-22T16:16:51Z")
        .with_attribute("changeset", "5288876");
    if include_uid {
        node.with_attribute("uid", "26299")
    } else {
        node
    }
}

#[fixture]
fn subject() -> RefCell<Option<Element>> {
    RefCell::new(None)
}

#[fixture]
fn outcome() -> RefCell<Option<Result<ShapedElement, MalformedElement>>> {
    RefCell::new(None)
}

fn expect_shaped(
    outcome: &RefCell<Option<Result<ShapedElement, MalformedElement>>>,
) -> ShapedElement {
    outcome
        .borrow()
        .as_ref()
        .expect("shaping was attempted")
        .as_ref()
        .expect("expected shaping to succeed")
        .clone()
}

#[given("a node with three colon-free tags")]
fn tagged_node(#[from(subject)] subject: &RefCell<Option<Element>>) {
    let node = node_attributes(true)
        .with_child(tag("amenity", "fast_food"))
        .with_child(tag("cuisine", "sausage"))
        .with_child(tag("name", "Shelly's Tasty Freeze"));
    *subject.borrow_mut() = Some(node);
}

#[given("a way whose node references form a closed ring")]
fn closed_way(#[from(subject)] subject: &RefCell<Option<Element>>) {
    let mut way = Element::new("way")
        .with_attribute("id", WAY_ID)
        .with_attribute("user", "chicago-buildings")
        .with_attribute("uid", "674454")
        .with_attribute("version", "1")
        .with_attribute("timestamp", "2013-03-13T15:58:04Z")
        .with_attribute("changeset", "15353317");
    for node_ref in RING {
        way.push_child(Element::new("nd").with_attribute("ref", node_ref));
    }
    let way = way
        .with_child(tag("addr:housenumber", "1412"))
        .with_child(tag("addr:street name", "West Lexington St."))
        .with_child(tag("addr:street", "West Lexington St."))
        .with_child(tag("building", "yes"));
    *subject.borrow_mut() = Some(way);
}

#[given("a node without a uid attribute")]
fn node_without_uid(#[from(subject)] subject: &RefCell<Option<Element>>) {
    let node = node_attributes(false).with_child(tag("amenity", "fast_food"));
    *subject.borrow_mut() = Some(node);
}

#[when("I shape the element")]
fn shape_subject(
    #[from(subject)] subject: &RefCell<Option<Element>>,
    #[from(outcome)] outcome: &RefCell<Option<Result<ShapedElement, MalformedElement>>>,
) {
    let result = {
        let guard = subject.borrow();
        let element = guard.as_ref().expect("element prepared");
        shape(element)
    };
    *outcome.borrow_mut() = Some(result);
}

#[then("the node record copies every attribute")]
fn node_record_copied(
    #[from(outcome)] outcome: &RefCell<Option<Result<ShapedElement, MalformedElement>>>,
) {
    let ShapedElement::Node(node) = expect_shaped(outcome) else {
        panic!("expected a shaped node");
    };
    let record = node.record;
    assert_eq!(record.id, NODE_ID);
    assert_eq!(record.user, "uboot");
    assert_eq!(record.uid, "26299");
    assert_eq!(record.version, "2");
    assert_eq!(record.lat, "41.9747374");
    assert_eq!(record.lon, "-87.6920102");
    assert_eq!(record.timestamp, "2010-07-22T16:16:51Z");
    assert_eq!(record.changeset, "5288876");
}

#[then("three regular tags are emitted in document order")]
fn regular_tags(
    #[from(outcome)] outcome: &RefCell<Option<Result<ShapedElement, MalformedElement>>>,
) {
    let ShapedElement::Node(node) = expect_shaped(outcome) else {
        panic!("expected a shaped node");
    };
    let tags: Vec<(&str, &str, &str, &str)> = node
        .tags
        .iter()
        .map(|tag| {
            (
                tag.id.as_str(),
                tag.key.as_str(),
                tag.value.as_str(),
                tag.tag_type.as_str(),
            )
        })
        .collect();
    assert_eq!(
        tags,
        [
            (NODE_ID, "amenity", "fast_food", "regular"),
            (NODE_ID, "cuisine", "sausage", "regular"),
            (NODE_ID, "name", "Shelly's Tasty Freeze", "regular"),
        ]
    );
}

#[then("way node positions run from zero in document order")]
fn ring_positions(
    #[from(outcome)] outcome: &RefCell<Option<Result<ShapedElement, MalformedElement>>>,
) {
    let ShapedElement::Way(way) = expect_shaped(outcome) else {
        panic!("expected a shaped way");
    };
    let expected: Vec<WayNodeRecord> = RING
        .iter()
        .zip(0..)
        .map(|(node_ref, position)| WayNodeRecord {
            id: WAY_ID.into(),
            node_id: (*node_ref).into(),
            position,
        })
        .collect();
    assert_eq!(way.nodes, expected);
}

#[then("tag keys with problem characters are dropped")]
fn problem_keys_dropped(
    #[from(outcome)] outcome: &RefCell<Option<Result<ShapedElement, MalformedElement>>>,
) {
    let ShapedElement::Way(way) = expect_shaped(outcome) else {
        panic!("expected a shaped way");
    };
    let tags: Vec<(&str, &str, &str)> = way
        .tags
        .iter()
        .map(|tag| (tag.tag_type.as_str(), tag.key.as_str(), tag.value.as_str()))
        .collect();
    assert_eq!(
        tags,
        [
            ("addr", "housenumber", "1412"),
            ("addr", "street", "West Lexington St."),
            ("regular", "building", "yes"),
        ]
    );
}

#[then("a malformed element error names the uid attribute")]
fn missing_uid(
    #[from(outcome)] outcome: &RefCell<Option<Result<ShapedElement, MalformedElement>>>,
) {
    let borrowed = outcome.borrow();
    let result = borrowed.as_ref().expect("shaping was attempted");
    match result {
        Ok(shaped) => panic!("expected a malformed element, got {shaped:?}"),
        Err(MalformedElement::MissingAttribute {
            kind,
            id,
            attribute,
        }) => {
            assert_eq!(*kind, ElementKind::Node);
            assert_eq!(id, NODE_ID);
            assert_eq!(*attribute, "uid");
        }
        Err(other) => panic!("expected a missing attribute error, got {other:?}"),
    }
}

#[test]
fn scenario_indices_follow_feature_order() {
    let feature =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/features/shape_element.feature");
    let contents = fs::read_to_string(&feature).unwrap_or_else(|err| {
        panic!("failed to read feature file {feature:?}: {err}");
    });
    let titles: Vec<&str> = contents
        .lines()
        .filter_map(|line| line.trim().strip_prefix("Scenario: "))
        .collect();
    assert_eq!(
        titles,
        [
            "shaping a tagged node",
            "shaping a closed way",
            "rejecting a node without a uid",
        ],
        "scenario order changed in feature file"
    );
}

#[scenario(path = "tests/features/shape_element.feature", index = 0)]
fn shaping_tagged_node(
    subject: RefCell<Option<Element>>,
    outcome: RefCell<Option<Result<ShapedElement, MalformedElement>>>,
) {
    let _ = (subject, outcome);
}

#[scenario(path = "tests/features/shape_element.feature", index = 1)]
fn shaping_closed_way(
    subject: RefCell<Option<Element>>,
    outcome: RefCell<Option<Result<ShapedElement, MalformedElement>>>,
) {
    let _ = (subject, outcome);
}

#[scenario(path = "tests/features/shape_element.feature", index = 2)]
fn rejecting_node_without_uid(
    subject: RefCell<Option<Element>>,
    outcome: RefCell<Option<Result<ShapedElement, MalformedElement>>>,
) {
    let _ = (subject, outcome);
}
