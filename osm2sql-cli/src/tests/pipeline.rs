//! Pipeline integration tests covering the convert command flow.

use super::*;
use rstest::{fixture, rstest};
use camino::Utf8Path;
use rusqlite::Connection;
use std::fs;
use tempfile::TempDir;

const EXTRACT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6">
 <node id="757860928" version="2" changeset="5288876" timestamp="2010-07-22T16:16:51Z" user="uboot" uid="26299" lat="41.9747374" lon="-87.6920102">
  <tag k="amenity" v="fast_food"/>
  <tag k="addr:street" v="North Lincoln Avenue"/>
 </node>
 <way id="209809850" version="1" changeset="15353317" timestamp="2013-03-13T15:58:04Z" user="chicago-buildings" uid="674454">
  <nd ref="2199822281"/>
  <nd ref="2199822390"/>
  <nd ref="2199822281"/>
  <tag k="building" v="yes"/>
 </way>
</osm>
"#;

struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

#[fixture]
fn workspace() -> Workspace {
    let dir = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace path");
    Workspace { _dir: dir, root }
}

fn write_extract(workspace: &Workspace, content: &str) -> Utf8PathBuf {
    let path = workspace.root.join("chicago.osm");
    fs::write(path.as_std_path(), content).expect("write extract");
    path
}

fn args(osm: Utf8PathBuf, database: Utf8PathBuf) -> ConvertArgs {
    ConvertArgs {
        osm: Some(osm),
        database: Some(database),
        ..ConvertArgs::default()
    }
}

fn count(database: &Utf8Path, table: &str) -> i64 {
    let connection = Connection::open(database.as_std_path()).expect("open database");
    connection
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .expect("count rows")
}

#[rstest]
fn convert_pipeline_writes_tables(workspace: Workspace) {
    let osm = write_extract(&workspace, EXTRACT);
    let database = workspace.root.join("artefacts/chicago.sqlite3");

    let report = run_convert(args(osm, database.clone())).expect("pipeline should succeed");
    assert_eq!(report.nodes, 1);
    assert_eq!(report.ways, 1);

    assert_eq!(count(&database, "nodes"), 1);
    assert_eq!(count(&database, "nodes_tags"), 2);
    assert_eq!(count(&database, "ways"), 1);
    assert_eq!(count(&database, "ways_nodes"), 3);
    assert_eq!(count(&database, "ways_tags"), 1);

    let connection = Connection::open(database.as_std_path()).expect("open database");
    let street: (String, String) = connection
        .query_row(
            "SELECT type, key FROM nodes_tags WHERE value = 'North Lincoln Avenue'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .expect("read street tag");
    assert_eq!(street, ("addr".to_owned(), "street".to_owned()));
}

#[rstest]
fn convert_pipeline_honours_default_tag_type(workspace: Workspace) {
    let osm = write_extract(&workspace, EXTRACT);
    let database = workspace.root.join("plain.sqlite3");
    let mut convert_args = args(osm, database.clone());
    convert_args.default_tag_type = Some("plain".into());

    run_convert(convert_args).expect("pipeline should succeed");

    let connection = Connection::open(database.as_std_path()).expect("open database");
    let building: String = connection
        .query_row("SELECT type FROM ways_tags WHERE key = 'building'", [], |row| {
            row.get(0)
        })
        .expect("read building tag");
    assert_eq!(building, "plain");
}

#[rstest]
fn convert_pipeline_reports_malformed_input(workspace: Workspace) {
    let osm = write_extract(&workspace, &EXTRACT.replacen(r#" uid="26299""#, "", 1));
    let database = workspace.root.join("broken.sqlite3");

    let err = run_convert(args(osm, database.clone())).expect_err("missing uid should fail");
    match err {
        CliError::Convert { source, .. } => assert!(
            matches!(*source, osm2sql_data::ConvertError::Shape(_)),
            "unexpected conversion error {source:?}"
        ),
        other => panic!("expected a conversion error, got {other:?}"),
    }
    assert_eq!(count(&database, "nodes"), 0, "failed runs commit nothing");
}

#[rstest]
fn convert_pipeline_rejects_missing_input(workspace: Workspace) {
    let err = run_convert(args(
        workspace.root.join("absent.osm"),
        workspace.root.join("out.sqlite3"),
    ))
    .expect_err("missing input should fail");
    assert!(
        matches!(err, CliError::MissingSourceFile { field: ARG_OSM, .. }),
        "unexpected error {err:?}"
    );
}
