use std::fs;

use inkgraph_app::{Args, SessionError, run};
use inkgraph_core::{Document, EditorSettings, Shape};

const SCRIPT: &str = r#"[
    { "tool": "Rectangle", "event": "left_down", "x": 0, "y": 0 },
    { "event": "left_down", "x": 80, "y": 60 },
    { "tool": "Line", "event": "left_down", "x": 200, "y": 200 },
    { "event": "left_down", "x": 300, "y": 200 },
    { "command": "select_all" },
    { "command": "group" }
]"#;

#[test]
fn test_run_saves_the_result() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("script.json");
    let out = dir.path().join("out.json");
    fs::write(&script, SCRIPT).unwrap();

    let args = Args {
        script,
        document: None,
        settings: None,
        out: Some(out.clone()),
    };
    let summary = pollster::block_on(run(args)).unwrap();
    assert_eq!(summary.events, 4);
    assert_eq!(summary.commands, 2);

    let document = Document::from_json(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(document.len(), 1);
    let Shape::Group(group) = &document.shapes[0] else {
        panic!("expected a group");
    };
    assert_eq!(group.shapes.len(), 2);
    assert_eq!(document.points.len(), 4);
}

#[test]
fn test_run_continues_a_document() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("script.json");
    let input = dir.path().join("input.json");
    let settings = dir.path().join("settings.json");
    let out = dir.path().join("result.json");

    let mut start = Document::new();
    start.add_point(kurbo::Point::new(500.0, 500.0), "default");
    fs::write(&input, start.to_json().unwrap()).unwrap();
    EditorSettings::default().save(&settings).unwrap();
    fs::write(&script, r#"[{ "command": "select_all" }, { "command": "delete" }]"#).unwrap();

    let args = Args {
        script,
        document: Some(input),
        settings: Some(settings),
        out: Some(out.clone()),
    };
    pollster::block_on(run(args)).unwrap();

    let document = Document::from_json(&fs::read_to_string(&out).unwrap()).unwrap();
    assert!(document.is_empty());
    assert!(document.points.is_empty());
}

#[test]
fn test_missing_script_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let args = Args {
        script: dir.path().join("absent.json"),
        document: None,
        settings: None,
        out: None,
    };
    assert!(matches!(pollster::block_on(run(args)), Err(SessionError::Io { .. })));
}
