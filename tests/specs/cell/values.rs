//! Cell value specs
//!
//! Verify a value set through the CLI is flushed to disk on exit.

use crate::prelude::*;

#[test]
fn set_then_show_roundtrips() {
    let ws = Workspace::empty();

    ws.hoard()
        .args(&["cell", "set", "state.txt", r#"{"msg":"hello"}"#])
        .passes()
        .stdout_has("Stored:");

    ws.hoard()
        .args(&["cell", "show", "state.txt"])
        .passes()
        .stdout_eq("{\"msg\":\"hello\"}\n");
}

#[test]
fn set_writes_encoded_value_only() {
    let ws = Workspace::empty();

    ws.hoard()
        .args(&["cell", "set", "nested/state.txt", "[1,2,3]"])
        .passes();

    assert_eq!(ws.read("nested/state.txt"), "[1,2,3]");
}

#[test]
fn set_overwrites_previous_value() {
    let ws = Workspace::empty();
    ws.write("state.txt", r#"{"msg":"a much longer previous value"}"#);

    ws.hoard()
        .args(&["cell", "set", "state.txt", "7"])
        .passes();

    assert_eq!(ws.read("state.txt"), "7");
}

#[test]
fn show_empty_file() {
    let ws = Workspace::empty();
    ws.write("state.txt", "");

    ws.hoard()
        .args(&["cell", "show", "state.txt"])
        .passes()
        .stdout_eq("(empty)\n");
}

#[test]
fn show_corrupt_file_fails() {
    let ws = Workspace::empty();
    ws.write("state.txt", "{not json");

    ws.hoard()
        .args(&["cell", "show", "state.txt"])
        .fails()
        .stderr_has("decode error");
}

#[test]
fn set_rejects_invalid_json() {
    let ws = Workspace::empty();

    ws.hoard()
        .args(&["cell", "set", "state.txt", "{oops"])
        .fails()
        .stderr_has("not valid JSON");
}

#[test]
fn set_on_directory_fails() {
    let ws = Workspace::empty();
    std::fs::create_dir_all(ws.join("folder")).unwrap();

    ws.hoard()
        .args(&["cell", "set", "folder", "1"])
        .fails()
        .stderr_has("path is a directory");
}
