//! Sequence append/read specs

use crate::prelude::*;

#[test]
fn push_then_get_each_index() {
    let ws = Workspace::empty();

    ws.hoard()
        .args(&["seq", "--capacity", "2", "push", r#""0""#, r#""1""#, r#""2""#])
        .passes()
        .stdout_has("Pushed 3 (length 3)");

    ws.hoard()
        .args(&["seq", "--capacity", "2", "get", "0"])
        .passes()
        .stdout_eq("\"0\"\n");
    ws.hoard()
        .args(&["seq", "--capacity", "2", "get", "2"])
        .passes()
        .stdout_eq("\"2\"\n");
}

#[test]
fn push_spreads_over_chunk_files() {
    let ws = Workspace::empty();

    ws.hoard()
        .args(&["seq", "--capacity", "2", "--prefix", "test", "push", "1", "2", "3"])
        .passes();

    assert_eq!(ws.read("test_chunk_0.txt"), r#"["1","2"]"#);
    assert_eq!(ws.read("test_chunk_1.txt"), r#"["3"]"#);
    assert!(!ws.join("test_chunk_2.txt").exists());
}

#[test]
fn len_reports_length_and_chunks() {
    let ws = Workspace::empty();
    ws.hoard()
        .args(&["seq", "--capacity", "2", "push", "1", "2", "3"])
        .passes();

    ws.hoard()
        .args(&["seq", "--capacity", "2", "len"])
        .passes()
        .stdout_eq("Length: 3\nChunks: 2\n");
}

#[test]
fn get_past_end_fails() {
    let ws = Workspace::empty();
    ws.hoard()
        .args(&["seq", "push", "1"])
        .passes();

    ws.hoard()
        .args(&["seq", "get", "1"])
        .fails()
        .stderr_has("out of boundary");
}

#[test]
fn get_on_empty_sequence_fails() {
    let ws = Workspace::empty();

    ws.hoard()
        .args(&["seq", "get", "0"])
        .fails()
        .stderr_has("out of boundary");
}

#[test]
fn dump_prints_every_element_in_order() {
    let ws = Workspace::empty();
    ws.hoard()
        .args(&["seq", "--capacity", "3", "push", "1", r#"{"a":2}"#, "[3]", "4"])
        .passes();

    ws.hoard()
        .args(&["seq", "--capacity", "3", "dump"])
        .passes()
        .stdout_eq("1\n{\"a\":2}\n[3]\n4\n");
}

#[test]
fn seq_dir_that_is_a_file_fails() {
    let ws = Workspace::empty();
    ws.write("plain.txt", "");

    ws.hoard()
        .args(&["seq", "--dir", "plain.txt", "len"])
        .fails()
        .stderr_has("path is not a directory");
}
