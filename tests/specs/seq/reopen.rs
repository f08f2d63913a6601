//! Sequence reopen specs
//!
//! Each CLI invocation opens the sequence from disk, so these verify the
//! directory scan.

use crate::prelude::*;

#[test]
fn existing_chunk_files_are_scanned_in_order() {
    let ws = Workspace::empty();
    ws.write("data_chunk_0.txt", r#"["1","2"]"#);
    ws.write("data_chunk_1.txt", r#"["3","4"]"#);
    ws.write("data_chunk_2.txt", r#"["5"]"#);

    ws.hoard()
        .args(&["seq", "--capacity", "2", "dump"])
        .passes()
        .stdout_eq("1\n2\n3\n4\n5\n");
}

#[test]
fn gap_truncates_and_reports_ignored_file() {
    let ws = Workspace::empty();
    ws.write("data_chunk_0.txt", r#"["1","2"]"#);
    ws.write("data_chunk_2.txt", r#"["5"]"#);

    ws.hoard()
        .args(&["seq", "--capacity", "2", "len"])
        .passes()
        .stdout_has("Length: 2\nChunks: 1\n")
        .stdout_has("Ignored:")
        .stdout_has("data_chunk_2.txt");
}

#[test]
fn strict_mode_rejects_gap() {
    let ws = Workspace::empty();
    ws.write("data_chunk_0.txt", r#"["1","2"]"#);
    ws.write("data_chunk_2.txt", r#"["5"]"#);

    ws.hoard()
        .args(&["seq", "--capacity", "2", "--strict", "len"])
        .fails()
        .stderr_has("chunk 1 is missing");
}

#[test]
fn push_after_reopen_continues_last_chunk() {
    let ws = Workspace::empty();
    ws.hoard()
        .args(&["seq", "--capacity", "2", "push", "1"])
        .passes();

    ws.hoard()
        .args(&["seq", "--capacity", "2", "push", "2", "3"])
        .passes();

    assert_eq!(ws.read("data_chunk_0.txt"), r#"["1","2"]"#);
    assert_eq!(ws.read("data_chunk_1.txt"), r#"["3"]"#);
}

#[test]
fn len_json_format() {
    let ws = Workspace::empty();
    ws.hoard()
        .args(&["seq", "push", "1"])
        .passes();

    ws.hoard()
        .args(&["seq", "--format", "json", "len"])
        .passes()
        .stdout_has("\"length\": 1")
        .stdout_has("\"chunks\": 1");
}
