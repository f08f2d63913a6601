//! Help output specs

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    let ws = Workspace::empty();

    ws.hoard()
        .args(&["--help"])
        .passes()
        .stdout_has("cell")
        .stdout_has("seq")
        .stdout_has("fetch");
}

#[test]
fn seq_help_lists_subcommands() {
    let ws = Workspace::empty();

    ws.hoard()
        .args(&["seq", "--help"])
        .passes()
        .stdout_has("push")
        .stdout_has("get")
        .stdout_has("len")
        .stdout_has("dump");
}

#[test]
fn unknown_command_fails() {
    let ws = Workspace::empty();

    ws.hoard().args(&["shelve"]).fails();
}
