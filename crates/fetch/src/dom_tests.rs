// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;

const PAGE: &str = r#"<html>
  <head><title>Listing</title></head>
  <body>
    <ul id="items"><li class="item">first</li><li class="item"> second </li></ul>
  </body>
</html>"#;

/// Serve one canned HTTP response on a local port and return its URL
fn serve_once(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut line = String::new();
        // Drain request headers
        loop {
            line.clear();
            if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                break;
            }
        }
        let mut stream = stream;
        write!(
            stream,
            "{}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        )
        .unwrap();
    });

    format!("http://{}/", addr)
}

#[test]
fn parse_and_select() {
    let doc = parse_dom(PAGE);

    let items = select_text(&doc, "li.item").unwrap();

    assert_eq!(items, vec!["first", "second"]);
    assert_eq!(select_text(&doc, "title").unwrap(), vec!["Listing"]);
}

#[test]
fn select_with_no_matches_is_empty() {
    let doc = parse_dom(PAGE);
    assert!(select_text(&doc, "table").unwrap().is_empty());
}

#[test]
fn invalid_selector_is_reported() {
    let doc = parse_dom(PAGE);
    let result = select_text(&doc, "li[");
    assert!(matches!(result, Err(FetchError::Selector(_))));
}

#[test]
fn fetch_parses_ok_response() {
    let url = serve_once("HTTP/1.1 200 OK", PAGE);

    let doc = fetch_dom(&url).unwrap();

    assert_eq!(select_text(&doc, "#items li").unwrap().len(), 2);
}

#[test]
fn fetch_rejects_non_200_status() {
    let url = serve_once("HTTP/1.1 404 Not Found", "<html>missing</html>");

    let result = fetch_dom(&url);

    assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
}

#[test]
fn fetch_rejects_other_success_codes() {
    let url = serve_once("HTTP/1.1 203 Non-Authoritative Information", PAGE);

    let result = fetch_dom(&url);

    assert!(matches!(result, Err(FetchError::Status { status: 203, .. })));
}

#[test]
fn fetch_reports_transport_failure() {
    // Bind then drop to get a port nothing listens on
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let result = fetch_dom(&format!("http://127.0.0.1:{}/", port));

    assert!(matches!(result, Err(FetchError::Transport { .. })));
}
