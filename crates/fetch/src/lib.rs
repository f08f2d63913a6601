// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! hoard-fetch: fetch a web page and parse it into a DOM tree
//!
//! One blocking GET per call, no retries, no caching. Unrelated to the
//! storage engine; the two only share a workspace.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod dom;

pub use dom::{fetch_dom, parse_dom, select_text, FetchError};
pub use scraper::Html;
