// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Blocking HTTP GET + HTML parse

use scraper::{Html, Selector};
use thiserror::Error;

/// Errors from fetching or querying a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: ureq::Error,
    },
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("invalid selector {0:?}")]
    Selector(String),
}

/// GET `url` and parse the body as an HTML document.
///
/// Any status other than 200 is an error.
pub fn fetch_dom(url: &str) -> Result<Html, FetchError> {
    let transport = |source: ureq::Error| FetchError::Transport {
        url: url.to_string(),
        source,
    };

    let start = std::time::Instant::now();
    let mut response = ureq::get(url)
        .config()
        .http_status_as_error(false)
        .build()
        .call()
        .map_err(transport)?;

    let status = response.status().as_u16();
    tracing::debug!(
        url,
        status,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "fetched"
    );
    if status != 200 {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    let body = response.body_mut().read_to_string().map_err(transport)?;
    Ok(parse_dom(&body))
}

/// Parse an HTML document
pub fn parse_dom(html: &str) -> Html {
    Html::parse_document(html)
}

/// Text content of every element matching the CSS selector `css`
pub fn select_text(doc: &Html, css: &str) -> Result<Vec<String>, FetchError> {
    let selector = Selector::parse(css).map_err(|_| FetchError::Selector(css.to_string()))?;
    Ok(doc
        .select(&selector)
        .map(|elem| elem.text().collect::<String>().trim().to_string())
        .collect())
}

#[cfg(test)]
#[path = "dom_tests.rs"]
mod tests;
