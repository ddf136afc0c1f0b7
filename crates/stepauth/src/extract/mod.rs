//! Pull a named value out of a step response.
//!
//! Strategies run in fixed order (response cookie, HTML input field, JSON
//! path) and the first non-empty value wins. A strategy that cannot parse
//! the response yields nothing and the chain moves on.

mod cookie;
mod html;
mod json;

pub use cookie::from_cookies;
pub use html::from_html_inputs;
pub use json::{from_json, parse_path, PathSegment};

use crate::steps::JsonLookup;
use crate::transport::HttpResponse;
use serde::Serialize;
use std::fmt;

/// Where a value was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Cookie,
    Html,
    Json,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::Cookie => "cookie",
            Strategy::Html => "html",
            Strategy::Json => "json",
        })
    }
}

/// A value found in a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extracted {
    pub value: String,
    pub strategy: Strategy,
}

/// Look up `name` in a response. `None` is an ordinary miss.
pub fn extract(response: &HttpResponse, name: &str, lookup: &JsonLookup) -> Option<Extracted> {
    let found = |value: Option<String>, strategy| {
        value
            .filter(|v| !v.is_empty())
            .map(|value| Extracted { value, strategy })
    };

    found(from_cookies(response, name), Strategy::Cookie)
        .or_else(|| found(from_html_inputs(&response.body, name), Strategy::Html))
        .or_else(|| {
            let path = match lookup {
                JsonLookup::ByName => name,
                JsonLookup::Fixed(path) => path.as_str(),
            };
            found(from_json(&response.body, path), Strategy::Json)
        })
}
