//! HTML strategy: the `value` of the first `<input>` with a matching `name`.

use scraper::{Html, Selector};

/// Scan `<input>` elements in document order.
///
/// Only the first element whose `name` matches is considered; if it has no
/// `value` the strategy yields nothing.
pub fn from_html_inputs(body: &str, name: &str) -> Option<String> {
    if body.is_empty() {
        return None;
    }

    let selector = Selector::parse("input").ok()?;
    let document = Html::parse_document(body);

    document
        .select(&selector)
        .find(|el| el.value().attr("name") == Some(name))
        .and_then(|el| el.value().attr("value"))
        .map(String::from)
}
