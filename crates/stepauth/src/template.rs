//! `{name}` placeholder substitution for body, header and cookie templates.

use crate::params::ParameterStore;

/// Render a template against the current parameters.
///
/// Every `{name}` token whose parameter is set is replaced, then every set
/// parameter whose value still does not occur in the result is appended as
/// `&name=<url-encoded value>`. An empty template is returned unchanged.
pub fn render(template: &str, params: &ParameterStore) -> String {
    render_with(template, params, true)
}

/// Render a template, optionally skipping the trailing-append pass.
pub fn render_with(template: &str, params: &ParameterStore, append_missing: bool) -> String {
    if template.is_empty() {
        return String::new();
    }

    let mut rendered = substitute(template, params);
    if append_missing {
        append_unreferenced(&mut rendered, params);
    }
    rendered
}

/// Replace every `{name}` occurrence, iterating parameters in store order.
pub fn substitute(template: &str, params: &ParameterStore) -> String {
    let mut out = template.to_string();
    for (name, value) in params.iter_set() {
        let token = format!("{{{name}}}");
        if out.contains(&token) {
            out = out.replace(&token, value);
        }
    }
    out
}

/// Append `&name=value` for set parameters absent from `rendered`.
///
/// A value counts as present in raw or url-encoded form, so rendering an
/// already rendered body does not append twice.
fn append_unreferenced(rendered: &mut String, params: &ParameterStore) {
    for (name, value) in params.iter_set() {
        let encoded = urlencoding::encode(value);
        if rendered.contains(value) || rendered.contains(encoded.as_ref()) {
            continue;
        }
        rendered.push('&');
        rendered.push_str(name);
        rendered.push('=');
        rendered.push_str(&encoded);
    }
}

/// Names of `{name}` tokens in a template that have no value yet.
pub fn unresolved_tokens<'a>(template: &'a str, params: &ParameterStore) -> Vec<&'a str> {
    let mut found = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else { break };
        let name = &after[..close];
        if !name.is_empty() && !name.contains('{') && params.get(name).is_none() && !found.contains(&name) {
            found.push(name);
        }
        rest = &after[close + 1..];
    }
    found
}
