//! Step model and the sources that produce normalized step sequences.
//!
//! Both configuration styles ([`DeclarativeSteps`] and [`UrlListSteps`])
//! compile down to the same [`StepPlan`], which is all the engine sees.

mod declarative;
mod url_list;

pub use declarative::DeclarativeSteps;
pub use url_list::UrlListSteps;

use crate::config::{ParamValues, AUTHENTICATION_STEPS, PASSWORD, USERNAME};
use crate::error::{AuthError, Result};
use crate::params::ParameterStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// HTTP verb of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            _ => Err(AuthError::InvalidMethod(s.trim().to_string())),
        }
    }
}

/// How the JSON strategy locates a parameter in a response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JsonLookup {
    /// The parameter name is itself a dotted path (`data.token`).
    ByName,
    /// Every parameter reads the same path, whatever its name.
    Fixed(String),
}

/// One request of an authentication sequence. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStep {
    pub method: HttpMethod,
    /// Sent literally; placeholders are never substituted into URLs.
    pub url: Url,
    pub post_body: Option<String>,
    pub additional_headers: Option<String>,
    pub additional_cookies: Option<String>,
    /// Names to extract from this step's response, in order.
    pub extract: Vec<String>,
    /// Domain of injected cookies; `None` uses the request host.
    pub cookie_domain: Option<String>,
    pub json_lookup: JsonLookup,
}

impl AuthStep {
    pub fn new(method: HttpMethod, url: Url) -> Self {
        Self {
            method,
            url,
            post_body: None,
            additional_headers: None,
            additional_cookies: None,
            extract: Vec::new(),
            cookie_domain: None,
            json_lookup: JsonLookup::ByName,
        }
    }
}

/// Ordered steps plus the parameter store they start from.
#[derive(Debug, Clone, Default)]
pub struct StepPlan {
    pub steps: Vec<AuthStep>,
    pub parameters: ParameterStore,
}

/// A configuration style that yields a [`StepPlan`].
pub trait StepSource {
    /// Short label used in logs.
    fn label(&self) -> &'static str;

    /// Host parameters that must be present.
    fn required_params(&self) -> &'static [&'static str];

    /// Host parameters that may be present.
    fn optional_params(&self) -> &'static [&'static str];

    /// Credential fields the host should collect.
    fn credential_params(&self) -> &'static [&'static str] {
        &[USERNAME, PASSWORD]
    }

    /// Build the normalized plan.
    fn plan(&self) -> Result<StepPlan>;
}

/// Pick the source matching a host parameter set.
///
/// `AuthenticationSteps` selects the declarative list, anything else is
/// read as a URL list.
pub fn source_from_params(params: &ParamValues) -> Result<Box<dyn StepSource>> {
    if params.contains(AUTHENTICATION_STEPS) {
        Ok(Box::new(DeclarativeSteps::from_params(params)?))
    } else {
        Ok(Box::new(UrlListSteps::from_params(params)?))
    }
}

/// Parse an absolute step URL.
pub(crate) fn parse_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    Url::parse(raw).map_err(|e| AuthError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Split a `;`-delimited name list, dropping blanks.
pub(crate) fn split_names(list: &str) -> Vec<String> {
    list.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Treat empty templates as absent.
pub(crate) fn non_empty(template: Option<&str>) -> Option<String> {
    template.filter(|t| !t.is_empty()).map(String::from)
}
