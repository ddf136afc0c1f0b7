//! URL-list steps: `METHOD url` entries sharing one set of templates.

use super::{non_empty, parse_url, split_names, AuthStep, JsonLookup, StepPlan, StepSource};
use crate::config::{
    ParamValues, ADDITIONAL_COOKIES, ADDITIONAL_HEADERS, DEFAULT_SESSION_JSON_PATH,
    DYNAMIC_PARAMETER_NAMES, LOGIN_URLS, POST_DATA, SESSION_JSON_PATH,
};
use crate::error::{AuthError, Result};
use crate::params::ParameterStore;

/// Steps given as `;`-delimited `METHOD url` entries.
///
/// Every step reuses the same body, header and cookie templates and extracts
/// the same pre-declared names. The JSON strategy reads one fixed path for
/// all of them.
#[derive(Debug, Clone)]
pub struct UrlListSteps {
    pub login_urls: String,
    pub post_data: Option<String>,
    pub dynamic_names: Vec<String>,
    pub additional_cookies: Option<String>,
    pub additional_headers: Option<String>,
    pub json_path: String,
}

impl UrlListSteps {
    pub fn new(login_urls: impl Into<String>) -> Self {
        Self {
            login_urls: login_urls.into(),
            post_data: None,
            dynamic_names: Vec::new(),
            additional_cookies: None,
            additional_headers: None,
            json_path: DEFAULT_SESSION_JSON_PATH.to_string(),
        }
    }

    pub fn from_params(params: &ParamValues) -> Result<Self> {
        let login_urls = params.require(LOGIN_URLS)?;
        let post_data = params.require(POST_DATA)?;

        Ok(Self {
            login_urls: login_urls.to_string(),
            post_data: Some(post_data.to_string()),
            dynamic_names: params
                .get(DYNAMIC_PARAMETER_NAMES)
                .map(split_names)
                .unwrap_or_default(),
            additional_cookies: non_empty(params.get(ADDITIONAL_COOKIES)),
            additional_headers: non_empty(params.get(ADDITIONAL_HEADERS)),
            json_path: params
                .get(SESSION_JSON_PATH)
                .unwrap_or(DEFAULT_SESSION_JSON_PATH)
                .trim()
                .to_string(),
        })
    }
}

/// Split one `METHOD url` entry on its first space.
fn parse_entry(entry: &str) -> Result<AuthStep> {
    let (method, url) = entry.split_once(' ').ok_or_else(|| {
        AuthError::Config(format!("login URL entry {entry:?} must be \"METHOD url\""))
    })?;
    Ok(AuthStep::new(method.parse()?, parse_url(url)?))
}

impl StepSource for UrlListSteps {
    fn label(&self) -> &'static str {
        "url-list"
    }

    fn required_params(&self) -> &'static [&'static str] {
        &[LOGIN_URLS, POST_DATA]
    }

    fn optional_params(&self) -> &'static [&'static str] {
        &[
            DYNAMIC_PARAMETER_NAMES,
            ADDITIONAL_COOKIES,
            ADDITIONAL_HEADERS,
            SESSION_JSON_PATH,
        ]
    }

    fn plan(&self) -> Result<StepPlan> {
        let mut steps = Vec::new();

        for entry in self.login_urls.split(';').map(str::trim) {
            if entry.is_empty() {
                continue;
            }

            let mut step = parse_entry(entry)?;
            step.post_body = non_empty(self.post_data.as_deref());
            step.additional_headers = non_empty(self.additional_headers.as_deref());
            step.additional_cookies = non_empty(self.additional_cookies.as_deref());
            step.extract = self.dynamic_names.clone();
            step.json_lookup = JsonLookup::Fixed(self.json_path.clone());
            steps.push(step);
        }

        if steps.is_empty() {
            return Err(AuthError::EmptySequence);
        }

        Ok(StepPlan {
            steps,
            parameters: ParameterStore::with_names(self.dynamic_names.iter().cloned()),
        })
    }
}
