//! Host-provided parameter set, credentials and engine options.

use crate::error::{AuthError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// JSON array of declarative steps.
pub const AUTHENTICATION_STEPS: &str = "AuthenticationSteps";
/// `;`-delimited `METHOD url` entries.
pub const LOGIN_URLS: &str = "LoginURLs";
/// Body template shared by every step of a URL list.
pub const POST_DATA: &str = "PostData";
/// `;`-delimited names declared before the first step.
pub const DYNAMIC_PARAMETER_NAMES: &str = "DynamicParameterNames";
pub const ADDITIONAL_COOKIES: &str = "AdditionalCookies";
pub const ADDITIONAL_HEADERS: &str = "AdditionalHeaders";
/// JSON path used by every URL-list step, defaults to [`DEFAULT_SESSION_JSON_PATH`].
pub const SESSION_JSON_PATH: &str = "SessionJsonPath";
pub const USERNAME: &str = "Username";
pub const PASSWORD: &str = "Password";

pub const DEFAULT_SESSION_JSON_PATH: &str = "data.sessionID";

/// Key-value parameters supplied by the host for one login configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamValues {
    values: IndexMap<String, String>,
}

impl ParamValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object of parameters.
    ///
    /// String values are taken as-is. Any other JSON value is stored as its
    /// serialized text, so `AuthenticationSteps` may be written as an inline
    /// array instead of an escaped string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: IndexMap<String, serde_json::Value> = serde_json::from_str(json)
            .map_err(|e| AuthError::Config(format!("parameter file is not a JSON object: {e}")))?;

        let values = raw
            .into_iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| match v {
                serde_json::Value::String(s) => (k, s),
                other => (k, other.to_string()),
            })
            .collect();

        Ok(Self { values })
    }

    /// Load parameters from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AuthError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_json_str(&content)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Value of a parameter, `None` when absent or empty.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Value of a required parameter.
    pub fn require(&self, name: &str) -> Result<&str> {
        self.get(name)
            .ok_or_else(|| AuthError::MissingParam(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Credentials carried alongside the parameters, if a username is set.
    pub fn credentials(&self) -> Option<Credentials> {
        let username = self.get(USERNAME)?;
        Some(Credentials::new(username, self.get(PASSWORD).unwrap_or("")))
    }
}

/// Username/password pair.
///
/// Opaque to the engine: templates that need credentials must spell them
/// out themselves.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Which rendered templates receive trailing `&name=value` pairs for
/// parameters they do not reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppendPolicy {
    /// Body, header and cookie templates alike.
    #[default]
    AllTemplates,
    /// POST bodies only.
    BodyOnly,
}

/// Tunables for one engine instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub append_policy: AppendPolicy,
    /// Path attribute of injected cookies.
    pub cookie_path: String,
    /// Max-Age of injected cookies, in seconds.
    pub cookie_max_age: u64,
    /// Per-request timeout of the HTTP transport.
    pub request_timeout: Duration,
    /// Whether the HTTP transport follows redirects.
    pub follow_redirects: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            append_policy: AppendPolicy::AllTemplates,
            cookie_path: "/".to_string(),
            cookie_max_age: 99_999_999,
            request_timeout: Duration::from_secs(30),
            follow_redirects: false,
        }
    }
}
