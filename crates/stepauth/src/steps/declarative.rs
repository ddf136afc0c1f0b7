//! Declarative step list: a JSON array of fully described steps.

use super::{non_empty, parse_url, split_names, AuthStep, JsonLookup, StepPlan, StepSource};
use crate::config::{ParamValues, AUTHENTICATION_STEPS};
use crate::error::{AuthError, Result};
use crate::params::ParameterStore;
use serde::Deserialize;

/// One step as written in `AuthenticationSteps`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStep {
    url: String,
    method: String,
    #[serde(default)]
    post_data: Option<String>,
    #[serde(default)]
    additional_headers: Option<String>,
    #[serde(default)]
    additional_cookies: Option<String>,
    /// `;`-delimited names to extract after this step.
    #[serde(default)]
    parameters: Option<String>,
    #[serde(default)]
    cookie_domain: Option<String>,
}

/// Steps configured individually, each with its own templates and
/// extraction list. JSON lookups use the parameter name as a dotted path.
#[derive(Debug, Clone)]
pub struct DeclarativeSteps {
    steps_json: String,
}

impl DeclarativeSteps {
    pub fn new(steps_json: impl Into<String>) -> Self {
        Self {
            steps_json: steps_json.into(),
        }
    }

    pub fn from_params(params: &ParamValues) -> Result<Self> {
        Ok(Self::new(params.require(AUTHENTICATION_STEPS)?))
    }
}

impl StepSource for DeclarativeSteps {
    fn label(&self) -> &'static str {
        "declarative"
    }

    fn required_params(&self) -> &'static [&'static str] {
        &[AUTHENTICATION_STEPS]
    }

    fn optional_params(&self) -> &'static [&'static str] {
        &[]
    }

    fn plan(&self) -> Result<StepPlan> {
        let raw: Vec<RawStep> = serde_json::from_str(&self.steps_json)
            .map_err(|e| AuthError::Config(format!("{AUTHENTICATION_STEPS} is not a valid step array: {e}")))?;

        if raw.is_empty() {
            return Err(AuthError::EmptySequence);
        }

        let steps = raw
            .into_iter()
            .map(|r| -> Result<AuthStep> {
                let mut step = AuthStep::new(r.method.parse()?, parse_url(&r.url)?);
                step.post_body = non_empty(r.post_data.as_deref());
                step.additional_headers = non_empty(r.additional_headers.as_deref());
                step.additional_cookies = non_empty(r.additional_cookies.as_deref());
                step.extract = r.parameters.as_deref().map(split_names).unwrap_or_default();
                step.cookie_domain = r
                    .cookie_domain
                    .map(|d| d.trim().to_string())
                    .filter(|d| !d.is_empty());
                step.json_lookup = JsonLookup::ByName;
                Ok(step)
            })
            .collect::<Result<Vec<_>>>()?;

        // Names enter the store as steps first mention them.
        Ok(StepPlan {
            steps,
            parameters: ParameterStore::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::HttpMethod;

    const STEPS: &str = r#"[
        {"url": "https://example.com/login", "method": "get", "parameters": "wpLoginToken; session"},
        {
            "url": "https://example.com/login",
            "method": "POST",
            "postData": "user=admin&token={wpLoginToken}",
            "additionalHeaders": "X-Requested-With: XMLHttpRequest",
            "additionalCookies": "",
            "cookieDomain": ".example.com",
            "parameters": null
        }
    ]"#;

    #[test]
    fn test_plan_from_json() {
        let plan = DeclarativeSteps::new(STEPS).plan().unwrap();
        assert_eq!(plan.steps.len(), 2);
        assert!(plan.parameters.is_empty());

        let first = &plan.steps[0];
        assert_eq!(first.method, HttpMethod::Get);
        assert_eq!(first.extract, vec!["wpLoginToken", "session"]);
        assert!(first.post_body.is_none());

        let second = &plan.steps[1];
        assert_eq!(second.method, HttpMethod::Post);
        assert_eq!(second.post_body.as_deref(), Some("user=admin&token={wpLoginToken}"));
        assert_eq!(second.additional_headers.as_deref(), Some("X-Requested-With: XMLHttpRequest"));
        assert!(second.additional_cookies.is_none());
        assert_eq!(second.cookie_domain.as_deref(), Some(".example.com"));
        assert!(second.extract.is_empty());
        assert_eq!(second.json_lookup, JsonLookup::ByName);
    }

    #[test]
    fn test_expressions_are_not_evaluated() {
        let err = DeclarativeSteps::new("[{url: 'x', method: 'GET'}]").plan().unwrap_err();
        assert!(matches!(err, AuthError::Config(_)));
    }

    #[test]
    fn test_empty_array_rejected() {
        assert!(matches!(
            DeclarativeSteps::new("[]").plan(),
            Err(AuthError::EmptySequence)
        ));
    }

    #[test]
    fn test_invalid_method_rejected() {
        let err = DeclarativeSteps::new(r#"[{"url": "https://example.com", "method": "BREW"}]"#)
            .plan()
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidMethod(_)));
    }

    #[test]
    fn test_missing_url_rejected() {
        let err = DeclarativeSteps::new(r#"[{"method": "GET"}]"#).plan().unwrap_err();
        assert!(matches!(err, AuthError::Config(_)));
    }

    #[test]
    fn test_registration_lists() {
        let source = DeclarativeSteps::new("[]");
        assert_eq!(source.required_params(), &[AUTHENTICATION_STEPS]);
        assert!(source.optional_params().is_empty());
        assert_eq!(source.credential_params(), &["Username", "Password"]);
    }
}
