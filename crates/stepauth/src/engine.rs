//! Sequence driver: runs a [`StepPlan`] against a [`Transport`].
//!
//! For each step, in order: render templates from the current parameters,
//! send, extract the step's declared names from the response, merge them
//! into the store, then render and inject the step's cookies. The exchange
//! of the last step is the result; a transport failure aborts the run.

use crate::blocks::{parse_cookie_block, parse_header_block};
use crate::config::{AppendPolicy, EngineOptions};
use crate::error::{AuthError, Result};
use crate::extract::{extract, Strategy};
use crate::params::ParameterStore;
use crate::steps::{AuthStep, HttpMethod, StepPlan, StepSource};
use crate::template::{render_with, unresolved_tokens};
use crate::transport::{HttpExchange, HttpRequest, HttpResponse, SessionCookie, Transport};
use serde::Serialize;
use tracing::{debug, info, trace, warn};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Result of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    /// Exchange of the last step, for logged-in/logged-out checks.
    pub exchange: HttpExchange,
    /// Parameter values after the last step.
    pub parameters: ParameterStore,
    pub steps: Vec<StepReport>,
}

/// Summary of one executed step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    /// 1-based position in the sequence.
    pub index: usize,
    pub method: HttpMethod,
    pub url: String,
    pub status: u16,
    pub elapsed_ms: u64,
    pub extracted: Vec<ExtractedParam>,
    pub cookies_injected: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedParam {
    pub name: String,
    pub strategy: Strategy,
}

/// Runs authentication sequences over one transport.
pub struct Authenticator<T: Transport> {
    transport: T,
    options: EngineOptions,
}

impl<T: Transport> Authenticator<T> {
    pub fn new(transport: T, options: EngineOptions) -> Self {
        Self { transport, options }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Plan a source and run it.
    pub async fn run_source(&self, source: &dyn StepSource) -> Result<LoginOutcome> {
        let plan = source.plan()?;
        info!(
            source = source.label(),
            steps = plan.steps.len(),
            "starting authentication sequence"
        );
        self.run(plan).await
    }

    /// Execute every step in order and return the last exchange.
    pub async fn run(&self, plan: StepPlan) -> Result<LoginOutcome> {
        let StepPlan { steps, mut parameters } = plan;
        if steps.is_empty() {
            return Err(AuthError::EmptySequence);
        }

        let mut reports = Vec::with_capacity(steps.len());
        let mut last = None;

        for (i, step) in steps.iter().enumerate() {
            let index = i + 1;
            let request = build_request(step, &parameters, self.options.append_policy)?;

            match &request.body {
                Some(body) => {
                    info!(step = index, "sending {} request to {}", request.method, request.url);
                    trace!(step = index, "request body: {body}");
                }
                None => info!(step = index, "sending {} request to {}", request.method, request.url),
            }

            let exchange = self.transport.send_and_receive(request).await?;
            info!(
                step = index,
                status = exchange.response.status,
                "received response status code for authentication request"
            );

            let extracted = update_parameters(&mut parameters, step, &exchange.response);
            let cookies = self.inject_cookies(step, &parameters)?;

            reports.push(StepReport {
                index,
                method: step.method,
                url: step.url.to_string(),
                status: exchange.response.status,
                elapsed_ms: exchange.elapsed.as_millis() as u64,
                extracted,
                cookies_injected: cookies,
            });
            last = Some(exchange);
        }

        let exchange = last.ok_or(AuthError::EmptySequence)?;
        info!(
            status = exchange.response.status,
            "finished authentication sequence"
        );

        Ok(LoginOutcome {
            exchange,
            parameters,
            steps: reports,
        })
    }

    /// Render the step's cookie block and add each cookie to the jar.
    fn inject_cookies(&self, step: &AuthStep, params: &ParameterStore) -> Result<Vec<String>> {
        let cookies = render_cookies(step, params, &self.options)?;
        let mut names = Vec::with_capacity(cookies.len());
        for cookie in &cookies {
            debug!("injecting cookie {}={}", cookie.name, cookie.value);
            self.transport.add_cookie(&step.url, cookie)?;
            names.push(cookie.name.clone());
        }
        Ok(names)
    }
}

/// Build the request for a step from the current parameters.
///
/// Headers come from the rendered header block. A body is attached only to
/// POST steps whose rendered body is non-empty, with a form content type
/// unless the header block sets one. The URL is used as-is.
pub fn build_request(
    step: &AuthStep,
    params: &ParameterStore,
    policy: AppendPolicy,
) -> Result<HttpRequest> {
    let append_to_blocks = policy == AppendPolicy::AllTemplates;
    let mut request = HttpRequest::new(step.method, step.url.clone());

    if let Some(template) = step.additional_headers.as_deref() {
        let rendered = render_with(template, params, append_to_blocks);
        for (name, value) in parse_header_block(&rendered)? {
            request.set_header(&name, &value);
        }
    }

    if step.method == HttpMethod::Post {
        if let Some(template) = step.post_body.as_deref() {
            warn_unresolved(template, params);
            let body = render_with(template, params, true);
            if !body.is_empty() {
                if request.header("Content-Type").is_none() {
                    request.set_header("Content-Type", FORM_CONTENT_TYPE);
                }
                request.set_body(body);
            }
        }
    }

    Ok(request)
}

/// Extract the step's declared names and merge hits into the store.
///
/// Names are declared on first sight so the store keeps first-seen order.
/// Misses keep the previous value.
pub fn update_parameters(
    params: &mut ParameterStore,
    step: &AuthStep,
    response: &HttpResponse,
) -> Vec<ExtractedParam> {
    let mut extracted = Vec::new();

    for name in &step.extract {
        params.declare(name.as_str());
        match extract(response, name, &step.json_lookup) {
            Some(hit) => {
                debug!(strategy = %hit.strategy, "{name}={}", hit.value);
                params.merge(name, &hit.value);
                extracted.push(ExtractedParam {
                    name: name.clone(),
                    strategy: hit.strategy,
                });
            }
            None => warn!("parameter {name} not found in response from {}", step.url),
        }
    }

    extracted
}

/// Render the step's cookie block into session cookies.
pub fn render_cookies(
    step: &AuthStep,
    params: &ParameterStore,
    options: &EngineOptions,
) -> Result<Vec<SessionCookie>> {
    let Some(template) = step.additional_cookies.as_deref() else {
        return Ok(Vec::new());
    };

    let append = options.append_policy == AppendPolicy::AllTemplates;
    let rendered = render_with(template, params, append);

    Ok(parse_cookie_block(&rendered)?
        .into_iter()
        .map(|(name, value)| SessionCookie {
            domain: step.cookie_domain.clone(),
            name,
            value,
            path: options.cookie_path.clone(),
            max_age: options.cookie_max_age,
            secure: false,
        })
        .collect())
}

fn warn_unresolved(template: &str, params: &ParameterStore) {
    for name in unresolved_tokens(template, params) {
        if params.contains(name) {
            warn!("placeholder {{{name}}} has no value yet and is sent literally");
        }
    }
}
