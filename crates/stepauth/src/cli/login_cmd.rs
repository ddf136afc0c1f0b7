//! `stepauth steps|urls|params` — run one authentication sequence.

use crate::cli::output::{self, Styled};
use crate::cli::RunArgs;
use crate::config::{AppendPolicy, Credentials, EngineOptions};
use crate::engine::{Authenticator, LoginOutcome};
use crate::steps::StepSource;
use crate::transcript::Transcript;
use crate::transport::{HttpResponse, ReqwestTransport};
use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Caller-side verdict on the final response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginState {
    LoggedIn,
    LoggedOut,
    /// No pattern configured, or none matched.
    Unknown,
}

/// Compiled logged-in / logged-out patterns.
#[derive(Debug, Default)]
pub struct LoginCheck {
    logged_in: Option<Regex>,
    logged_out: Option<Regex>,
}

impl LoginCheck {
    pub fn new(logged_in: Option<&str>, logged_out: Option<&str>) -> Result<Self> {
        let compile = |p: Option<&str>| -> Result<Option<Regex>> {
            p.map(|p| Regex::new(p).with_context(|| format!("invalid pattern {p:?}")))
                .transpose()
        };
        Ok(Self {
            logged_in: compile(logged_in)?,
            logged_out: compile(logged_out)?,
        })
    }

    /// Match the response headers and body against the patterns.
    ///
    /// A logged-in match wins over a logged-out match.
    pub fn evaluate(&self, response: &HttpResponse) -> LoginState {
        let mut text = String::new();
        for (name, value) in &response.headers {
            text.push_str(name);
            text.push_str(": ");
            text.push_str(value);
            text.push_str("\r\n");
        }
        text.push_str("\r\n");
        text.push_str(&response.body);

        if self.logged_in.as_ref().is_some_and(|re| re.is_match(&text)) {
            LoginState::LoggedIn
        } else if self.logged_out.as_ref().is_some_and(|re| re.is_match(&text)) {
            LoginState::LoggedOut
        } else {
            LoginState::Unknown
        }
    }
}

/// Engine options from CLI flags.
pub fn engine_options(args: &RunArgs) -> EngineOptions {
    EngineOptions {
        append_policy: if args.body_only_append {
            AppendPolicy::BodyOnly
        } else {
            AppendPolicy::AllTemplates
        },
        request_timeout: Duration::from_secs(args.timeout),
        follow_redirects: args.follow_redirects,
        ..EngineOptions::default()
    }
}

/// Run a sequence and report it. Returns `false` when the run failed or the
/// final response was judged logged out.
pub async fn run(
    source: &dyn StepSource,
    credentials: Option<Credentials>,
    args: &RunArgs,
) -> Result<bool> {
    let s = Styled::new();
    let start = Instant::now();
    let check = LoginCheck::new(args.logged_in.as_deref(), args.logged_out.as_deref())?;

    let mut transcript = match &args.transcript {
        Some(path) => {
            let path = path.clone().unwrap_or_else(Transcript::default_path);
            Some(Transcript::open(&path)?)
        }
        None => None,
    };

    if !output::is_quiet() && !output::is_json() {
        output::print_header(&s);
        if let Some(creds) = &credentials {
            output::print_check(s.ok_sym(), "User:", &creds.username);
        }
    }

    let transport = ReqwestTransport::new(&engine_options(args))?;
    let engine = Authenticator::new(transport, engine_options(args));
    let result = engine.run_source(source).await;

    match result {
        Ok(outcome) => {
            if let Some(t) = transcript.as_mut() {
                t.log_outcome(source.label(), &outcome)?;
            }
            let state = check.evaluate(&outcome.exchange.response);
            report_success(&s, source.label(), &outcome, state, start.elapsed());
            Ok(state != LoginState::LoggedOut)
        }
        Err(e) => {
            let elapsed = start.elapsed().as_millis() as u64;
            if let Some(t) = transcript.as_mut() {
                t.log_failure(source.label(), &e.to_string(), elapsed)?;
            }
            report_failure(&s, source.label(), &e.to_string(), e.is_config());
            Ok(false)
        }
    }
}

fn report_success(
    s: &Styled,
    source: &str,
    outcome: &LoginOutcome,
    state: LoginState,
    elapsed: Duration,
) {
    if output::is_json() {
        output::print_json(&serde_json::json!({
            "source": source,
            "state": state,
            "status": outcome.exchange.response.status,
            "parameters": outcome.parameters,
            "steps": outcome.steps,
            "elapsed_ms": elapsed.as_millis() as u64,
        }));
        return;
    }
    if output::is_quiet() {
        return;
    }

    for step in &outcome.steps {
        let sym = if step.status < 400 { s.ok_sym() } else { s.warn_sym() };
        output::print_check(
            sym,
            &format!("Step {}:", step.index),
            &format!("{} {} -> {} ({}ms)", step.method, step.url, step.status, step.elapsed_ms),
        );
        if output::is_verbose() {
            for p in &step.extracted {
                let value = outcome.parameters.get(&p.name).unwrap_or("");
                eprintln!(
                    "      {} {}",
                    s.dim(&format!("[{}]", p.strategy)),
                    output::truncate(&format!("{}={value}", p.name), 72)
                );
            }
        }
    }

    eprintln!();
    let verdict = match state {
        LoginState::LoggedIn => s.green("logged in"),
        LoginState::LoggedOut => s.red("logged out"),
        LoginState::Unknown => s.dim("not checked"),
    };
    eprintln!(
        "  {}: {} final status {} in {}ms",
        s.bold("Result"),
        verdict,
        outcome.exchange.response.status,
        elapsed.as_millis()
    );
}

fn report_failure(s: &Styled, source: &str, message: &str, is_config: bool) {
    let kind = if is_config { "config" } else { "transport" };
    if output::is_json() {
        output::print_json(&serde_json::json!({
            "source": source,
            "error": kind,
            "message": message,
        }));
        return;
    }
    eprintln!("  {} {message}", s.fail_sym());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response() -> HttpResponse {
        HttpResponse::new(200)
            .with_header("Set-Cookie", "sid=1")
            .with_body(r#"<a id="pt-logout" href="/logout">Log out</a>"#)
    }

    #[test]
    fn test_logged_in_pattern() {
        let check = LoginCheck::new(Some(r#"id="pt-logout""#), Some(r#"id="pt-login""#)).unwrap();
        assert_eq!(check.evaluate(&response()), LoginState::LoggedIn);
    }

    #[test]
    fn test_logged_out_pattern_matches_headers() {
        let check = LoginCheck::new(None, Some("(?i)set-cookie: sid=")).unwrap();
        assert_eq!(check.evaluate(&response()), LoginState::LoggedOut);
    }

    #[test]
    fn test_no_patterns() {
        assert_eq!(LoginCheck::default().evaluate(&response()), LoginState::Unknown);
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(LoginCheck::new(Some("("), None).is_err());
    }

    #[test]
    fn test_engine_options_from_flags() {
        let args = RunArgs {
            timeout: 7,
            follow_redirects: true,
            body_only_append: true,
            transcript: None,
            logged_in: None,
            logged_out: None,
        };
        let opts = engine_options(&args);
        assert_eq!(opts.append_policy, AppendPolicy::BodyOnly);
        assert_eq!(opts.request_timeout, Duration::from_secs(7));
        assert!(opts.follow_redirects);
        assert_eq!(opts.cookie_path, "/");
    }
}
