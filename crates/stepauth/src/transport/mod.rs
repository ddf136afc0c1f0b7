//! Boundary to the HTTP stack: request/response types, the transport trait
//! and the session cookie jar it owns.

mod reqwest_client;

pub use reqwest_client::ReqwestTransport;

use crate::error::Result;
use crate::steps::HttpMethod;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// Outgoing request for one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    /// Header name -> value, names case-preserved.
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Set a header, replacing any header with the same name.
    pub fn set_header(&mut self, name: &str, value: &str) {
        match self
            .headers
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some(existing) => {
                existing.0 = name.to_string();
                existing.1 = value.to_string();
            }
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        lookup(&self.headers, name)
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = Some(body.into());
    }
}

/// Response received for one step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HttpResponse {
    pub status: u16,
    /// Headers in wire order; repeated names (`Set-Cookie`) appear repeatedly.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Cookies set by this response, in header order.
    ///
    /// Each `Set-Cookie` header has the form `name=value; attr1; attr2=val2`.
    /// Only the `name=value` portion is kept.
    pub fn cookies(&self) -> Vec<(String, String)> {
        let mut cookies = Vec::new();

        for (name, value) in &self.headers {
            if !name.eq_ignore_ascii_case("set-cookie") {
                continue;
            }

            let cookie_part = value.split(';').next().unwrap_or("");
            if let Some((cname, cvalue)) = cookie_part.split_once('=') {
                let cname = cname.trim();
                if !cname.is_empty() {
                    cookies.push((cname.to_string(), cvalue.trim().to_string()));
                }
            }
        }

        cookies
    }
}

/// A request and the response it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpExchange {
    pub request: HttpRequest,
    pub response: HttpResponse,
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
}

/// Cookie injected into the session jar after a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionCookie {
    /// `None` scopes the cookie to the request host.
    pub domain: Option<String>,
    pub name: String,
    pub value: String,
    pub path: String,
    pub max_age: u64,
    pub secure: bool,
}

impl SessionCookie {
    /// Render as a `Set-Cookie` header value.
    pub fn to_set_cookie(&self) -> String {
        let mut out = format!(
            "{}={}; Path={}; Max-Age={}",
            self.name, self.value, self.path, self.max_age
        );
        if let Some(domain) = &self.domain {
            out.push_str("; Domain=");
            out.push_str(domain);
        }
        if self.secure {
            out.push_str("; Secure");
        }
        out
    }
}

/// HTTP stack used by the engine.
///
/// Implementations own a session-scoped cookie jar: cookies set by
/// responses and cookies added through [`Transport::add_cookie`] are sent on
/// later requests to matching hosts.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and wait for the complete response.
    async fn send_and_receive(&self, request: HttpRequest) -> Result<HttpExchange>;

    /// Add a cookie to the session jar. `request_url` supplies the host
    /// when the cookie carries no domain.
    fn add_cookie(&self, request_url: &Url, cookie: &SessionCookie) -> Result<()>;
}

fn lookup<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }
}
