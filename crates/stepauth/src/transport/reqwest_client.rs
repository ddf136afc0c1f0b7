//! [`Transport`] over `reqwest` with a shared in-memory cookie jar.

use super::{HttpExchange, HttpRequest, HttpResponse, SessionCookie, Transport};
use crate::config::EngineOptions;
use crate::error::{AuthError, Result};
use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{redirect, Client, Method};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;
use url::Url;

/// reqwest-backed transport. Clones share the client and the cookie jar.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    jar: Arc<Jar>,
}

impl ReqwestTransport {
    /// Build a transport with a fresh cookie jar.
    pub fn new(options: &EngineOptions) -> Result<Self> {
        Self::with_jar(options, Arc::new(Jar::default()))
    }

    /// Build a transport around an existing jar, e.g. one shared with the
    /// client that later uses the authenticated session.
    pub fn with_jar(options: &EngineOptions, jar: Arc<Jar>) -> Result<Self> {
        let client = Client::builder()
            .timeout(options.request_timeout)
            .redirect(if options.follow_redirects {
                redirect::Policy::limited(10)
            } else {
                redirect::Policy::none()
            })
            .cookie_provider(Arc::clone(&jar))
            .build()?;

        Ok(Self { client, jar })
    }

    /// `Cookie` header the jar would send to `url`.
    pub fn cookie_header(&self, url: &Url) -> Option<String> {
        self.jar
            .cookies(url)
            .and_then(|v| v.to_str().ok().map(String::from))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send_and_receive(&self, request: HttpRequest) -> Result<HttpExchange> {
        let method = Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| AuthError::InvalidMethod(e.to_string()))?;

        let mut builder = self.client.request(method, request.url.clone());
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| AuthError::Config(format!("invalid header name {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| AuthError::Config(format!("invalid value for header {name}: {e}")))?;
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let start = Instant::now();
        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = resp.text().await?;
        let elapsed = start.elapsed();

        debug!(status, bytes = body.len(), "received response from {}", request.url);

        Ok(HttpExchange {
            request,
            response: HttpResponse {
                status,
                headers,
                body,
            },
            elapsed,
        })
    }

    fn add_cookie(&self, request_url: &Url, cookie: &SessionCookie) -> Result<()> {
        let target = cookie_url(request_url, cookie)?;
        self.jar.add_cookie_str(&cookie.to_set_cookie(), &target);

        // The jar drops cookies it refuses (domain mismatch, bad attributes)
        // without reporting; read it back to make sure it was stored.
        let mut check = target.clone();
        check.set_path(&cookie.path);
        let stored = self
            .cookie_header(&check)
            .map(|header| {
                header
                    .split("; ")
                    .any(|pair| pair.split_once('=') == Some((cookie.name.as_str(), cookie.value.as_str())))
            })
            .unwrap_or(false);

        if !stored {
            return Err(AuthError::Config(format!(
                "cookie {} was rejected for {}",
                cookie.name,
                target.host_str().unwrap_or_default()
            )));
        }
        Ok(())
    }
}

/// URL the cookie is stored against: the configured domain when present,
/// otherwise the request URL.
fn cookie_url(request_url: &Url, cookie: &SessionCookie) -> Result<Url> {
    let Some(domain) = cookie.domain.as_deref() else {
        return Ok(request_url.clone());
    };
    let raw = format!("{}://{}/", request_url.scheme(), domain.trim_start_matches('.'));
    Url::parse(&raw).map_err(|e| AuthError::InvalidUrl {
        url: raw,
        reason: e.to_string(),
    })
}
