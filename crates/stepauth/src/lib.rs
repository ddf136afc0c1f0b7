//! stepauth — multi-step HTTP login sequences with dynamic parameters.
//!
//! A login is an ordered list of [`steps::AuthStep`]s. Each step's body,
//! header and cookie templates are rendered from a [`params::ParameterStore`]
//! before it is sent, and the names it declares are extracted from its
//! response (cookie, then HTML input, then JSON path) before the next step
//! runs. This handles login forms protected by session-bound CSRF tokens
//! that a single "get page, post form" request pair cannot.

pub mod blocks;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod params;
pub mod steps;
pub mod template;
pub mod transcript;
pub mod transport;

pub use config::{AppendPolicy, Credentials, EngineOptions, ParamValues};
pub use engine::{Authenticator, LoginOutcome, StepReport};
pub use error::{AuthError, Result};
pub use params::ParameterStore;
pub use steps::{AuthStep, DeclarativeSteps, HttpMethod, StepPlan, StepSource, UrlListSteps};
pub use transport::{HttpExchange, HttpRequest, HttpResponse, ReqwestTransport, Transport};
