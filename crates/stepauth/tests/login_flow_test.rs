//! End-to-end login sequences against a mock server over the reqwest transport.

use stepauth::config::{
    ParamValues, AUTHENTICATION_STEPS, DYNAMIC_PARAMETER_NAMES, LOGIN_URLS, POST_DATA,
};
use stepauth::steps::{source_from_params, DeclarativeSteps};
use stepauth::{AuthError, Authenticator, EngineOptions, ReqwestTransport};
use wiremock::matchers::{body_string, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn engine() -> Authenticator<ReqwestTransport> {
    let options = EngineOptions::default();
    let transport = ReqwestTransport::new(&options).expect("transport");
    Authenticator::new(transport, options)
}

const LOGIN_FORM: &str = r#"<html><body>
    <form method="post" action="/login">
        <input type="text" name="wpName" />
        <input type="password" name="wpPassword" />
        <input type="hidden" name="wpLoginToken" value="5f4dcc3b+\" />
    </form>
</body></html>"#;

#[tokio::test]
async fn test_session_bound_login_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", "wikisession=s1; Path=/; HttpOnly")
                .set_body_string(LOGIN_FORM),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(header("cookie", "wikisession=s1"))
        .and(body_string(
            "wpName=admin&wpPassword=secret&wpLoginToken=5f4dcc3b+\\&wikisession=s1",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"<li id="pt-logout">Log out</li>"#))
        .expect(1)
        .mount(&server)
        .await;

    let steps = serde_json::json!([
        {
            "url": format!("{}/login", server.uri()),
            "method": "GET",
            "parameters": "wpLoginToken;wikisession"
        },
        {
            "url": format!("{}/login", server.uri()),
            "method": "POST",
            "postData": "wpName=admin&wpPassword=secret&wpLoginToken={wpLoginToken}"
        }
    ]);

    let source = DeclarativeSteps::new(steps.to_string());
    let outcome = engine().run_source(&source).await.expect("login");

    assert_eq!(outcome.exchange.response.status, 200);
    assert!(outcome.exchange.response.body.contains("pt-logout"));
    assert_eq!(outcome.parameters.get("wpLoginToken"), Some("5f4dcc3b+\\"));
    assert_eq!(outcome.parameters.get("wikisession"), Some("s1"));
    assert_eq!(outcome.steps.len(), 2);
}

#[tokio::test]
async fn test_injected_cookie_and_header_reach_next_step() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"data": {"token": "t-42", "csrf": "c-7"}}"#),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/home"))
        .and(header("cookie", "auth=t-42"))
        .and(header("x-csrf-token", "c-7"))
        .respond_with(ResponseTemplate::new(200).set_body_string("dashboard"))
        .mount(&server)
        .await;

    let steps = serde_json::json!([
        {
            "url": format!("{}/api/token", server.uri()),
            "method": "GET",
            "parameters": "data.token; data.csrf",
            "additionalCookies": "auth={data.token}"
        },
        {
            "url": format!("{}/home", server.uri()),
            "method": "GET",
            "additionalHeaders": "X-CSRF-Token: {data.csrf}"
        }
    ]);

    let options = EngineOptions {
        append_policy: stepauth::AppendPolicy::BodyOnly,
        ..EngineOptions::default()
    };
    let transport = ReqwestTransport::new(&options).expect("transport");
    let engine = Authenticator::new(transport, options);

    let outcome = engine
        .run_source(&DeclarativeSteps::new(steps.to_string()))
        .await
        .expect("login");

    assert_eq!(outcome.exchange.response.status, 200);
    assert_eq!(outcome.exchange.response.body, "dashboard");
    assert_eq!(outcome.steps[0].cookies_injected, vec!["auth"]);
}

#[tokio::test]
async fn test_cookie_domain_differs_from_step_host() {
    let server = MockServer::start().await;
    let port = server.address().port();

    Mock::given(method("GET"))
        .and(path("/sso"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/home"))
        .and(header("cookie", "auth=tok"))
        .respond_with(ResponseTemplate::new(200).set_body_string("signed in"))
        .expect(1)
        .mount(&server)
        .await;

    // Step 1 runs on 127.0.0.1 but scopes its cookie to localhost.
    let steps = serde_json::json!([
        {
            "url": format!("http://127.0.0.1:{port}/sso"),
            "method": "GET",
            "additionalCookies": "auth=tok",
            "cookieDomain": "localhost"
        },
        {
            "url": format!("http://localhost:{port}/home"),
            "method": "GET"
        }
    ]);

    let outcome = engine()
        .run_source(&DeclarativeSteps::new(steps.to_string()))
        .await
        .expect("login");

    assert_eq!(outcome.steps[0].cookies_injected, vec!["auth"]);
    assert_eq!(outcome.exchange.response.status, 200);
    assert_eq!(outcome.exchange.response.body, "signed in");
}

#[tokio::test]
async fn test_url_list_from_host_params() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"<input name="nonce" value="n1">"#))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/signin"))
        .and(body_string_contains("nonce=n1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"data": {"sessionID": "abc123"}}"#),
        )
        .mount(&server)
        .await;

    let params = ParamValues::new()
        .with(
            LOGIN_URLS,
            format!("GET {0}/signin; POST {0}/signin", server.uri()),
        )
        .with(POST_DATA, "user=admin&nonce={nonce}")
        .with(DYNAMIC_PARAMETER_NAMES, "nonce; sessionID");

    let source = source_from_params(&params).expect("source");
    assert_eq!(source.label(), "url-list");

    let outcome = engine().run_source(source.as_ref()).await.expect("login");
    assert_eq!(outcome.parameters.get("sessionID"), Some("abc123"));
    assert_eq!(outcome.exchange.request.body.as_deref(), Some("user=admin&nonce=n1"));
}

#[tokio::test]
async fn test_final_exchange_is_last_step_even_on_failure_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
        .mount(&server)
        .await;

    let params = ParamValues::new().with(
        AUTHENTICATION_STEPS,
        serde_json::json!([
            {"url": format!("{}/a", server.uri()), "method": "GET"},
            {"url": format!("{}/b", server.uri()), "method": "GET"}
        ])
        .to_string(),
    );

    let source = source_from_params(&params).expect("source");
    let outcome = engine().run_source(source.as_ref()).await.expect("run");
    assert_eq!(outcome.exchange.response.status, 403);
    assert_eq!(outcome.exchange.request.url.path(), "/b");
}

#[tokio::test]
async fn test_unreachable_host_aborts() {
    let steps = r#"[{"url": "http://127.0.0.1:9/login", "method": "GET"}]"#;
    let err = engine()
        .run_source(&DeclarativeSteps::new(steps))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Transport(_)));
    assert!(!err.is_config());
}

#[tokio::test]
async fn test_config_error_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let steps = serde_json::json!([
        {"url": format!("{}/a", server.uri()), "method": "GET"},
        {"url": format!("{}/b", server.uri()), "method": "TELEPORT"}
    ]);
    let err = engine()
        .run_source(&DeclarativeSteps::new(steps.to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidMethod(_)));
}
