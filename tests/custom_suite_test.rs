use anyhow::Result;
use cms_probe::domain::model::CheckStatus;
use cms_probe::{ProbeEngine, RunSettings, SuiteConfig};
use httpmock::prelude::*;
use serde_json::json;

const LEAD_LOOKUP_SUITE: &str = r#"
[suite]
name = "lead-lookup"

[suite.default_headers]
X-Probe = "cms-probe"

[[checks]]
name = "submit"
method = "POST"
path = "/api/contact"
capture = { lead_id = "/id" }

[checks.body]
name = "Probe"
tags = ["probe", "acceptance"]

[[checks]]
name = "lookup"
path = "/api/leads/{{lead_id}}"
depends_on = ["submit"]
query = { include = "notes", source = "probe-{{lead_id}}" }

[[checks.assert]]
pointer = "/id"
equals_var = "lead_id"

[[checks.assert]]
pointer = "/email"
exists = false
"#;

#[tokio::test]
async fn test_captured_value_flows_into_path_and_query() -> Result<()> {
    let server = MockServer::start();

    let submit_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/contact")
            .header("x-probe", "cms-probe")
            .json_body(json!({"name": "Probe", "tags": ["probe", "acceptance"]}));
        then.status(201).json_body(json!({"id": 17}));
    });
    let lookup_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/leads/17")
            .query_param("include", "notes")
            .query_param("source", "probe-17");
        then.status(200).json_body(json!({"id": 17, "name": "Probe"}));
    });

    let suite = SuiteConfig::from_toml_str(LEAD_LOOKUP_SUITE)?;
    let settings = RunSettings {
        base_url: server.base_url(),
        timeout_seconds: 5,
        stop_on_failure: false,
    };
    let summary = ProbeEngine::new(suite, settings).run().await?;

    assert_eq!(summary.passed, 2, "errors: {:?}", summary.errors);
    submit_mock.assert();
    lookup_mock.assert();
    Ok(())
}

#[tokio::test]
async fn test_unreachable_backend_is_a_failure_not_a_crash() -> Result<()> {
    let suite = SuiteConfig::from_toml_str(
        r#"
[suite]
name = "offline"

[[checks]]
name = "health"
path = "/api/health"

[[checks]]
name = "courses"
path = "/api/courses"
"#,
    )?;
    let settings = RunSettings {
        base_url: "http://127.0.0.1:1".to_string(),
        timeout_seconds: 2,
        stop_on_failure: false,
    };
    let summary = ProbeEngine::new(suite, settings).run().await?;

    assert_eq!(summary.failed, 2);
    assert_eq!(summary.errors.len(), 2);
    assert!(summary.errors[0].starts_with("health: HTTP request failed"));
    assert_eq!(summary.exit_code(), 1);
    Ok(())
}

#[tokio::test]
async fn test_disabled_checks_are_not_sent() -> Result<()> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/courses");
        then.status(200).json_body(json!([]));
    });

    let suite = SuiteConfig::from_toml_str(
        r#"
[suite]
name = "disabled"

[[checks]]
name = "courses"
path = "/api/courses"
enabled = false
"#,
    )?;
    let settings = RunSettings {
        base_url: server.base_url(),
        timeout_seconds: 5,
        stop_on_failure: false,
    };
    let engine = ProbeEngine::new(suite, settings);
    assert!(engine.plan()[0].ends_with("(disabled)"));

    let summary = engine.run().await?;
    assert_eq!(summary.total, 0);
    assert_eq!(summary.exit_code(), 0);
    assert_eq!(mock.hits(), 0);
    Ok(())
}

#[tokio::test]
async fn test_missing_capture_fails_check() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/admin/login");
        then.status(200).json_body(json!({"access_token": "x"}));
    });

    let suite = SuiteConfig::builtin("cms")?.select(&["admin-login".to_string()])?;
    let settings = RunSettings {
        base_url: server.base_url(),
        timeout_seconds: 5,
        stop_on_failure: false,
    };
    let summary = ProbeEngine::new(suite, settings).run().await?;

    assert_eq!(summary.results[0].status, CheckStatus::Fail);
    assert!(summary.errors[0].contains("/token is missing"));
    Ok(())
}

#[tokio::test]
async fn test_check_header_replaces_suite_default() -> Result<()> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/leads").matches(|req| {
            let values: Vec<&str> = req
                .headers
                .iter()
                .flatten()
                .filter(|(name, _)| name.eq_ignore_ascii_case("authorization"))
                .map(|(_, value)| value.as_str())
                .collect();
            values == ["Bearer from-check"]
        });
        then.status(200).json_body(json!([]));
    });

    let suite = SuiteConfig::from_toml_str(
        r#"
[suite]
name = "header-override"

[suite.default_headers]
Authorization = "Bearer from-suite"

[[checks]]
name = "leads"
path = "/api/leads"
headers = { authorization = "Bearer from-check" }
"#,
    )?;
    let settings = RunSettings {
        base_url: server.base_url(),
        timeout_seconds: 5,
        stop_on_failure: false,
    };
    let summary = ProbeEngine::new(suite, settings).run().await?;

    assert_eq!(summary.passed, 1, "errors: {:?}", summary.errors);
    mock.assert();
    Ok(())
}
