use anyhow::Result;
use cms_probe::domain::model::CheckStatus;
use cms_probe::{ProbeEngine, RunSettings, SuiteConfig};
use httpmock::prelude::*;
use serde_json::json;

fn settings(server: &MockServer) -> RunSettings {
    let suite = SuiteConfig::builtin("maintenance").unwrap();
    RunSettings {
        base_url: server.base_url(),
        timeout_seconds: 5,
        stop_on_failure: suite.stop_on_failure(),
    }
}

fn mock_login_and_migrate(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/api/health");
        then.status(200).json_body(json!({"status": "healthy"}));
    });
    server.mock(|when, then| {
        when.method(POST).path("/api/admin/login");
        then.status(200).json_body(json!({"token": "maint-token"}));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/api/content/migrate")
            .header("authorization", "Bearer maint-token");
        then.status(200).json_body(json!({"migrated": 3}));
    });
}

#[tokio::test]
async fn test_sync_verification_passes_when_counts_match() -> Result<()> {
    let server = MockServer::start();
    mock_login_and_migrate(&server);

    let sync_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/admin/force-sync")
            .header("authorization", "Bearer maint-token");
        then.status(200).json_body(json!({"visible_courses": 2}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/courses");
        then.status(200).json_body(json!([{"slug": "a"}, {"slug": "b"}]));
    });

    let engine = ProbeEngine::new(SuiteConfig::builtin("maintenance")?, settings(&server));
    let summary = engine.run().await?;

    assert_eq!(summary.failed, 0, "errors: {:?}", summary.errors);
    assert_eq!(summary.passed, 5);
    sync_mock.assert();
    Ok(())
}

#[tokio::test]
async fn test_sync_verification_fails_on_count_mismatch() -> Result<()> {
    let server = MockServer::start();
    mock_login_and_migrate(&server);

    server.mock(|when, then| {
        when.method(POST).path("/api/admin/force-sync");
        then.status(200).json_body(json!({"visible_courses": 3}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/courses");
        then.status(200).json_body(json!([{"slug": "a"}, {"slug": "b"}]));
    });

    let engine = ProbeEngine::new(SuiteConfig::builtin("maintenance")?, settings(&server));
    let summary = engine.run().await?;

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.exit_code(), 1);
    assert!(summary.errors[0].contains("sync-verification"));
    assert!(summary.errors[0].contains("has 2 items, expected 3"));
    Ok(())
}

#[tokio::test]
async fn test_stop_policy_skips_remaining_steps() -> Result<()> {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/api/health");
        then.status(503);
    });
    let login_mock = server.mock(|when, then| {
        when.method(POST).path("/api/admin/login");
        then.status(200).json_body(json!({"token": "maint-token"}));
    });

    let engine = ProbeEngine::new(SuiteConfig::builtin("maintenance")?, settings(&server));
    let summary = engine.run().await?;

    assert_eq!(summary.results[0].status, CheckStatus::Fail);
    assert_eq!(summary.results[0].http_status, Some(503));
    assert!(summary.results[1..].iter().all(|o| o.status == CheckStatus::Skip));
    assert_eq!(login_mock.hits(), 0);
    Ok(())
}
