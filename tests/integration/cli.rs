use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn inapp_update() -> Command {
    let mut cmd = Command::cargo_bin("inapp-update").unwrap();
    cmd.env_remove("INAPP_UPDATE_CONFIG").env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_compare_newer() {
    inapp_update()
        .args(["compare", "1.2-beta", "1.1.9"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is newer than"));
}

#[test]
fn test_compare_padded_versions_are_equal() {
    inapp_update()
        .args(["compare", "1.2", "1.2.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is not newer than"));
}

#[test]
fn test_check_without_app_id_fails() {
    inapp_update()
        .args(["check", "--installed", "1.0.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No app id"));
}

#[test]
fn test_invalid_config_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("update.toml");
    std::fs::write(&config, "lookup_timeout_ms = 0\n").unwrap();

    inapp_update()
        .arg("--config")
        .arg(&config)
        .args(["check", "--app-id", "1", "--installed", "1.0.0"])
        .assert()
        .failure();
}

#[tokio::test]
async fn test_check_opens_store_page_with_yes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lookup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "resultCount": 1,
            "results": [{ "version": "2.2.0" }]
        })))
        .mount(&server)
        .await;
    let endpoint = format!("{}/lookup?id={{id}}", server.uri());

    let assert = tokio::task::spawn_blocking(move || {
        inapp_update()
            .args(["check", "--app-id", "42", "--installed", "2.1.0", "--yes", "--endpoint"])
            .arg(&endpoint)
            .assert()
    })
    .await
    .unwrap();

    assert
        .success()
        .stdout(predicate::str::contains("https://apps.apple.com/app/id42"));
}

#[tokio::test]
async fn test_check_reports_up_to_date() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lookup"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "results": [{ "version": "2.1.0" }] })),
        )
        .mount(&server)
        .await;
    let endpoint = format!("{}/lookup?id={{id}}", server.uri());

    let assert = tokio::task::spawn_blocking(move || {
        inapp_update()
            .args(["check", "--app-id", "42", "--installed", "2.1.0", "--endpoint"])
            .arg(&endpoint)
            .assert()
    })
    .await
    .unwrap();

    assert.success().stdout(predicate::str::contains("is up to date"));
}
