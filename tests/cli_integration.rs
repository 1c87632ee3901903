//! CLI integration tests
//!
//! Tests argument handling of the `lotto-portal` binary and one full run
//! against a mock portal.

mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::pages;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

#[test]
fn test_version_flag() {
    let mut cmd = cargo_bin_cmd!("lotto-portal");
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_flag() {
    let mut cmd = cargo_bin_cmd!("lotto-portal");
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("buy-lotto"))
        .stdout(predicate::str::contains("buy-pension"))
        .stdout(predicate::str::contains("check-lotto"))
        .stdout(predicate::str::contains("session-id"));
}

#[test]
fn test_missing_session_id() {
    let mut cmd = cargo_bin_cmd!("lotto-portal");
    cmd.env_remove("LOTTO_PORTAL_SESSION_ID").arg("balance");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("session id"));
}

#[test]
fn test_invalid_manual_numbers() {
    let mut cmd = cargo_bin_cmd!("lotto-portal");
    cmd.args(["--session-id", "abc", "buy-lotto", "--numbers", "1,2,3"]);

    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--numbers"));
}

#[test]
fn test_invalid_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[network]\ntimeout_secs = \"soon\"").unwrap();

    let mut cmd = cargo_bin_cmd!("lotto-portal");
    cmd.arg("--config")
        .arg(file.path())
        .args(["--session-id", "abc", "balance"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config file"));
}

#[test]
fn test_config_loading_is_logged() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[network]\ntimeout_secs = 10").unwrap();

    let mut cmd = cargo_bin_cmd!("lotto-portal");
    cmd.env_remove("RUST_LOG")
        .env_remove("LOTTO_PORTAL_LOG_LEVEL")
        .env_remove("LOTTO_PORTAL_SESSION_ID")
        .arg("--verbose")
        .arg("--config")
        .arg(file.path())
        .arg("balance");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Loading configuration from"))
        .stderr(predicate::str::contains("Portal hosts"));
}

#[tokio::test]
async fn test_check_lotto_prints_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/myPage.do"))
        .respond_with(ResponseTemplate::new(200).set_body_string(pages::history(&[])))
        .expect(1)
        .mount(&server)
        .await;

    let base = server.uri();
    let assert = tokio::task::spawn_blocking(move || {
        let mut cmd = cargo_bin_cmd!("lotto-portal");
        for var in [
            "LOTTO_PORTAL_MAIN_URL",
            "LOTTO_PORTAL_ACCOUNT_URL",
            "LOTTO_PORTAL_LOTTO_URL",
            "LOTTO_PORTAL_PENSION_URL",
        ] {
            cmd.env(var, &base);
        }
        cmd.env("LOTTO_PORTAL_SESSION_ID", "K7dQx2VbN9pLmR4sT1wYz8HcJ3fGa6Ue.node01")
            .env_remove("HTTPS_PROXY")
            .env_remove("HTTP_PROXY")
            .env_remove("ALL_PROXY")
            .arg("check-lotto")
            .assert()
    })
    .await
    .unwrap();

    assert
        .success()
        .stdout(predicate::str::contains(r#""hasData": false"#))
        .stdout(predicate::str::contains(r#""product": "LOTTO""#));
}
