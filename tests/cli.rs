use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("searchdeck").expect("binary exists");
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn displays_help() {
    let mut cmd = cargo_bin();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Live demo deck"));
}

#[test]
fn displays_version() {
    let mut cmd = cargo_bin();
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn lists_sections_and_commands() {
    let temp = assert_fs::TempDir::new().unwrap();
    let mut cmd = cargo_bin();
    cmd.current_dir(temp.path()).arg("list");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("demo-basic-search"))
        .stdout(predicate::str::contains("full-power-query"));
}

#[test]
fn errors_on_unknown_command() {
    let temp = assert_fs::TempDir::new().unwrap();
    let mut cmd = cargo_bin();
    cmd.current_dir(temp.path()).args(["run", "no-such-command"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unknown command: no-such-command"));
}

#[test]
fn parse_prints_recognised_fields() {
    let temp = assert_fs::TempDir::new().unwrap();
    let mut cmd = cargo_bin();
    cmd.current_dir(temp.path()).args([
        "parse",
        "curl -X PATCH 'http://localhost:7700/indexes/tx/settings' -H 'Content-Type: application/json' -d '{\"a\":1}'",
    ]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"method\": \"PATCH\""))
        .stdout(predicate::str::contains("\"body\": \"{\\\"a\\\":1}\""))
        .stdout(predicate::str::contains("/indexes/tx/settings"));
}

#[test]
fn exports_authored_command_to_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let mut cmd = cargo_bin();
    cmd.current_dir(temp.path())
        .args(["export", "js-fetch", "index-csv", "--out", "upload.js"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));

    temp.child("upload.js")
        .assert(predicate::str::contains("fileData // loaded from csv file"));
}

#[test]
fn exports_curl_string_to_stdout_keeping_body_order() {
    let temp = assert_fs::TempDir::new().unwrap();
    let mut cmd = cargo_bin();
    cmd.current_dir(temp.path()).args([
        "export",
        "js-fetch",
        "--curl",
        "curl -X POST http://h/x -d '{\"q\": \"\", \"limit\": 2}'",
    ]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("fetch(\"http://h/x\""))
        .stdout(predicate::str::is_match(r#"(?s)"q": "",\s+"limit": 2"#).unwrap());
}

#[test]
fn export_rejects_unknown_template() {
    let temp = assert_fs::TempDir::new().unwrap();
    let mut cmd = cargo_bin();
    cmd.current_dir(temp.path())
        .args(["export", "python", "--curl", "curl http://localhost:7700/health"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unknown export template: python"));
}

#[test]
fn runs_command_against_configured_server() {
    let temp = assert_fs::TempDir::new().unwrap();
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/indexes/transactions_json/search")
            .query_param("q", "payment")
            .header("authorization", "Bearer from-config");
        then.status(200)
            .header("content-type", "application/json")
            .body("{\"hits\":[],\"estimatedTotalHits\":0}");
    });

    temp.child("searchdeck.json")
        .write_str(&format!(
            "{{\"baseUrl\":\"{}\",\"apiKey\":\"from-config\"}}",
            server.base_url()
        ))
        .unwrap();

    let mut cmd = cargo_bin();
    cmd.current_dir(temp.path())
        .args(["run", "search-payment", "--preview", "16"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("GET"))
        .stdout(predicate::str::contains("Status: 200"));

    mock.assert();
}

#[test]
fn run_json_output_uses_flat_result_shape() {
    let temp = assert_fs::TempDir::new().unwrap();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/indexes/transactions_csv/search");
        then.status(400)
            .header("content-type", "application/json")
            .body("{\"code\":\"invalid_search_filter\"}");
    });

    let mut cmd = cargo_bin();
    cmd.current_dir(temp.path())
        .args(["run", "filter-high-risk", "--json", "--base-url"])
        .arg(server.base_url());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"commandId\": \"filter-high-risk\""))
        .stdout(predicate::str::contains("\"success\": false"))
        .stdout(predicate::str::contains("\"status\": 400"))
        .stdout(predicate::str::contains("processingTimeMs"));
}

#[test]
fn health_reports_status_through_exit_code() {
    let temp = assert_fs::TempDir::new().unwrap();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(200).body("{\"status\":\"available\"}");
    });

    let mut cmd = cargo_bin();
    cmd.current_dir(temp.path())
        .arg("health")
        .arg("--base-url")
        .arg(server.base_url());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("connected"));

    let mut cmd = cargo_bin();
    cmd.current_dir(temp.path())
        .args(["health", "--base-url", "http://127.0.0.1:9"]);
    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("unreachable"));
}
