//! E2E tests for the storefront-audit CLI

#![allow(deprecated)] // cargo_bin deprecation - will update when assert_cmd stabilizes replacement

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn storefront_audit() -> Command {
    Command::cargo_bin("storefront-audit").unwrap()
}

#[test]
fn test_help() {
    storefront_audit()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("audit"))
        .stdout(predicate::str::contains("check-url"));
}

#[test]
fn test_version() {
    storefront_audit()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("storefront-audit"));
}

#[test]
fn test_audit_help() {
    storefront_audit()
        .args(["audit", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--max-links"))
        .stdout(predicate::str::contains("--skip-links"))
        .stdout(predicate::str::contains("--concurrency"));
}

#[test]
fn test_audit_no_args() {
    storefront_audit()
        .arg("audit")
        .assert()
        .failure()
        .stderr(predicate::str::contains("STORE_URL"));
}

#[test]
fn test_audit_invalid_url() {
    storefront_audit()
        .args(["audit", "not-a-store"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid store URL"));
}

#[test]
fn test_concurrency_validation() {
    storefront_audit()
        .args(["audit", "--concurrency", "0", "https://shop.example"])
        .assert()
        .failure();

    storefront_audit()
        .args(["audit", "--concurrency", "21", "https://shop.example"])
        .assert()
        .failure();
}

#[test]
fn test_audit_unreachable_store_reports_no_pages() {
    storefront_audit()
        .args(["audit", "http://127.0.0.1:1", "--delay", "0"])
        .timeout(std::time::Duration::from_secs(60))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_pages\": 0"))
        .stderr(predicate::str::contains("No pages found"));
}

#[test]
fn test_audit_writes_yaml_report() {
    let dir = tempdir().unwrap();
    let report = dir.path().join("report.yaml");

    storefront_audit()
        .args(["audit", "http://127.0.0.1:1", "--delay", "0", "--format", "yaml", "--output"])
        .arg(&report)
        .timeout(std::time::Duration::from_secs(60))
        .assert()
        .success()
        .stderr(predicate::str::contains("Report saved"));

    let content = fs::read_to_string(&report).unwrap();
    assert!(content.contains("127.0.0.1:1"));
    assert!(content.contains("total_pages: 0"));
}

#[test]
fn test_check_url_connection_error() {
    storefront_audit()
        .args(["check-url", "http://127.0.0.1:1/pages/about"])
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"is_dead\":true"))
        .stdout(predicate::str::contains("Connection Error"));
}
