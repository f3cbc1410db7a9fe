use assert_cmd::prelude::*;
use std::process::Command;

#[test]
fn serve_http_refuses_non_loopback_without_public() {
    let data = tempfile::tempdir().unwrap();
    Command::new(assert_cmd::cargo::cargo_bin!("mindverse"))
        .arg("--data-dir")
        .arg(data.path())
        .args(["serve-http", "--bind", "0.0.0.0:0"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("Refusing to bind"));
}

#[test]
fn serve_http_rejects_unresolvable_bind() {
    let data = tempfile::tempdir().unwrap();
    Command::new(assert_cmd::cargo::cargo_bin!("mindverse"))
        .arg("--data-dir")
        .arg(data.path())
        .args(["serve-http", "--bind", "not an address"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("Failed to resolve bind address"));
}
