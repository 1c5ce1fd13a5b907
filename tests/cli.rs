use assert_cmd::Command;
use predicates::prelude::*;

fn corralctl() -> Command {
    let mut cmd = Command::cargo_bin("corralctl").unwrap();
    // Point the configuration away from the developer's home directory.
    cmd.env("CORRALCONFIG", "config/does-not-exist.json");
    cmd
}

#[test]
fn run_without_a_namespace_fails() {
    corralctl()
        .args(["run", "web", "--image", "nginx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("namespace is required"));
}

#[test]
fn run_rejects_a_malformed_host_port_mapping() {
    corralctl()
        .args([
            "run",
            "web",
            "--namespace",
            "default",
            "--hostport",
            "1:2:3:4",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid port mapping: 1:2:3:4"));
}

#[test]
fn run_rejects_a_non_numeric_port_token() {
    corralctl()
        .args(["run", "web", "--namespace", "default", "--nodeport", "http"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid port token `http`"));
}

#[test]
fn run_rejects_a_malformed_environment_entry() {
    corralctl()
        .args(["run", "web", "--namespace", "default", "--env", "oops"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid key/value pair `oops`"));
}
