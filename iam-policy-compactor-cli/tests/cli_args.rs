use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

const BIN: &str = "iam-policy-compactor";

const CATALOG: &str = r#"{
    "serviceMap": {
        "Amazon S3": {"StringPrefix": "s3", "Actions": ["GetObject", "PutObject", "ListBucket"]},
        "Amazon EC2": {"StringPrefix": "ec2", "Actions": ["DescribeInstances", "RunInstances"]}
    }
}"#;

const STORAGE_POLICY: &str = r#"{
    "Version": "2012-10-17",
    "Statement": [
        {"Effect": "Allow", "Action": "s3:*", "Resource": "*"},
        {"Effect": "Allow", "Action": "ec2:Run*", "Resource": "arn:aws:ec2:*:*:instance/*"}
    ]
}"#;

const WRITE_ONLY_POLICY: &str = r#"{
    "Version": "2012-10-17",
    "Statement": {"Effect": "Allow", "Action": ["s3:Put*", "ec2:RunInstances"], "Resource": "*"}
}"#;

/// Temp workspace with a catalog and a Policies directory
fn workspace(policies: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("policies.json"), CATALOG).unwrap();
    let policies_dir = temp_dir.path().join("Policies");
    std::fs::create_dir(&policies_dir).unwrap();
    for (name, content) in policies {
        std::fs::write(policies_dir.join(name), content).unwrap();
    }
    temp_dir
}

fn compactor(dir: &Path) -> Command {
    let mut command = Command::cargo_bin(BIN).unwrap();
    command
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("IAM_POLICY_COMPACTOR_ACCUMULATOR_SID");
    command
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn help_lists_subcommands() {
    let output = Command::new(env!("CARGO_BIN_EXE_iam-policy-compactor"))
        .arg("--help")
        .output()
        .expect("failed to run --help");
    let stdout = String::from_utf8_lossy(&output.stdout);

    for subcommand in ["compact", "expand", "read-only"] {
        assert!(stdout.contains(subcommand), "help was: {}", stdout);
    }
}

#[test]
fn compact_writes_three_policies_with_defaults() {
    let dir = workspace(&[("storage.json", STORAGE_POLICY)]);

    compactor(dir.path())
        .arg("compact")
        .assert()
        .success()
        .stdout(predicate::str::contains("adminPolicy.json"));

    let admin = read_json(&dir.path().join("adminPolicy.json"));
    assert_eq!(admin["Id"], "AdminPolicy");
    assert_eq!(admin["Statement"][0]["Sid"], "GenericAllowedActions");
    assert_eq!(admin["Statement"][0]["Action"], serde_json::json!(["s3:*"]));
    assert_eq!(admin["Statement"][1]["Sid"], "storage1");

    let detailed = read_json(&dir.path().join("adminLongPolicy.json"));
    assert_eq!(
        detailed["Statement"][0]["Action"],
        serde_json::json!(["s3:GetObject", "s3:ListBucket", "s3:PutObject"])
    );
    assert_eq!(
        detailed["Statement"][1]["Action"],
        serde_json::json!(["ec2:RunInstances"])
    );

    let read_only = read_json(&dir.path().join("readonlyPolicy.json"));
    assert_eq!(read_only["Id"], "ReadOnlyPolicy");
    assert_eq!(
        read_only["Statement"][0]["Action"],
        serde_json::json!(["s3:GetObject", "s3:ListBucket"])
    );
}

#[test]
fn compact_honours_flags_and_env() {
    let dir = workspace(&[("storage.json", STORAGE_POLICY)]);

    compactor(dir.path())
        .env("IAM_POLICY_COMPACTOR_ACCUMULATOR_SID", "FromEnv")
        .args([
            "compact",
            "--output-dir",
            "out",
            "--admin-policy-name",
            "SalesAdmin",
        ])
        .assert()
        .success();

    let admin = read_json(&dir.path().join("out/adminPolicy.json"));
    assert_eq!(admin["Id"], "SalesAdmin");
    assert_eq!(admin["Statement"][0]["Sid"], "FromEnv");
}

#[test]
fn compact_skips_read_only_file_when_nothing_reads() {
    let dir = workspace(&[("writer.json", WRITE_ONLY_POLICY)]);

    compactor(dir.path())
        .arg("compact")
        .assert()
        .success()
        .stderr(predicate::str::contains("No read-only actions"));

    assert!(dir.path().join("adminLongPolicy.json").exists());
    assert!(!dir.path().join("readonlyPolicy.json").exists());
}

#[test]
fn compact_without_catalog_fails() {
    let dir = workspace(&[("storage.json", STORAGE_POLICY)]);

    compactor(dir.path())
        .args(["compact", "--catalog", "missing.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing.json"));
}

#[test]
fn compact_with_invalid_policy_fails() {
    let dir = workspace(&[(
        "broken.json",
        r#"{"Statement": {"Effect": "Allow", "NotAction": "s3:*", "Resource": "*"}}"#,
    )]);

    compactor(dir.path())
        .arg("compact")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("NotAction"));
}

#[test]
fn expand_prints_detailed_policy() {
    let dir = workspace(&[("storage.json", STORAGE_POLICY)]);

    let output = compactor(dir.path())
        .args(["expand", "Policies/storage.json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let policy: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        policy["Statement"][0]["Action"],
        serde_json::json!(["s3:GetObject", "s3:ListBucket", "s3:PutObject"])
    );
    assert_eq!(policy["Statement"][1]["Resource"][0], "arn:aws:ec2:*:*:instance/*");
}

#[test]
fn read_only_prints_minimized_policy() {
    let dir = workspace(&[("storage.json", STORAGE_POLICY)]);

    let output = compactor(dir.path())
        .args(["read-only", "Policies/storage.json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let policy: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(policy["Id"], "ReadOnlyPolicy");
    assert_eq!(policy["Statement"].as_array().map(Vec::len), Some(1));
    assert_eq!(
        policy["Statement"][0]["Action"],
        serde_json::json!(["s3:GetObject", "s3:ListBucket"])
    );
}

#[test]
fn read_only_without_read_actions_exits_with_two() {
    let dir = workspace(&[("writer.json", WRITE_ONLY_POLICY)]);

    compactor(dir.path())
        .args(["read-only", "Policies/writer.json"])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("has no read-only actions"));
}
