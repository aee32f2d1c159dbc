#![allow(deprecated)] // Command::cargo_bin

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

const VALID_CONFIG: &str = r#"{
    "access_key_id": "LTAI5tExample",
    "access_key_secret": "s3cr3t",
    "region_id": "cn-hangzhou",
    "vpc_id": "vpc-bp1",
    "vswitch_id": "vsw-bp1",
    "security_group_id": "sg-bp1",
    "instance": { "user_data": "none" },
    "wait": { "timeout_secs": 5, "interval_secs": 1 }
}"#;

/// Command isolated from any config on the host
fn ecsflow(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ecsflow").unwrap();
    cmd.current_dir(dir)
        .env_remove("ECSFLOW_CONFIG_PATH")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"));
    cmd
}

/// Help lists every subcommand
#[test]
fn test_cli_help() {
    let temp_dir = tempfile::tempdir().unwrap();
    ecsflow(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("provision"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("wait"))
        .stdout(predicate::str::contains("--config"));
}

/// version prints the binary name
#[test]
fn test_cli_version() {
    let temp_dir = tempfile::tempdir().unwrap();
    ecsflow(temp_dir.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ecsflow"));
}

/// provision help shows the wait and JSON flags
#[test]
fn test_provision_help() {
    let temp_dir = tempfile::tempdir().unwrap();
    ecsflow(temp_dir.path())
        .args(["provision", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--timeout"))
        .stdout(predicate::str::contains("--interval"))
        .stdout(predicate::str::contains("--json"));
}

/// plan lists the ten steps without a config file
#[test]
fn test_plan_lists_steps_without_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    ecsflow(temp_dir.path())
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("10 steps"))
        .stdout(predicate::str::contains("create instance"))
        .stdout(predicate::str::contains("wait for instance to stop"))
        .stdout(predicate::str::contains(
            "associate secondary IP with network interface",
        ));
}

/// Unknown subcommands fail
#[test]
fn test_invalid_command() {
    let temp_dir = tempfile::tempdir().unwrap();
    ecsflow(temp_dir.path())
        .arg("invalid-command")
        .assert()
        .failure();
}

/// Missing config fails with the search locations
#[test]
fn test_provision_without_config_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    ecsflow(temp_dir.path())
        .arg("provision")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}

/// An empty required field is named in the error
#[test]
fn test_provision_with_incomplete_config_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    std::fs::write(
        temp_dir.path().join("config.json"),
        VALID_CONFIG.replace("sg-bp1", ""),
    )
    .unwrap();

    ecsflow(temp_dir.path())
        .arg("provision")
        .assert()
        .failure()
        .stderr(predicate::str::contains("security_group_id"));
}

/// A missing --config file is named in the error
#[test]
fn test_explicit_config_path_missing_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    std::fs::write(temp_dir.path().join("config.json"), VALID_CONFIG).unwrap();

    ecsflow(temp_dir.path())
        .args(["--config", "does-not-exist.json", "status", "i-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.json"));
}

/// A stale ECSFLOW_CONFIG_PATH falls through to discovery
#[test]
fn test_stale_config_env_falls_back_to_discovery() {
    let temp_dir = tempfile::tempdir().unwrap();
    std::fs::write(temp_dir.path().join("config.json"), VALID_CONFIG).unwrap();

    // Reaching status validation proves the config was loaded
    ecsflow(temp_dir.path())
        .env("ECSFLOW_CONFIG_PATH", temp_dir.path().join("gone.json"))
        .args(["wait", "i-1", "exploded"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown instance status"));
}

/// wait rejects a status name it does not know
#[test]
fn test_wait_rejects_unknown_status() {
    let temp_dir = tempfile::tempdir().unwrap();
    std::fs::write(temp_dir.path().join("ecsflow.json"), VALID_CONFIG).unwrap();

    ecsflow(temp_dir.path())
        .args(["wait", "i-1", "exploded"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown instance status"));
}

#[cfg(unix)]
mod with_stub_cli {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Fake `aliyun` that fails on AttachNetworkInterface and logs each API name
    const STUB: &str = r#"#!/bin/sh
echo "$2" >> "$(dirname "$0")/calls.log"
case "$2" in
  CreateInstance) echo '{"RequestId":"r1","InstanceId":"i-1"}' ;;
  DescribeInstances) echo '{"TotalCount":1,"Instances":{"Instance":[{"InstanceId":"i-1","Status":"Stopped"}]}}' ;;
  AllocateEipAddress) echo '{"RequestId":"r2","AllocationId":"eip-1","EipAddress":"47.0.0.1"}' ;;
  CreateNetworkInterface) echo '{"RequestId":"r3","NetworkInterfaceId":"eni-1"}' ;;
  AttachNetworkInterface)
    echo "ERROR: SDK.ServerError ErrorCode: InvalidOperation.InvalidEniState" >&2
    exit 1
    ;;
  *) echo '{"RequestId":"r4"}' ;;
esac
"#;

    /// Working dir with a config and the stub first on PATH
    fn stubbed(dir: &Path) -> Command {
        let bin_dir = dir.join("bin");
        std::fs::create_dir(&bin_dir).unwrap();
        let stub = bin_dir.join("aliyun");
        std::fs::write(&stub, STUB).unwrap();
        std::fs::set_permissions(&stub, std::fs::Permissions::from_mode(0o755)).unwrap();
        std::fs::write(dir.join("config.json"), VALID_CONFIG).unwrap();

        let mut paths = vec![bin_dir];
        if let Some(path) = std::env::var_os("PATH") {
            paths.extend(std::env::split_paths(&path));
        }

        let mut cmd = ecsflow(dir);
        cmd.env("PATH", std::env::join_paths(paths).unwrap());
        cmd
    }

    fn calls(dir: &Path) -> Vec<String> {
        std::fs::read_to_string(dir.join("bin").join("calls.log"))
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// A step 5 failure exits 1 and lists the failed step and created resources
    #[test]
    fn test_attach_failure_exits_with_diagnostic() {
        let temp_dir = tempfile::tempdir().unwrap();

        stubbed(temp_dir.path())
            .arg("provision")
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("step 5/10"))
            .stderr(predicate::str::contains("attach network interface to instance"))
            .stderr(predicate::str::contains("i-1"))
            .stderr(predicate::str::contains("eni-1"))
            .stderr(predicate::str::contains("eip-1"));

        let calls = calls(temp_dir.path());
        assert_eq!(calls.last().map(String::as_str), Some("AttachNetworkInterface"));
        assert_eq!(calls.iter().filter(|c| *c == "AllocateEipAddress").count(), 1);
        assert!(!calls.iter().any(|c| c == "StartInstance"));
        assert!(!calls.iter().any(|c| c == "AssociateEipAddress"));
    }

    /// With --json the failure report goes to stdout as JSON
    #[test]
    fn test_attach_failure_json_report() {
        let temp_dir = tempfile::tempdir().unwrap();

        let output = stubbed(temp_dir.path())
            .args(["provision", "--json"])
            .assert()
            .failure()
            .code(1)
            .get_output()
            .stdout
            .clone();

        let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(report["failed_step"], "attach_network_interface");
        assert_eq!(report["step_number"], 5);
        assert_eq!(report["timed_out"], false);
        assert_eq!(report["context"]["instance_id"], "i-1");
        assert_eq!(report["context"]["network_interface_id"], "eni-1");
        assert_eq!(report["context"]["primary_ip"]["allocation_id"], "eip-1");
        assert!(report["context"]["secondary_ip"].is_null());
    }
}
