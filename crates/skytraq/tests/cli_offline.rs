#![cfg(feature = "cli")]

use std::process::{Command, Output};

fn skytraq(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_skytraq"))
        .args(["--log-level", "error"])
        .args(args)
        .env_remove("SKYTRAQ_PORT")
        .env_remove("SKYTRAQ_LOG")
        .output()
        .expect("skytraq should run")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn encode_prints_wire_bytes_as_json() {
    let output = skytraq(&["--format", "json", "encode", "0x09", "--payload", "0201"]);

    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_str(stdout(&output).trim()).expect("encode output should be JSON");
    assert_eq!(value["message_id"], 9);
    assert_eq!(value["length"], 3);
    assert_eq!(value["checksum"], 0x0A);
    assert_eq!(value["wire"], "a0a100030902010a0d0a");
}

#[test]
fn encode_pretty_spaces_bytes() {
    let output = skytraq(&["--format", "pretty", "encode", "2"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "a0 a1 00 01 02 02 0d 0a");
}

#[test]
fn decode_skips_leading_noise() {
    let output = skytraq(&[
        "--format",
        "json",
        "decode",
        "ff00a0a100030902010a0d0a",
    ]);

    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_str(stdout(&output).trim()).expect("decode output should be JSON");
    assert_eq!(value["message_id"], 9);
    assert_eq!(value["payload_len"], 2);
    assert_eq!(value["payload"], "0201");
    assert_eq!(value["source"], "-");
}

#[test]
fn decode_ack_names_the_message() {
    let output = skytraq(&["--format", "json", "decode", "a0a1000283098a0d0a"]);

    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_str(stdout(&output).trim()).expect("decode output should be JSON");
    assert_eq!(value["message_id"], 0x83);
    assert_eq!(value["message_name"], "ACK");
}

#[test]
fn decode_bad_checksum_returns_60() {
    let output = skytraq(&["decode", "a0a100030902010b0d0a"]);

    assert_eq!(output.status.code(), Some(60));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("checksum"));
}

#[test]
fn decode_without_marker_returns_124() {
    let output = skytraq(&["decode", "0102030405", "--max-sync-attempts", "4"]);

    assert_eq!(output.status.code(), Some(124));
}

#[test]
fn encode_bad_payload_hex_returns_64() {
    let output = skytraq(&["encode", "0x09", "--payload", "zz"]);

    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn send_to_missing_port_returns_3() {
    let port = format!("/dev/skytraq-missing-{}", std::process::id());
    let output = skytraq(&["send", "0x09", "--payload", "0201", "--port", &port]);

    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn invalid_session_config_returns_64() {
    let output = skytraq(&[
        "send",
        "0x09",
        "--port",
        "/dev/ttyUSB0",
        "--max-ack-attempts",
        "0",
    ]);

    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn version_prints_package_version() {
    let output = skytraq(&["version"]);

    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim(),
        format!("skytraq {}", env!("CARGO_PKG_VERSION"))
    );
}
