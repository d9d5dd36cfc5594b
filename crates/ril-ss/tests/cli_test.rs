//! ussdctl end-to-end tests, run as a subprocess.

use std::process::{Command, Output};

fn ussdctl(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ussdctl"))
        .args(args)
        .output()
        .expect("failed to run ussdctl")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_encode_fresh_request() {
    let output = ussdctl(&["encode", "*100#"]);
    assert!(output.status.success());

    let hex = stdout(&output);
    let hex = hex.trim();
    assert_eq!(hex.len(), 192 * 2);
    assert!(hex.starts_with("000f05aa180c3602"));
    assert!(hex[16..].chars().all(|c| c == '0'));
}

#[test]
fn test_encode_continuation() {
    let output = ussdctl(&["encode", "--session", "1", "1"]);
    assert!(output.status.success());
    assert!(stdout(&output).trim().starts_with("010f0131"));
}

#[test]
fn test_encode_too_long_fails() {
    let text = "x".repeat(300);
    let output = ussdctl(&["encode", &text]);
    assert!(!output.status.success());
}

#[test]
fn test_decode_notification() {
    let output = ussdctl(&["decode", "010f03594553"]);
    assert!(output.status.success());

    let out = stdout(&output);
    assert!(out.contains("\"1\""), "{}", out);
    assert!(out.contains("\"YES\""), "{}", out);
    assert!(out.contains("unknown"), "{}", out);
    assert!(out.contains("Fallback"), "{}", out);
}

#[test]
fn test_decode_short_frame_fails() {
    let output = ussdctl(&["decode", "02"]);
    assert!(!output.status.success());
}

#[test]
fn test_dcs_classification() {
    let output = ussdctl(&["dcs", "0x48"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "0x48: ucs2");

    let output = ussdctl(&["dcs", "15"]);
    assert_eq!(stdout(&output).trim(), "0x0F: unknown");
}
