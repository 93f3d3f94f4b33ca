//! Focused CLI argument parsing tests.
//!
//! Tests that verify command-line argument parsing and selection errors
//! without touching a radio.

#![allow(deprecated)] // Command::cargo_bin is deprecated but replacement requires newer assert_cmd

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn sidelobe() -> Command {
    let mut cmd = Command::cargo_bin("sidelobe").unwrap();
    cmd.arg("--no-color");
    cmd
}

fn run_in(dir: &TempDir) -> Command {
    let mut cmd = sidelobe();
    cmd.args(["run", "--project-dir", dir.path().to_str().unwrap()]);
    cmd
}

// ============================================================================
// Informational Commands
// ============================================================================

#[test]
fn version_command_succeeds() {
    sidelobe()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sidelobe"));
}

#[test]
fn version_flag_shows_version() {
    sidelobe()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sidelobe"));
}

#[test]
fn help_flag_shows_usage() {
    sidelobe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("802.15.4"));
}

#[test]
fn list_names_every_component() {
    sidelobe()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("loopback"))
        .stdout(predicate::str::contains("udp"))
        .stdout(predicate::str::contains("preamble-fill"))
        .stdout(predicate::str::contains("preamble-length"))
        .stdout(predicate::str::contains("random-payload"))
        .stdout(predicate::str::contains("received-frame"));
}

// ============================================================================
// Argument Parsing Errors (Missing Required Arguments)
// ============================================================================

#[test]
fn no_command_shows_help() {
    sidelobe()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn run_requires_all_three_names() {
    sidelobe()
        .args(["run", "-I", "loopback", "-G", "preamble-fill"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--harness"));
}

#[test]
fn summarize_requires_a_path() {
    sidelobe()
        .arg("summarize")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn target_pan_must_fit_two_bytes() {
    let dir = TempDir::new().unwrap();
    run_in(&dir)
        .args(["-I", "loopback", "-G", "preamble-fill", "-H", "received-frame"])
        .args(["--target-pan", "0x12345"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("two bytes"));
}

// ============================================================================
// Selection Errors (Distinct Exit Codes)
// ============================================================================

#[test]
fn unknown_interface_exits_10() {
    let dir = TempDir::new().unwrap();
    run_in(&dir)
        .args(["-I", "hackrf", "-G", "preamble-fill", "-H", "received-frame"])
        .assert()
        .code(10)
        .stderr(predicate::str::contains("hackrf"));
}

#[test]
fn unknown_rx_interface_exits_10() {
    let dir = TempDir::new().unwrap();
    run_in(&dir)
        .args(["-I", "loopback", "-G", "preamble-fill", "-H", "received-frame"])
        .args(["--rx-interface", "sniffer"])
        .assert()
        .code(10);
}

#[test]
fn unknown_generator_exits_11() {
    let dir = TempDir::new().unwrap();
    run_in(&dir)
        .args(["-I", "loopback", "-G", "bitflip", "-H", "received-frame"])
        .assert()
        .code(11)
        .stderr(predicate::str::contains("bitflip"));
}

#[test]
fn unknown_harness_exits_12() {
    let dir = TempDir::new().unwrap();
    run_in(&dir)
        .args(["-I", "loopback", "-G", "preamble-fill", "-H", "ack"])
        .assert()
        .code(12)
        .stderr(predicate::str::contains("ack"));
}

#[test]
fn interface_is_checked_before_generator() {
    let dir = TempDir::new().unwrap();
    run_in(&dir)
        .args(["-I", "hackrf", "-G", "bitflip", "-H", "ack"])
        .assert()
        .code(10);
}

#[test]
fn out_of_band_channel_is_rejected() {
    let dir = TempDir::new().unwrap();
    run_in(&dir)
        .args(["-I", "loopback", "-G", "preamble-fill", "-H", "received-frame"])
        .args(["--channel", "27"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("channel"));
}

#[test]
fn malformed_constraint_is_rejected() {
    let dir = TempDir::new().unwrap();
    run_in(&dir)
        .args(["-I", "loopback", "-G", "preamble-fill", "-H", "received-frame"])
        .args(["--constraint", "max_fill"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("key=value"));
}
