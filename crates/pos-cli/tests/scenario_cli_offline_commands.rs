//! Scenario: commands that never touch the order service
//!
//! # Invariants under test
//!
//! 1. `config-hash` prints a 64-hex `config_hash=` line followed by the
//!    canonical JSON, and the hash moves when an overlay changes a value.
//! 2. `--api-url` takes part in the hash, so two URLs never share one.
//! 3. An invalid overlay is refused with a CONFIG_INVALID message.
//! 4. `estimate` reports pieces and minutes from the counter heuristic, and
//!    rejects items that are not on the menu.

use std::io::Write as _;

use assert_cmd::Command;
use predicates::prelude::*;

fn pos() -> Command {
    let mut cmd = Command::cargo_bin("pos-cli").unwrap();
    cmd.env_remove("POS_API_URL");
    cmd
}

fn hash_of(args: &[&str]) -> String {
    let out = pos().args(args).arg("config-hash").output().unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8(out.stdout).unwrap();
    let first = stdout.lines().next().unwrap();
    first.strip_prefix("config_hash=").unwrap().to_string()
}

#[test]
fn config_hash_prints_hash_and_json() {
    pos()
        .arg("config-hash")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^config_hash=[0-9a-f]{64}\n\{").unwrap())
        .stdout(predicate::str::contains("\"interval_ms\":3000"));
}

#[test]
fn overlay_and_api_url_change_the_hash() {
    let base = hash_of(&[]);
    assert_eq!(base, hash_of(&[]));

    let mut overlay = tempfile::NamedTempFile::new().unwrap();
    writeln!(overlay, "polling:\n  interval_ms: 1500").unwrap();
    let path = overlay.path().to_string_lossy().to_string();
    let overlaid = hash_of(&["--config", &path]);
    assert_ne!(base, overlaid);

    let a = hash_of(&["--api-url", "http://10.0.0.5:8000"]);
    let b = hash_of(&["--api-url", "http://10.0.0.6:8000"]);
    assert_ne!(a, b);
    assert_ne!(a, base);
}

#[test]
fn invalid_overlay_refused() {
    let mut overlay = tempfile::NamedTempFile::new().unwrap();
    writeln!(overlay, "polling:\n  interval_ms: 0").unwrap();
    pos()
        .args(["--config", &overlay.path().to_string_lossy(), "config-hash"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_INVALID"));
}

#[test]
fn estimate_uses_counter_heuristic() {
    // 16 pieces from the combos plus 2 for fries.
    pos()
        .args(["estimate", "--item", "2x Combo 8", "--item", "Fries"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pieces=18"))
        .stdout(predicate::str::contains("minutes=22"))
        .stdout(predicate::str::contains("total=₡19,500"));

    pos()
        .args(["estimate", "--item", "Personal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("minutes=15"));
}

#[test]
fn estimate_rejects_unknown_item() {
    pos()
        .args(["estimate", "--item", "Burger"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not on the menu"));
}
