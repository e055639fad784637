use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};

fn testdata_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../testdata")
        .join(name)
}

fn cli() -> Command {
    Command::cargo_bin("rig-retarget").expect("binary")
}

#[test]
fn resolve_prints_base_and_side() {
    cli()
        .args(["resolve", "DEF-forearm_fk.L", "head", "thigh_R"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DEF-forearm_fk.L\tbase=forearm_fk\tside=L\tprefix=DEF-"))
        .stdout(predicate::str::contains("head\tbase=head\tside=-\tprefix=-"))
        .stdout(predicate::str::contains("thigh_R\tbase=thigh\tside=R"));
}

#[test]
fn resolve_requires_a_name() {
    cli().arg("resolve").assert().failure();
}

#[test]
fn scaffold_writes_skeleton_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("rig.json");
    cli()
        .arg("scaffold")
        .arg(testdata_path("mapping.json"))
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("1 scattered"));

    let raw = std::fs::read_to_string(&out).expect("read");
    let export: serde_json::Value = serde_json::from_str(&raw).expect("json");
    let bones = export["bones"].as_array().expect("bones");
    assert_eq!(bones[0]["name"], "root");
    assert!(bones.iter().any(|b| b["name"] == "DEF-hand.R"));
}

#[test]
fn check_passes_on_fixture() {
    cli()
        .arg("check")
        .arg(testdata_path("mapping.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("unbound\tLeftShoulder"))
        .stdout(predicate::str::contains("5 bound, 1 unbound, 0 unresolvable"));
}

#[test]
fn check_fails_on_unresolvable_entries() {
    let dir = tempfile::tempdir().expect("tempdir");
    let rig = dir.path().join("rig.json");
    std::fs::write(
        &rig,
        r#"{"bones": [{"name": "root", "head": [0, 0, 0], "tail": [0, 0, 0.1]}]}"#,
    )
    .expect("write rig");
    cli()
        .arg("check")
        .arg(testdata_path("mapping.json"))
        .arg("--skeleton")
        .arg(&rig)
        .arg("--json")
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"status\": \"unresolvable\""));
}

#[test]
fn check_reports_bad_mapping() {
    let dir = tempfile::tempdir().expect("tempdir");
    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, r#"{"Nose": {"collection": "face"}}"#).expect("write");
    cli()
        .arg("check")
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nose"));
}

#[test]
fn replay_writes_pose() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("pose.json");
    cli()
        .arg("replay")
        .arg(testdata_path("mapping.json"))
        .arg(testdata_path("recording.json"))
        .arg("--config")
        .arg(testdata_path("live.json"))
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("5 ticks, 3 applications"));

    let raw = std::fs::read_to_string(&out).expect("read");
    let pose: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert!(pose["head"]["properties"]["jaw_open"].is_number());
}
