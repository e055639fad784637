use approx::assert_relative_eq;
use nalgebra::Vector3;
use rig_retarget::live::{LandmarkRecording, LiveConfig, StopReason};
use rig_retarget::mapping::MappingDocument;
use rig_retarget::pipeline;
use rig_retarget::skeleton::build_scaffold;
use std::path::{Path, PathBuf};

fn testdata_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../testdata")
        .join(name)
}

fn load_mapping() -> MappingDocument {
    MappingDocument::load_json(testdata_path("mapping.json")).expect("load mapping")
}

#[test]
fn fixture_mapping_loads_with_legacy_entries() {
    let doc = load_mapping();
    assert_eq!(doc.len(), 6);
    assert_eq!(doc.bound_count(), 5);
    assert_eq!(doc.unbound_count(), 1);
    assert_eq!(doc.collections().into_iter().collect::<Vec<_>>(), ["face", "pose"]);

    let right = doc.get("RightWrist").expect("legacy entry");
    assert_eq!(right.bound_target(), Some("DEF-hand.R"));
    assert!(right.extra.contains_key("cgt_props"));
    assert!(!doc.get("LeftShoulder").expect("none entry").is_bound());
}

#[test]
fn fixture_scaffold_covers_every_reference() {
    let doc = load_mapping();
    let scaffold = build_scaffold(&doc).expect("scaffold");
    let skeleton = &scaffold.skeleton;
    assert!(skeleton.validate().is_ok());
    for name in doc.referenced_bones() {
        assert!(skeleton.contains(name), "missing `{name}`");
    }
    assert_eq!(scaffold.report.scattered, ["DEF-hand.R"]);
    assert!(scaffold.report.placed.iter().any(|b| b == "hand.L"));
    assert!(scaffold.report.discarded.is_empty());

    let chain = skeleton.chain_to_root("hand.L").expect("chain");
    assert_eq!(chain.last().copied(), Some("root"));
}

#[test]
fn fixture_check_is_clean_on_scaffold_and_on_exported_rig() {
    let doc = load_mapping();
    let skeleton = pipeline::target_skeleton(&doc, None).expect("scaffold");
    let report = pipeline::check_mapping(&doc, &skeleton);
    assert!(report.is_clean(), "{report:?}");
    assert_eq!((report.bound, report.unbound), (5, 1));

    let dir = tempfile::tempdir().expect("tempdir");
    let rig = dir.path().join("rig.json");
    skeleton.write_json(&rig).expect("write rig");
    let imported = pipeline::target_skeleton(&doc, Some(&rig)).expect("import");
    assert_eq!(imported.len(), skeleton.len());
    assert_eq!(pipeline::check_mapping(&doc, &imported), report);
}

#[test]
fn fixture_replay_applies_on_configured_cadence() {
    let doc = load_mapping();
    let skeleton = pipeline::target_skeleton(&doc, None).expect("scaffold");
    let recording = LandmarkRecording::load_json(testdata_path("recording.json")).expect("recording");
    let config = LiveConfig::load_json(testdata_path("live.json")).expect("config");
    assert_eq!(recording.len(), 4);

    let out = pipeline::replay(doc, skeleton, recording, &config, false).expect("replay");
    assert_eq!(out.summary.ticks, 5);
    assert_eq!(out.summary.applications, 3);
    assert_eq!(out.summary.errors, 0);
    assert_eq!(out.summary.updates, 15);
    assert_eq!(out.summary.stop_reason, Some(StopReason::EndOfStream));

    let knee = out.pose.get("shin_fk.L").expect("knee pose");
    assert_relative_eq!(knee.location, Vector3::new(0.05, -0.4, 0.01), epsilon = 1e-5);
    let head = out.pose.get("head").expect("head pose");
    assert!(head.properties.contains_key("jaw_open"));
    assert!(out.pose.get("NONE").is_none());
}

#[test]
fn replay_output_round_trips_through_json() {
    let doc = load_mapping();
    let skeleton = pipeline::target_skeleton(&doc, None).expect("scaffold");
    let bones = skeleton.len();
    let recording = LandmarkRecording::load_json(testdata_path("recording.json")).expect("recording");
    let out = pipeline::replay(doc, skeleton, recording, &LiveConfig::default(), false).expect("replay");

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("pose.json");
    pipeline::write_json(&out.pose, &path).expect("write");
    let raw = std::fs::read_to_string(&path).expect("read");
    let back: rig_retarget::SkeletonPose = serde_json::from_str(&raw).expect("parse");
    assert_eq!(back.len(), bones);
}
