//! Integration tests validating the suppression pipeline against a table of
//! ground-truth scenarios.
//!
//! Scenarios live in `tests/data/nms_scenarios.json` as packed detection rows
//! with an expected kept-index list, optionally clipping boxes to an image
//! before suppression.

use detbox::{clip_boxes, nms, BoundingBox, Detection};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    scenarios: Vec<Scenario>,
}

#[derive(Debug, Deserialize)]
struct Scenario {
    name: String,
    threshold: f32,
    detections: Vec<[f32; 5]>,
    expected_kept: Vec<usize>,
    #[serde(default)]
    clip: Option<ClipSpec>,
}

#[derive(Debug, Deserialize)]
struct ClipSpec {
    width: usize,
    height: usize,
}

fn scenarios_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/nms_scenarios.json")
}

fn run_scenario(scenario: &Scenario) -> Result<(), String> {
    let mut dets: Vec<Detection> = scenario
        .detections
        .iter()
        .map(|row| Detection::new(row[0], row[1], row[2], row[3], row[4]))
        .collect();

    if let Some(clip) = &scenario.clip {
        let mut boxes: Vec<BoundingBox> = dets.iter().map(|det| det.bbox).collect();
        clip_boxes(&mut boxes, clip.width, clip.height);
        for (det, bbox) in dets.iter_mut().zip(boxes) {
            det.bbox = bbox;
        }
    }

    let kept = nms(&dets, scenario.threshold).map_err(|e| format!("nms failed: {}", e))?;
    if kept != scenario.expected_kept {
        return Err(format!(
            "kept {:?}, expected {:?}",
            kept, scenario.expected_kept
        ));
    }
    Ok(())
}

#[test]
fn scenario_table_matches_expected_kept_sets() {
    let text = fs::read_to_string(scenarios_path()).expect("failed to read scenario table");
    let file: ScenarioFile = serde_json::from_str(&text).expect("failed to parse scenario table");
    assert!(!file.scenarios.is_empty());

    let mut failures: Vec<(String, String)> = vec![];
    for scenario in &file.scenarios {
        match run_scenario(scenario) {
            Ok(()) => println!("PASS: {}", scenario.name),
            Err(e) => {
                println!("FAIL: {} - {}", scenario.name, e);
                failures.push((scenario.name.clone(), e));
            }
        }
    }

    if !failures.is_empty() {
        for (name, error) in &failures {
            println!("  {}: {}", name, error);
        }
        panic!("{} scenario(s) failed", failures.len());
    }
}
