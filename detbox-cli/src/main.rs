use clap::Parser;
use detbox::{clip_boxes, nms, BoundingBox, Detection};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "DetBox CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
struct ClipConfigJson {
    width: usize,
    height: usize,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    input_path: String,
    output_path: Option<String>,
    iou_threshold: f32,
    clip: Option<ClipConfigJson>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: String::new(),
            output_path: None,
            iou_threshold: 0.3,
            clip: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct InputDoc {
    detections: Vec<[f32; 5]>,
}

#[derive(Debug, Serialize)]
struct KeptRecord {
    index: usize,
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    score: f32,
}

impl KeptRecord {
    fn new(index: usize, det: Detection) -> Self {
        Self {
            index,
            x1: det.bbox.x1,
            y1: det.bbox.y1,
            x2: det.bbox.x2,
            y2: det.bbox.y2,
            score: det.score,
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    count: usize,
    kept: Vec<usize>,
    detections: Vec<KeptRecord>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("detbox=debug".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.input_path.is_empty() {
        return Err("input_path must be set in the config".into());
    }
    if !config.iou_threshold.is_finite() {
        return Err("iou_threshold must be a finite number".into());
    }

    let input_text = fs::read_to_string(&config.input_path)?;
    let input: InputDoc = serde_json::from_str(&input_text)?;
    let rows: Vec<f32> = input.detections.into_iter().flatten().collect();
    let mut detections = Detection::parse_rows(&rows)?;

    if let Some(clip) = &config.clip {
        let mut boxes: Vec<BoundingBox> = detections.iter().map(|det| det.bbox).collect();
        clip_boxes(&mut boxes, clip.width, clip.height);
        for (det, bbox) in detections.iter_mut().zip(boxes) {
            det.bbox = bbox;
        }
    }

    let kept = nms(&detections, config.iou_threshold)?;
    let records = kept
        .iter()
        .map(|&index| KeptRecord::new(index, detections[index]))
        .collect();
    let output = Output {
        count: kept.len(),
        kept,
        detections: records,
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
