//! Apply a JSON change list to a PDF
//!
//! Reads a PDF and a change list from disk, applies the changes and writes the
//! result. Log output is controlled with `RUST_LOG`.
//!
//! Usage:
//!   cargo run --bin apply_changes -- input.pdf changes.json
//!   cargo run --bin apply_changes -- input.pdf changes.json --output edited.pdf
//!   cargo run --bin apply_changes -- input.pdf changes.json --config engine.json

use pdf_pagekit::api::{DocumentInput, PdfEngine};
use pdf_pagekit::EngineConfig;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

struct ToolConfig {
    input: PathBuf,
    changes: PathBuf,
    output: PathBuf,
    engine_config: Option<PathBuf>,
}

impl ToolConfig {
    fn from_args() -> Option<Self> {
        let args: Vec<String> = std::env::args().collect();
        let mut positional = Vec::new();
        let mut output = None;
        let mut engine_config = None;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--output" | "-o" => {
                    i += 1;
                    output = args.get(i).map(PathBuf::from);
                },
                "--config" => {
                    i += 1;
                    engine_config = args.get(i).map(PathBuf::from);
                },
                other => positional.push(PathBuf::from(other)),
            }
            i += 1;
        }

        if positional.len() != 2 {
            return None;
        }
        let changes = positional.pop()?;
        let input = positional.pop()?;
        let output = output.unwrap_or_else(|| input.with_extension("edited.pdf"));

        Some(Self {
            input,
            changes,
            output,
            engine_config,
        })
    }
}

fn run(config: &ToolConfig) -> Result<(), Box<dyn std::error::Error>> {
    let engine_config = match &config.engine_config {
        Some(path) => serde_json::from_str::<EngineConfig>(&fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };
    let engine = PdfEngine::new(engine_config);

    let bytes = fs::read(&config.input)?;
    let changes = fs::read_to_string(&config.changes)?;

    let (edited, report) = engine.apply_changes_json(DocumentInput::pdf(&bytes), &changes)?;
    fs::write(&config.output, edited)?;

    println!(
        "Applied {} change(s), skipped {} -> {}",
        report.applied,
        report.skipped,
        config.output.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let Some(config) = ToolConfig::from_args() else {
        eprintln!("Usage: apply_changes <input.pdf> <changes.json> [--output <out.pdf>] [--config <engine.json>]");
        return ExitCode::from(2);
    };

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        },
    }
}
