//! # Map Dump
//!
//! Command-line tool that loads a map file through the staged pipeline and
//! prints what came out.

use std::process::ExitCode;

use gbmp::{LoadEvent, LoaderConfig, Stage, StagedPipeline};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn usage() {
    println!("Usage: gbmp_dump <map_file> [options]");
    println!();
    println!("Options:");
    println!("  --config <file>  Loader configuration (TOML)");
    println!("  --verbose        Log every chunk and batch");
    println!("  --batches        Print vertex counts per tile batch");
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args[1].starts_with("--") {
        usage();
        return ExitCode::from(2);
    }

    let map_path = &args[1];
    let verbose = args.iter().any(|a| a == "--verbose");
    let show_batches = args.iter().any(|a| a == "--batches");
    let config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1));

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: could not install logger: {e}");
    }

    let config = match config_path {
        Some(path) => {
            let source = match std::fs::read_to_string(path) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Error: could not read config {path}: {e}");
                    return ExitCode::FAILURE;
                }
            };
            match LoaderConfig::from_toml_str(&source) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Error: {e}");
                    return ExitCode::FAILURE;
                }
            }
        }
        None => LoaderConfig::default(),
    };

    println!("Loading map: {map_path}");
    let bytes = match std::fs::read(map_path) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error: could not open file: {e}");
            return ExitCode::FAILURE;
        }
    };

    let pipeline = match StagedPipeline::new(&bytes, &config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut current: Option<Stage> = None;
    for event in pipeline {
        let event = match event {
            Ok(ev) => ev,
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        };

        if let Some(progress) = event.progress() {
            if current != Some(progress.stage) {
                current = Some(progress.stage);
                println!("{} ...", progress.text);
            }
        }

        match event {
            LoadEvent::Batch { batch, .. } if show_batches => {
                println!(
                    "  tile ({}, {}): {} vertices",
                    batch.tile_x,
                    batch.tile_y,
                    batch.vertex_count()
                );
            }
            LoadEvent::Finished(summary) => {
                println!();
                println!("Chunks:            {}", summary.chunks);
                println!("Batches:           {}", summary.batches);
                println!("Non-empty batches: {}", summary.non_empty_batches);
                println!("Vertices:          {}", summary.vertices);
                println!("Triangles:         {}", summary.vertices / 3);
            }
            _ => {}
        }
    }

    ExitCode::SUCCESS
}
