//! `case-diff`: print the patch that turns one JSON document into another.
//!
//! Usage:
//!   case-diff <before.json> <after.json>

use std::io::{self, Write};

use case_json_patch::cli::diff_documents;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let (Some(before_path), Some(after_path)) = (args.get(1), args.get(2)) else {
        eprintln!("Usage: case-diff <before.json> <after.json>");
        std::process::exit(1);
    };

    let read = |path: &str| {
        std::fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("{path}: {e}");
            std::process::exit(1);
        })
    };
    let before = read(before_path);
    let after = read(after_path);

    match diff_documents(&before, &after) {
        Ok(patch) => {
            let mut out = io::stdout();
            if writeln!(out, "{patch}").is_err() {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
