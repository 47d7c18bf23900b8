//! `case-patch`: apply a JSON Patch to a document.
//!
//! Usage:
//!   case-patch '<patch-array-json>'
//!
//! The document is read from stdin. The patch operations are the first argument.

use std::io::{self, Read, Write};

use case_json_patch::cli::apply_json_patch;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let patch = match args.get(1) {
        Some(p) => p.clone(),
        None => {
            eprintln!("First argument must be a JSON patch array.");
            std::process::exit(1);
        }
    };

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    match apply_json_patch(buf.trim(), &patch) {
        Ok(result) => {
            let mut out = io::stdout();
            if writeln!(out, "{result}").is_err() {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
