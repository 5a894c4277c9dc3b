// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! A small command-line front end to exercise the selector grammar and the
//! spec walker end to end, without writing a host program.
//!
//! ```bash
//! cargo run --bin refill-repl -- parse 'numbers|head(2)|selfie'
//! cargo run --bin refill-repl -- apply spec.json data.json
//! ```
//!

use clap::{Parser, Subcommand};
use refill::prelude::*;
use std::{fs, process::ExitCode};

#[derive(Parser)]
#[command(name = "refill-repl", about = "Parse selectors and apply specs from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse one selector string and pretty-print its AST.
    Parse {
        /// The selector string, e.g. `numbers|head(2)|selfie`.
        selector: String,
    },
    /// Apply a spec (JSON file) to a data document (JSON file) and print the result.
    Apply {
        /// Path to the spec JSON file.
        spec: String,
        /// Path to the data JSON file.
        data: String,
        /// Locale used by locale-aware filters (`format_number`, etc.).
        #[arg(long, default_value = "en_US")]
        locale: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Parse { selector } => run_parse(&selector),
        Command::Apply { spec, data, locale } => run_apply(&spec, &data, &locale),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_parse(selector: &str) -> Result<(), RefillError> {
    let ast = parse_selector(selector)?;
    println!("{ast:#?}");
    Ok(())
}

fn run_apply(spec_path: &str, data_path: &str, locale: &str) -> Result<(), RefillError> {
    let spec_src = fs::read_to_string(spec_path).map_err(|e| RefillError::SpecShape(format!("reading '{spec_path}': {e}")))?;
    let data_src = fs::read_to_string(data_path).map_err(|e| RefillError::SpecShape(format!("reading '{data_path}': {e}")))?;

    let spec = Spec::from_json(&spec_src)?;
    let data: serde_json::Value = serde_json::from_str(&data_src)?;

    let fetch = BlockingHttpFetch::default();
    let formatter = PlainFormatter;
    let ctx = EvalContext { filters: default_filters(), locale, fetch: &fetch, formatter: &formatter };

    let out = spec.apply(&data, &ctx)?;
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
