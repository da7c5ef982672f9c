// Probe files for the USDC crate magic header and section table.
// Run with: cargo run --release --bin usdc_probe -- [--json] [--config limits.json] <file>...

mod report;

use std::env;
use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use usdc_core::ReaderConfig;

use report::{probe_file, FileReport, Status};

/// Parsed command line.
#[derive(Debug)]
struct Options {
    json: bool,
    config: Option<PathBuf>,
    files: Vec<PathBuf>,
}

fn usage(program: &str) -> String {
    format!("Usage: {} [--json] [--config <limits.json>] <file>...", program)
}

fn parse_args(args: &[String]) -> Result<Options> {
    let program = args.first().map(String::as_str).unwrap_or("usdc_probe");
    let mut options = Options {
        json: false,
        config: None,
        files: Vec::new(),
    };

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--json" => options.json = true,
            "--config" => {
                let path = iter
                    .next()
                    .with_context(|| format!("--config needs a path\n{}", usage(program)))?;
                options.config = Some(PathBuf::from(path));
            }
            "-h" | "--help" => bail!(usage(program)),
            flag if flag.starts_with("--") => bail!("unknown option {}\n{}", flag, usage(program)),
            file => options.files.push(PathBuf::from(file)),
        }
    }

    if options.files.is_empty() {
        bail!(usage(program));
    }
    Ok(options)
}

fn run() -> Result<i32> {
    let args: Vec<String> = env::args().collect();
    let options = parse_args(&args)?;

    let config = match &options.config {
        Some(path) => ReaderConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ReaderConfig::default(),
    };
    log::debug!("Reader config: {:?}", config);

    let reports: Vec<FileReport> = options
        .files
        .par_iter()
        .map(|path| probe_file(path, &config))
        .collect();

    if options.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!("{}", report);
        }
    }

    let all_valid = reports.iter().all(|r| r.status == Status::Valid);
    Ok(if all_valid { 0 } else { 1 })
}

fn main() {
    env_logger::init();

    match run() {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{:#}", e);
            process::exit(2);
        }
    }
}
