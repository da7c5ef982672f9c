//! Example: Inspect the container structure of a USDC file.
//!
//! Run with: cargo run --example inspect_usdc -- assets/scene.usdc

use std::env;

use usdc_core::{CrateFile, FileSource, ReaderConfig};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("Usage: inspect_usdc <path-to-usdc-file>");
        return;
    }

    let path = &args[1];
    println!("Inspecting USDC file: {}", path);

    let source = match FileSource::open(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error opening {}: {}", path, e);
            return;
        }
    };

    match CrateFile::open(source, ReaderConfig::default()) {
        Ok(file) => {
            println!("\n=== Crate {} ===", file.version());
            println!("Size: {} bytes", file.reader().len());
            println!("TOC offset: {}", file.bootstrap().toc_offset);

            println!("\n--- Sections ---");
            for section in file.toc().iter() {
                println!(
                    "  {:<16} start {:>10}  size {:>10}",
                    section.name, section.start, section.size
                );
            }
        }
        Err(e) => {
            eprintln!("Error reading USDC file: {}", e);
        }
    }
}
