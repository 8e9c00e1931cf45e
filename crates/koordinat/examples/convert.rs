//! Convert one free-text coordinate and print the results as JSON.
//!
//! ```text
//! cargo run --example convert -- "59°19'45\"N 18°04'30\"E h=12.3" [config.json]
//! ```

use std::env;
use std::time::Instant;

#[cfg(feature = "tracing")]
use koordinat::core::init_tracing;
#[cfg(not(feature = "tracing"))]
use koordinat::core::init_from_env;
use koordinat::ConverterConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(not(feature = "tracing"))]
    init_from_env()?;
    #[cfg(feature = "tracing")]
    init_tracing(false);

    let args: Vec<String> = env::args().collect();
    let Some(text) = args.get(1) else {
        eprintln!("usage: convert <coordinate text> [config.json]");
        std::process::exit(2);
    };
    let cfg = match args.get(2) {
        Some(path) => ConverterConfig::load_json(path)?,
        None => ConverterConfig::default(),
    }
    .with_env_overrides();

    let converter = cfg.build_converter();
    let t0 = Instant::now();
    let parsed = converter.parse(text)?;
    let results = converter.convert_to_targets(&parsed, &cfg.targets, &cfg.convert_options())?;
    log::info!(
        "converted {} input to {} targets in {} us",
        parsed.source_format,
        cfg.targets.len(),
        t0.elapsed().as_micros()
    );

    let report = serde_json::json!({
        "input": text,
        "parsed": parsed,
        "results": results,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
