//! Mix command implementation.

use super::print_body;
use fabula_core::{Engine, Kind};

/// Runs the mix command.
pub fn run(
    engine: &Engine,
    sources: &[String],
    weights: &[f64],
    kind: Kind,
    target: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let sources: Vec<&str> = sources.iter().map(String::as_str).collect();
    let body = engine.mix(&sources, weights, kind, target)?;
    println!("Mixed {} source(s) into {target}", sources.len());
    print_body(&body)
}
