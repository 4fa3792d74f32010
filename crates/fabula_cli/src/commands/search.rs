//! Search command implementation.

use fabula_core::{Engine, Kind};

/// Runs the search command.
pub fn run(
    engine: &Engine,
    keyword: &str,
    work: Option<&str>,
    kind: Option<Kind>,
) -> Result<(), Box<dyn std::error::Error>> {
    let hits = engine.search(keyword, work, kind)?;
    if hits.is_empty() {
        println!("No matches for '{keyword}'");
        return Ok(());
    }
    println!("{}", serde_json::to_string_pretty(&hits)?);
    Ok(())
}
