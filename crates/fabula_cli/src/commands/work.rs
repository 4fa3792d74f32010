//! Work-level commands: register, deploy, update, fabricate, transmute.

use super::{parse_field, parse_fields};
use fabula_core::{Engine, MergeStrategy, RegisterRequest};
use std::path::Path;
use tracing::info;

/// Runs the register command.
pub fn register(
    engine: &Engine,
    path: &str,
    description: Option<String>,
    personas: Vec<String>,
    settings: Vec<String>,
    artifacts: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = RegisterRequest {
        description: description.as_deref().map(parse_field),
        personas: parse_fields(&personas),
        settings: parse_fields(&settings),
        artifacts: parse_fields(&artifacts),
    };
    let collection = engine.register(path, request)?;
    info!(work = %collection.qualified_name(), "registered work");
    println!("Registered {}", collection.qualified_name());
    Ok(())
}

/// Runs the deploy command.
pub fn deploy(
    engine: &Engine,
    path: &str,
    source: Option<&Path>,
    package: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let collection = engine.deploy(path, source, package)?;
    info!(work = %collection.qualified_name(), "deployed work");
    println!("Deployed {}", collection.qualified_name());
    Ok(())
}

/// Runs the update command.
pub fn update(
    engine: &Engine,
    path: &str,
    source: &Path,
    strategy: MergeStrategy,
    branch_to: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let collection = engine.update(path, source, strategy, branch_to)?;
    info!(
        work = %collection.qualified_name(),
        source = %source.display(),
        %strategy,
        "updated work"
    );
    match branch_to {
        Some(_) => println!("Branched into {}", collection.qualified_name()),
        None => println!("Updated {}", collection.qualified_name()),
    }
    Ok(())
}

/// Runs the fabricate command.
pub fn fabricate(
    engine: &Engine,
    path: &str,
    setting: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let collection = engine.fabricate(path, parse_field(setting))?;
    info!(work = %collection.qualified_name(), "fabricated work");
    println!("Fabricated {}", collection.qualified_name());
    Ok(())
}

/// Runs the transmute command.
pub fn transmute(
    engine: &Engine,
    path: &str,
    to: &str,
    reason: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let collection = engine.transmute(path, to, reason)?;
    info!(work = %collection.qualified_name(), "transmuted work");
    println!("Transmuted into {}", collection.qualified_name());
    Ok(())
}
