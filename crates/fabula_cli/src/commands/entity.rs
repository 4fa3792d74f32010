//! Document-level commands: core, persona, mirror, run, inspect.

use super::{parse_body, parse_field, parse_fields, print_body};
use fabula_core::{Body, Engine, Kind, MergeStrategy};
use tracing::info;

/// Runs the core command.
pub fn core(
    engine: &Engine,
    path: &str,
    axioms: Vec<String>,
    constraints: Vec<String>,
    strategy: MergeStrategy,
) -> Result<(), Box<dyn std::error::Error>> {
    let body = engine.define_ruleset(path, parse_fields(&axioms), parse_fields(&constraints), strategy)?;
    info!(path, %strategy, "wrote ruleset document");
    print_body(&body)
}

/// Runs the persona command.
pub fn persona(
    engine: &Engine,
    path: &str,
    traits: Vec<String>,
    constraints: Vec<String>,
    strategy: MergeStrategy,
) -> Result<(), Box<dyn std::error::Error>> {
    let body = engine.define_persona(path, parse_fields(&traits), parse_fields(&constraints), strategy)?;
    info!(path, %strategy, "wrote persona document");
    print_body(&body)
}

/// Runs the mirror command.
pub fn mirror(
    engine: &Engine,
    path: &str,
    of: &str,
    reason: &str,
    as_id: &str,
    strategy: MergeStrategy,
) -> Result<(), Box<dyn std::error::Error>> {
    let body = engine.mirror(path, of, parse_field(reason), as_id, strategy)?;
    info!(path, of, as_id, "mirrored persona");
    print_body(&body)
}

/// Runs the run command.
pub fn run(
    engine: &Engine,
    path: &str,
    when: Option<String>,
    then: &str,
    outcome: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = match outcome {
        Some(raw) => parse_body(raw)?,
        None => Body::new(),
    };
    let body = engine.run(path, when.as_deref().map(parse_field), then, outcome)?;
    info!(path, event = then, "recorded narrative event");
    print_body(&body)
}

/// Runs the inspect command.
pub fn inspect(engine: &Engine, path: &str, kind: Kind) -> Result<(), Box<dyn std::error::Error>> {
    let body = engine.inspect(path, kind)?;
    print_body(&body)
}
