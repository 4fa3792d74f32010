//! Subcommand implementations.

pub mod entity;
pub mod mix;
pub mod search;
pub mod work;

use fabula_core::{Body, FieldValue};

/// Marker prefix selecting the generation collaborator for a value.
const GEN_PREFIX: &str = "gen:";

/// Parses a CLI string into a tagged field value.
pub fn parse_field(raw: &str) -> FieldValue {
    match raw.strip_prefix(GEN_PREFIX) {
        Some(prompt) => FieldValue::Generated(prompt.to_string()),
        None => FieldValue::Literal(raw.to_string()),
    }
}

/// Parses many CLI strings into tagged field values.
pub fn parse_fields(raw: &[String]) -> Vec<FieldValue> {
    raw.iter().map(|s| parse_field(s)).collect()
}

/// Parses a JSON object argument into a body.
pub fn parse_body(raw: &str) -> Result<Body, Box<dyn std::error::Error>> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err("expected a JSON object".into()),
    }
}

/// Pretty-prints a body to stdout.
pub fn print_body(body: &Body) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(body)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gen_prefix_selects_generation() {
        assert_eq!(
            parse_field("gen:a desert planet"),
            FieldValue::Generated("a desert planet".into())
        );
        assert_eq!(
            parse_field("a desert planet"),
            FieldValue::Literal("a desert planet".into())
        );
    }

    #[test]
    fn outcome_must_be_an_object() {
        assert!(parse_body(r#"{"kai": "wounded"}"#).is_ok());
        assert!(parse_body(r#"["kai"]"#).is_err());
    }
}
