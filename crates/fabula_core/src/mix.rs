//! Mix engine: weighted combination of N source documents into a new one.
//!
//! Per top-level key across the union of source keys: when every source
//! holding the key has a numeric value, the output is the weighted sum with
//! the weights renormalized locally over the key-holding subset; otherwise
//! the value from the greatest-weight holder wins, ties broken by the
//! earliest source in input order.

use crate::body::{provenance, Body};
use crate::error::{CoreError, CoreResult};
use crate::store::{CollectionHandle, EntityStore};
use crate::types::Kind;
use serde_json::Value;
use tracing::debug;

/// One mix input: a collection plus the id of the document to draw from.
#[derive(Debug, Clone)]
pub struct MixSource {
    /// Source collection.
    pub collection: CollectionHandle,
    /// Document id within the collection (under the target kind).
    pub id: String,
}

impl MixSource {
    fn label(&self) -> String {
        format!("{}/{}", self.collection.qualified_name(), self.id)
    }
}

/// Combines source documents under a weight vector and writes the result
/// fresh at `(target, kind, target_id)`.
pub struct MixEngine<'a> {
    store: &'a EntityStore,
}

impl<'a> MixEngine<'a> {
    /// Creates a mix engine over a store.
    #[must_use]
    pub fn new(store: &'a EntityStore) -> Self {
        Self { store }
    }

    /// Runs the mix. Fails with `SourceMissing` for the first absent source,
    /// `InvalidWeights` for an unusable weight vector, and `TargetExists`
    /// when the target id is already occupied for that kind.
    pub fn mix(
        &self,
        sources: &[MixSource],
        weights: &[f64],
        kind: Kind,
        target: &CollectionHandle,
        target_id: &str,
    ) -> CoreResult<Body> {
        if sources.is_empty() {
            return Err(CoreError::invalid_weights("no sources given"));
        }
        if sources.len() != weights.len() {
            return Err(CoreError::invalid_weights(format!(
                "{} sources but {} weights",
                sources.len(),
                weights.len()
            )));
        }
        let weights = normalize_weights(weights)?;

        let mut bodies = Vec::with_capacity(sources.len());
        for source in sources {
            let body = self
                .store
                .get(&source.collection, kind, &source.id)?
                .ok_or_else(|| CoreError::source_missing(source.label()))?;
            bodies.push(body);
        }

        if self.store.contains(target, kind, target_id) {
            return Err(CoreError::target_exists(format!(
                "{}/{}/{}",
                target.qualified_name(),
                kind.dir_name(),
                target_id
            )));
        }

        let mut mixed = combine(&bodies, &weights);
        mixed.insert(
            provenance::MIXED_FROM.to_string(),
            Value::Array(
                sources
                    .iter()
                    .map(|s| Value::String(s.label()))
                    .collect(),
            ),
        );
        mixed.insert(
            provenance::WEIGHTS.to_string(),
            Value::Array(
                weights
                    .iter()
                    .map(|&w| serde_json::Number::from_f64(w).map_or(Value::Null, Value::Number))
                    .collect(),
            ),
        );

        self.store.put(target, kind, target_id, &mixed)?;
        debug!(
            target = %target.qualified_name(),
            %kind,
            target_id,
            sources = sources.len(),
            "mixed documents"
        );
        Ok(mixed)
    }
}

/// Normalizes weights to sum to 1.
///
/// # Errors
///
/// `InvalidWeights` when any weight is negative or non-finite, or the sum
/// is zero.
pub fn normalize_weights(weights: &[f64]) -> CoreResult<Vec<f64>> {
    for &w in weights {
        if !w.is_finite() || w < 0.0 {
            return Err(CoreError::invalid_weights(format!("weight {w} is not allowed")));
        }
    }
    let sum: f64 = weights.iter().sum();
    if sum == 0.0 {
        return Err(CoreError::invalid_weights("weights sum to zero"));
    }
    Ok(weights.iter().map(|w| w / sum).collect())
}

/// Combines bodies under already-normalized weights.
///
/// Key order of the output follows first appearance across the sources in
/// input order.
#[must_use]
pub fn combine(bodies: &[Body], weights: &[f64]) -> Body {
    let mut keys: Vec<&String> = Vec::new();
    for body in bodies {
        for key in body.keys() {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }

    let mut out = Body::new();
    for key in keys {
        let holders: Vec<(usize, &Value)> = bodies
            .iter()
            .enumerate()
            .filter_map(|(idx, body)| body.get(key).map(|v| (idx, v)))
            .collect();

        let numeric: Option<Vec<(usize, f64)>> = holders
            .iter()
            .map(|&(idx, value)| value.as_f64().map(|n| (idx, n)))
            .collect();

        let combined = match numeric {
            Some(numbers) => weighted_sum(&numbers, weights),
            None => pick_heaviest(&holders, weights).clone(),
        };
        out.insert(key.clone(), combined);
    }
    out
}

/// Weighted sum with local renormalization over the key-holding subset.
fn weighted_sum(numbers: &[(usize, f64)], weights: &[f64]) -> Value {
    let local_sum: f64 = numbers.iter().map(|&(idx, _)| weights[idx]).sum();
    let total = if local_sum > 0.0 {
        numbers
            .iter()
            .map(|&(idx, n)| n * weights[idx] / local_sum)
            .sum()
    } else {
        // Every holder has weight zero; fall back to an unweighted mean.
        numbers.iter().map(|&(_, n)| n).sum::<f64>() / numbers.len() as f64
    };
    serde_json::Number::from_f64(total).map_or(Value::Null, Value::Number)
}

/// Greatest-weight holder, ties broken by earliest input position.
fn pick_heaviest<'v>(holders: &[(usize, &'v Value)], weights: &[f64]) -> &'v Value {
    let mut best = holders[0];
    for &(idx, value) in &holders[1..] {
        if weights[idx] > weights[best.0] {
            best = (idx, value);
        }
    }
    best.1
}
