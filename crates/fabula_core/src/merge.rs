//! Merge engine: decides how a write combines with an existing document.
//!
//! Every write that may target an occupied `(collection, kind, id)` key goes
//! through [`apply`] under a named [`MergeStrategy`]. The store's raw `put`
//! is only called here, after policy resolution.

use crate::body::{provenance, Body};
use crate::error::{CoreError, CoreResult};
use crate::store::{CollectionHandle, EntityStore};
use crate::types::{Kind, MergeStrategy};
use serde_json::Value;
use tracing::trace;

/// Caller-supplied hook for the `interactive` strategy, invoked once per
/// conflicting leaf key. `key_path` is dot-joined from the document root.
pub trait ConflictResolver {
    /// Picks the value to keep for a conflicting leaf.
    fn resolve(&self, key_path: &str, existing: &Value, incoming: &Value) -> Value;
}

/// Merges `incoming` into whatever currently sits at the key and writes the
/// result. Returns the body as stored.
///
/// Regardless of strategy, provenance keys already present on the existing
/// document survive unless the incoming body explicitly overwrites them.
pub fn apply(
    store: &EntityStore,
    collection: &CollectionHandle,
    kind: Kind,
    id: &str,
    incoming: Body,
    strategy: MergeStrategy,
    resolver: Option<&dyn ConflictResolver>,
) -> CoreResult<Body> {
    let existing = store.get(collection, kind, id)?;
    trace!(
        namespace = %collection.namespace,
        %kind,
        id,
        %strategy,
        occupied = existing.is_some(),
        "merge"
    );

    let merged = match (&existing, strategy) {
        (None, _) => incoming.clone(),
        (Some(_), MergeStrategy::Strict) => {
            return Err(CoreError::MergeConflict {
                namespace: collection.namespace.clone(),
                kind: kind.name().to_string(),
                id: id.to_string(),
            });
        }
        (Some(_), MergeStrategy::Overlay) => incoming.clone(),
        (Some(current), MergeStrategy::Patch) => patch_merge(current, &incoming),
        (Some(current), MergeStrategy::Interactive) => match resolver {
            Some(resolver) => interactive_merge(current, &incoming, resolver, ""),
            // No hook supplied: interactive degrades to overlay.
            None => incoming.clone(),
        },
    };

    let mut merged = merged;
    if let Some(current) = &existing {
        preserve_provenance(current, &incoming, &mut merged);
    }

    store.put(collection, kind, id, &merged)?;
    Ok(merged)
}

/// Recursive structural merge.
///
/// For each incoming key: if both sides hold nested mappings, merge them
/// depth-first under the same rule; otherwise the incoming value replaces
/// the existing one. Keys present only in the existing document survive.
#[must_use]
pub fn patch_merge(existing: &Body, incoming: &Body) -> Body {
    let mut out = existing.clone();
    for (key, incoming_value) in incoming {
        match (out.get(key), incoming_value) {
            (Some(Value::Object(left)), Value::Object(right)) => {
                out.insert(key.clone(), Value::Object(patch_merge(left, right)));
            }
            _ => {
                out.insert(key.clone(), incoming_value.clone());
            }
        }
    }
    out
}

/// Structural merge that routes every conflicting leaf through the resolver.
fn interactive_merge(
    existing: &Body,
    incoming: &Body,
    resolver: &dyn ConflictResolver,
    prefix: &str,
) -> Body {
    let mut out = existing.clone();
    for (key, incoming_value) in incoming {
        let key_path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match (out.get(key), incoming_value) {
            (Some(Value::Object(left)), Value::Object(right)) => {
                out.insert(
                    key.clone(),
                    Value::Object(interactive_merge(left, right, resolver, &key_path)),
                );
            }
            (Some(existing_value), _) if existing_value != incoming_value => {
                let chosen = resolver.resolve(&key_path, existing_value, incoming_value);
                out.insert(key.clone(), chosen);
            }
            _ => {
                out.insert(key.clone(), incoming_value.clone());
            }
        }
    }
    out
}

/// Re-attaches provenance keys that the incoming body did not overwrite.
fn preserve_provenance(existing: &Body, incoming: &Body, merged: &mut Body) {
    for &key in provenance::KEYS {
        if !incoming.contains_key(key) {
            if let Some(value) = existing.get(key) {
                merged.insert(key.to_string(), value.clone());
            }
        }
    }
}
