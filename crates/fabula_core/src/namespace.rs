//! Namespace resolution.
//!
//! A path is an ordered sequence of at least two tokens. The final token is
//! always the document id; every preceding token joins (dot-separated) into
//! the raw namespace. A raw namespace whose first segment is the reserved
//! `temps` prefix is stripped of that one segment and routed into the
//! temporary persistence class.

use crate::error::{CoreError, CoreResult};
use crate::types::PersistenceClass;

/// Reserved leading segment routing a namespace into the temporary class.
pub const TEMP_SEGMENT: &str = "temps";

/// Names a user namespace may not take: the one-letter verb codes plus the
/// literal segments of the mix sub-protocol. Without this list a namespace
/// would be indistinguishable from a dispatch keyword.
const RESERVED: &[&str] = &[
    "d", "u", "l", "x", "f", "c", "p", "m", "t", "r", "i", "novies", "mxd", "in",
];

/// A fully resolved document address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Persistence class the namespace routes into.
    pub class: PersistenceClass,
    /// Collection namespace, with any `temps` prefix stripped.
    pub namespace: String,
    /// Document id (the final path token).
    pub id: String,
}

/// Resolves an ordered token sequence into a document address.
///
/// # Errors
///
/// Returns `PathTooShort` for fewer than two tokens (or a bare `temps`
/// prefix with nothing behind it), and `NamespaceInvalid` for namespaces
/// that fail [`validate_namespace`] or ids with illegal characters.
pub fn resolve(tokens: &[&str]) -> CoreResult<ResolvedPath> {
    if tokens.len() < 2 {
        return Err(CoreError::PathTooShort { got: tokens.len() });
    }

    let (id, namespace_tokens) = tokens.split_last().unwrap_or((&"", &[]));
    let (class, namespace_tokens) = match namespace_tokens.split_first() {
        Some((&first, rest)) if first == TEMP_SEGMENT => (PersistenceClass::Temporary, rest),
        _ => (PersistenceClass::Persistent, namespace_tokens),
    };

    // `["temps", "kai"]` leaves no namespace behind the prefix.
    if namespace_tokens.is_empty() {
        return Err(CoreError::PathTooShort { got: tokens.len() });
    }

    let namespace = namespace_tokens.join(".");
    validate_namespace(&namespace)?;
    validate_segment(id)?;

    Ok(ResolvedPath {
        class,
        namespace,
        id: (*id).to_string(),
    })
}

/// Resolves a dot-separated path string, e.g. `"temps.cyber_noir.kai"`.
pub fn resolve_dotted(path: &str) -> CoreResult<ResolvedPath> {
    let tokens: Vec<&str> = path.split('.').filter(|t| !t.is_empty()).collect();
    resolve(&tokens)
}

/// Classifies a bare namespace string (no document id), stripping any
/// `temps` prefix. Used for operations addressed at a whole collection.
pub fn classify(name: &str) -> CoreResult<(PersistenceClass, String)> {
    if name == TEMP_SEGMENT {
        return Err(CoreError::PathTooShort { got: 1 });
    }
    let stripped = name
        .strip_prefix(TEMP_SEGMENT)
        .and_then(|rest| rest.strip_prefix('.'));
    let (class, namespace) = match stripped {
        Some(rest) => (PersistenceClass::Temporary, rest),
        None => (PersistenceClass::Persistent, name),
    };
    if namespace.is_empty() {
        return Err(CoreError::PathTooShort { got: 1 });
    }
    validate_namespace(namespace)?;
    Ok((class, namespace.to_string()))
}

/// Validates a namespace: legal characters only, and no collision with a
/// reserved verb keyword.
pub fn validate_namespace(name: &str) -> CoreResult<()> {
    validate_segment(name)?;
    if RESERVED.contains(&name) {
        return Err(CoreError::namespace_invalid(name));
    }
    Ok(())
}

/// Checks that a namespace or id contains only `[A-Za-z0-9_.-]`.
fn validate_segment(name: &str) -> CoreResult<()> {
    let legal = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    if legal {
        Ok(())
    } else {
        Err(CoreError::namespace_invalid(name))
    }
}
