//! Core value types: document kinds, persistence classes, merge strategies.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of a stored document.
///
/// Each kind maps to one subdirectory of a collection. The directory names
/// are part of the on-disk format and never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// Narrative notes and event records (`novies/`).
    Narrative,
    /// Rule sets and underlying laws (`cores/`).
    Ruleset,
    /// Character sheets (`personas/`).
    Persona,
    /// Artifacts and technology (`tech/`).
    Artifact,
}

impl Kind {
    /// All kinds, in directory-creation order.
    pub const ALL: [Kind; 4] = [
        Kind::Narrative,
        Kind::Ruleset,
        Kind::Persona,
        Kind::Artifact,
    ];

    /// The on-disk subdirectory name for this kind.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Kind::Narrative => "novies",
            Kind::Ruleset => "cores",
            Kind::Persona => "personas",
            Kind::Artifact => "tech",
        }
    }

    /// The canonical display name for this kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Kind::Narrative => "narrative",
            Kind::Ruleset => "ruleset",
            Kind::Persona => "persona",
            Kind::Artifact => "artifact",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Kind {
    type Err = CoreError;

    /// Parses a kind from its canonical name, the legacy aliases used by the
    /// original tooling (`core`, `tech`, directory names), or the one-letter
    /// codes `n`, `c`, `p`, `t`.
    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "narrative" | "novies" | "n" => Ok(Kind::Narrative),
            "ruleset" | "core" | "cores" | "c" => Ok(Kind::Ruleset),
            "persona" | "personas" | "p" => Ok(Kind::Persona),
            "artifact" | "tech" | "t" => Ok(Kind::Artifact),
            other => Err(CoreError::invalid_kind(other)),
        }
    }
}

/// Whether a collection is long-lived or bulk-erasable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceClass {
    /// Long-lived collections under `works/`.
    Persistent,
    /// Isolated collections under `temps/works/`, erasable in bulk.
    Temporary,
}

impl fmt::Display for PersistenceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceClass::Persistent => f.write_str("persistent"),
            PersistenceClass::Temporary => f.write_str("temporary"),
        }
    }
}

/// Policy governing how a write interacts with an existing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeStrategy {
    /// Unconditional replace.
    #[default]
    Overlay,
    /// Fail with `MergeConflict` if a document already exists at the key.
    Strict,
    /// Recursive structural merge; incoming scalars win, existing-only keys
    /// are preserved.
    Patch,
    /// Per-conflicting-leaf resolution through a caller-supplied hook,
    /// falling back to overlay when no hook is given.
    Interactive,
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MergeStrategy::Overlay => "overlay",
            MergeStrategy::Strict => "strict",
            MergeStrategy::Patch => "patch",
            MergeStrategy::Interactive => "interactive",
        };
        f.write_str(name)
    }
}

impl FromStr for MergeStrategy {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "overlay" => Ok(MergeStrategy::Overlay),
            "strict" => Ok(MergeStrategy::Strict),
            "patch" => Ok(MergeStrategy::Patch),
            "interactive" => Ok(MergeStrategy::Interactive),
            other => Err(CoreError::invalid_strategy(other)),
        }
    }
}
