//! Engine fixtures and workspace helpers.
//!
//! Provides convenience functions for setting up temp-rooted engines
//! and common pre-seeded scenarios.

use fabula_core::{Config, Engine, FieldValue, RegisterRequest};
use std::path::Path;
use tempfile::TempDir;

/// A test engine rooted in a temporary directory with automatic cleanup.
pub struct TestWorkspace {
    /// The engine instance.
    pub engine: Engine,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates an engine over a fresh temporary root.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let engine = Engine::open(Config::new().root(temp_dir.path()))
            .expect("Failed to open engine");
        Self {
            engine,
            _temp_dir: temp_dir,
        }
    }

    /// The workspace root on disk.
    pub fn root(&self) -> &Path {
        self._temp_dir.path()
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestWorkspace {
    type Target = Engine;

    fn deref(&self) -> &Self::Target {
        &self.engine
    }
}

/// Runs a test with an engine over a fresh temporary root.
///
/// # Example
///
/// ```rust,ignore
/// use fabula_testkit::with_engine;
///
/// #[test]
/// fn my_test() {
///     with_engine(|engine| {
///         engine.register("w.novies", Default::default()).unwrap();
///     });
/// }
/// ```
pub fn with_engine<F, R>(f: F) -> R
where
    F: FnOnce(&Engine) -> R,
{
    let workspace = TestWorkspace::new();
    f(&workspace.engine)
}

/// Pre-seeded workspace scenarios.
pub mod scenarios {
    use super::*;

    /// A workspace holding one registered work with a description, two
    /// personas, a settings ruleset, and an artifact list.
    pub fn registered_work(namespace: &str) -> TestWorkspace {
        let workspace = TestWorkspace::new();
        workspace
            .engine
            .register(
                &format!("{namespace}.novies"),
                RegisterRequest {
                    description: Some(FieldValue::Literal("a seeded work".into())),
                    personas: vec![
                        FieldValue::Literal("Kai".into()),
                        FieldValue::Literal("Rei".into()),
                    ],
                    settings: vec![FieldValue::Literal("a desert moon".into())],
                    artifacts: vec![FieldValue::Literal("signal lamp".into())],
                },
            )
            .expect("Failed to seed work");
        workspace
    }

    /// A workspace holding `count` empty registered works named
    /// `work_0` .. `work_{count-1}`.
    pub fn many_works(count: usize) -> TestWorkspace {
        let workspace = TestWorkspace::new();
        for i in 0..count {
            workspace
                .engine
                .register(&format!("work_{i}.novies"), RegisterRequest::default())
                .expect("Failed to seed work");
        }
        workspace
    }
}
