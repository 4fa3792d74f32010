//! Verb-level engine facade.
//!
//! `Engine` is the explicit handle the surrounding CLI/DSL layer drives: one
//! per workspace root, constructed once and passed around (there is no
//! process-wide singleton). Each verb resolves a dotted path, then reads and
//! writes through the store, routing occupied-key writes through the merge
//! engine, multi-source combination through the mix engine, and cloning
//! through the lineage tracker.

use crate::body::{provenance, slugify, Body};
use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::generate::{FieldValue, GenerationClient, Generator, NullGenerator};
use crate::lineage::LineageTracker;
use crate::merge::{self, ConflictResolver};
use crate::mix::{MixEngine, MixSource};
use crate::namespace::{self, ResolvedPath};
use crate::store::{CollectionHandle, EntityStore};
use crate::types::{Kind, MergeStrategy, PersistenceClass};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Canonical source recorded for works declared from scratch.
const LOCAL_CREATION: &str = "local_creation";

/// Parameters for the register verb.
#[derive(Debug, Default)]
pub struct RegisterRequest {
    /// Narrative description of the work, stored at the path's document id.
    pub description: Option<FieldValue>,
    /// Persona labels; each becomes a persona document with a slugged id.
    pub personas: Vec<FieldValue>,
    /// Setting descriptions, stored as one ruleset document.
    pub settings: Vec<FieldValue>,
    /// Artifact labels, stored as one artifact document.
    pub artifacts: Vec<FieldValue>,
}

/// One search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// Persistence class of the holding collection.
    pub class: PersistenceClass,
    /// Namespace of the holding collection (without `temps` prefix).
    pub namespace: String,
    /// Kind of the matching document.
    pub kind: Kind,
    /// Matching document id.
    pub id: String,
}

/// The engine handle.
pub struct Engine {
    config: Config,
    store: EntityStore,
    generation: GenerationClient,
}

impl Engine {
    /// Opens an engine over the configured root, creating the workspace
    /// layout if needed. Safe to call repeatedly on the same root.
    ///
    /// Generated field values fall back to their prompt text until a
    /// backend is supplied via [`Engine::open_with_generator`].
    pub fn open(config: Config) -> CoreResult<Self> {
        Self::open_with_generator(config, Arc::new(NullGenerator))
    }

    /// Opens an engine with a generation backend.
    pub fn open_with_generator(config: Config, generator: Arc<dyn Generator>) -> CoreResult<Self> {
        let store = EntityStore::open(&config.root)?;
        let generation = GenerationClient::new(generator, config.generation_timeout);
        info!(root = %config.root.display(), "opened engine");
        Ok(Self {
            config,
            store,
            generation,
        })
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Declares a work and its initial documents, creating the collection if
    /// it does not exist yet.
    pub fn register(&self, path: &str, request: RegisterRequest) -> CoreResult<CollectionHandle> {
        let resolved = namespace::resolve_dotted(path)?;
        let collection =
            self.store
                .open_or_create_collection(&resolved.namespace, resolved.class, LOCAL_CREATION)?;
        let origin = format!("{}.{}", resolved.namespace, resolved.id);
        let strategy = self.config.default_strategy;

        if let Some(description) = &request.description {
            let mut body = Body::new();
            body.insert(
                "description".to_string(),
                Value::String(self.generation.resolve(description)),
            );
            body.insert(
                provenance::REGISTERED_FROM.to_string(),
                Value::String(origin.clone()),
            );
            merge::apply(
                &self.store,
                &collection,
                Kind::Narrative,
                &resolved.id,
                body,
                strategy,
                None,
            )?;
        }

        for persona in &request.personas {
            let text = self.generation.resolve(persona);
            let id = slugify(&text);
            let mut body = Body::new();
            body.insert("description".to_string(), Value::String(text));
            body.insert(
                provenance::REGISTERED_FROM.to_string(),
                Value::String(origin.clone()),
            );
            merge::apply(
                &self.store,
                &collection,
                Kind::Persona,
                &id,
                body,
                strategy,
                None,
            )?;
        }

        if !request.settings.is_empty() {
            let settings: Vec<Value> = request
                .settings
                .iter()
                .map(|s| Value::String(self.generation.resolve(s)))
                .collect();
            let mut body = Body::new();
            body.insert("settings".to_string(), Value::Array(settings));
            body.insert(
                provenance::REGISTERED_FROM.to_string(),
                Value::String(origin.clone()),
            );
            merge::apply(
                &self.store,
                &collection,
                Kind::Ruleset,
                &format!("{}_settings", resolved.id),
                body,
                strategy,
                None,
            )?;
        }

        if !request.artifacts.is_empty() {
            let items: Vec<Value> = request
                .artifacts
                .iter()
                .map(|s| Value::String(self.generation.resolve(s)))
                .collect();
            let mut body = Body::new();
            body.insert("items".to_string(), Value::Array(items));
            body.insert(provenance::REGISTERED_FROM.to_string(), Value::String(origin));
            merge::apply(
                &self.store,
                &collection,
                Kind::Artifact,
                &format!("{}_tech", resolved.id),
                body,
                strategy,
                None,
            )?;
        }

        Ok(collection)
    }

    /// Installs a work into a fresh collection, optionally importing the
    /// documents of an on-disk package directory (a collection-shaped tree).
    pub fn deploy(
        &self,
        path: &str,
        source: Option<&Path>,
        package: Option<&str>,
    ) -> CoreResult<CollectionHandle> {
        let resolved = namespace::resolve_dotted(path)?;
        let canonical_source = package
            .map(ToString::to_string)
            .or_else(|| source.map(|p| p.display().to_string()))
            .unwrap_or_else(|| format!("official_repo/{}", resolved.namespace));

        let collection =
            self.store
                .create_collection(&resolved.namespace, resolved.class, &canonical_source)?;

        if let Some(source) = source {
            self.import_documents(source, &collection, MergeStrategy::Overlay)?;
        }

        let mut body = Body::new();
        body.insert(
            "deployed_from".to_string(),
            Value::String(canonical_source),
        );
        merge::apply(
            &self.store,
            &collection,
            Kind::Narrative,
            &resolved.id,
            body,
            MergeStrategy::Patch,
            None,
        )?;
        Ok(collection)
    }

    /// Merges an on-disk source tree into an existing work (mode A), or into
    /// a fresh branch derived from it first (mode B, when `branch_to` names
    /// a target namespace).
    pub fn update(
        &self,
        path: &str,
        source: &Path,
        strategy: MergeStrategy,
        branch_to: Option<&str>,
    ) -> CoreResult<CollectionHandle> {
        let resolved = namespace::resolve_dotted(path)?;
        let collection = self
            .store
            .open_collection(&resolved.namespace, resolved.class)?;
        if !source.is_dir() {
            return Err(CoreError::source_missing(source.display().to_string()));
        }

        let target = match branch_to {
            None => collection,
            Some(branch) => {
                let (class, target_namespace) = namespace::classify(branch)?;
                LineageTracker::new(&self.store).transmute(
                    &collection,
                    &target_namespace,
                    class,
                    &format!("branched by update from {}", source.display()),
                )?
            }
        };

        self.import_documents(source, &target, strategy)?;
        Ok(target)
    }

    /// Creates a work with a single (possibly generated) setting narrative.
    pub fn fabricate(&self, path: &str, setting: FieldValue) -> CoreResult<CollectionHandle> {
        let resolved = namespace::resolve_dotted(path)?;
        let collection =
            self.store
                .create_collection(&resolved.namespace, resolved.class, "fabricated")?;

        let mut body = Body::new();
        body.insert(
            "setting".to_string(),
            Value::String(self.generation.resolve(&setting)),
        );
        // The collection was just created exclusively, so strict cannot hit
        // an occupied slot.
        merge::apply(
            &self.store,
            &collection,
            Kind::Narrative,
            &resolved.id,
            body,
            MergeStrategy::Strict,
            None,
        )?;
        Ok(collection)
    }

    /// Writes a single ruleset document with axioms and constraints.
    pub fn define_ruleset(
        &self,
        path: &str,
        axioms: Vec<FieldValue>,
        constraints: Vec<FieldValue>,
        strategy: MergeStrategy,
    ) -> CoreResult<Body> {
        self.define_extracted(path, Kind::Ruleset, "axioms", axioms, constraints, strategy)
    }

    /// Writes a single persona document with traits and constraints.
    pub fn define_persona(
        &self,
        path: &str,
        traits: Vec<FieldValue>,
        constraints: Vec<FieldValue>,
        strategy: MergeStrategy,
    ) -> CoreResult<Body> {
        self.define_extracted(path, Kind::Persona, "traits", traits, constraints, strategy)
    }

    fn define_extracted(
        &self,
        path: &str,
        kind: Kind,
        list_key: &str,
        list: Vec<FieldValue>,
        constraints: Vec<FieldValue>,
        strategy: MergeStrategy,
    ) -> CoreResult<Body> {
        let resolved = namespace::resolve_dotted(path)?;
        let collection = self
            .store
            .open_collection(&resolved.namespace, resolved.class)?;

        let mut body = Body::new();
        body.insert(
            list_key.to_string(),
            Value::Array(
                list.iter()
                    .map(|v| Value::String(self.generation.resolve(v)))
                    .collect(),
            ),
        );
        body.insert(
            "constraints".to_string(),
            Value::Array(
                constraints
                    .iter()
                    .map(|v| Value::String(self.generation.resolve(v)))
                    .collect(),
            ),
        );
        body.insert(
            provenance::EXTRACTED_FROM.to_string(),
            Value::String(format!("{}.{}", resolved.namespace, resolved.id)),
        );

        merge::apply(
            &self.store,
            &collection,
            kind,
            &resolved.id,
            body,
            strategy,
            None,
        )
    }

    /// Fuses documents from several works into one fresh document.
    ///
    /// Each source is a dotted path; all sources are read under the target
    /// kind. The target path names the holding collection (created if
    /// absent) and the new document id.
    pub fn mix(
        &self,
        sources: &[&str],
        weights: &[f64],
        kind: Kind,
        target: &str,
    ) -> CoreResult<Body> {
        let mut mix_sources = Vec::with_capacity(sources.len());
        for source in sources {
            let resolved = namespace::resolve_dotted(source)?;
            if !self
                .store
                .collection_exists(&resolved.namespace, resolved.class)
            {
                return Err(CoreError::source_missing((*source).to_string()));
            }
            let collection = self
                .store
                .open_collection(&resolved.namespace, resolved.class)?;
            mix_sources.push(MixSource {
                collection,
                id: resolved.id,
            });
        }

        let target = namespace::resolve_dotted(target)?;
        let target_collection =
            self.store
                .open_or_create_collection(&target.namespace, target.class, "mixed")?;

        MixEngine::new(&self.store).mix(
            &mix_sources,
            weights,
            kind,
            &target_collection,
            &target.id,
        )
    }

    /// Creates a fate variant of a persona within a work.
    pub fn mirror(
        &self,
        path: &str,
        source_persona_id: &str,
        fate_change: FieldValue,
        new_id: &str,
        strategy: MergeStrategy,
    ) -> CoreResult<Body> {
        let resolved = namespace::resolve_dotted(path)?;
        let collection = self
            .store
            .open_collection(&resolved.namespace, resolved.class)?;
        let fate = self.generation.resolve(&fate_change);
        LineageTracker::new(&self.store).mirror(
            &collection,
            source_persona_id,
            &fate,
            new_id,
            strategy,
            None,
        )
    }

    /// Derives a whole new work from an existing one, preserving lineage.
    pub fn transmute(
        &self,
        path: &str,
        target_namespace: &str,
        lineage_desc: &str,
    ) -> CoreResult<CollectionHandle> {
        let resolved = namespace::resolve_dotted(path)?;
        let collection = self
            .store
            .open_collection(&resolved.namespace, resolved.class)
            .map_err(|_| CoreError::source_missing(resolved.namespace.clone()))?;
        let (class, target) = namespace::classify(target_namespace)?;
        LineageTracker::new(&self.store).transmute(&collection, &target, class, lineage_desc)
    }

    /// Records a narrative event: condition, event name, outcome mapping.
    ///
    /// Re-running the same id goes through a patch merge, so outcome keys
    /// accumulate instead of being clobbered.
    pub fn run(
        &self,
        path: &str,
        condition: Option<FieldValue>,
        event: &str,
        outcome: Body,
    ) -> CoreResult<Body> {
        let resolved = namespace::resolve_dotted(path)?;
        let collection = self
            .store
            .open_collection(&resolved.namespace, resolved.class)?;

        let condition_text = condition
            .map(|c| self.generation.resolve(&c))
            .unwrap_or_else(|| "always".to_string());

        let mut body = Body::new();
        body.insert("condition".to_string(), Value::String(condition_text));
        body.insert("event".to_string(), Value::String(event.to_string()));
        body.insert("outcome".to_string(), Value::Object(outcome));

        merge::apply(
            &self.store,
            &collection,
            Kind::Narrative,
            &resolved.id,
            body,
            MergeStrategy::Patch,
            None,
        )
    }

    /// Reads one document. An absent document is `EntityNotFound` here, not
    /// an empty result.
    pub fn inspect(&self, path: &str, kind: Kind) -> CoreResult<Body> {
        let resolved = namespace::resolve_dotted(path)?;
        let collection = self
            .store
            .open_collection(&resolved.namespace, resolved.class)?;
        self.store
            .get(&collection, kind, &resolved.id)?
            .ok_or_else(|| CoreError::EntityNotFound {
                namespace: resolved.namespace,
                kind: kind.name().to_string(),
                id: resolved.id,
            })
    }

    /// Linear scan over every collection, matching a keyword (case
    /// insensitively) against document ids and namespace spellings.
    pub fn search(
        &self,
        keyword: &str,
        namespace_filter: Option<&str>,
        kind_filter: Option<Kind>,
    ) -> CoreResult<Vec<SearchHit>> {
        let needle = keyword.to_lowercase();
        let mut hits = Vec::new();

        for class in [PersistenceClass::Persistent, PersistenceClass::Temporary] {
            for namespace in self.store.list_collections(class)? {
                let collection = self.store.open_collection(&namespace, class)?;
                if let Some(filter) = namespace_filter {
                    if filter != collection.qualified_name() {
                        continue;
                    }
                }
                let namespace_matches = namespace.to_lowercase().contains(&needle);

                for kind in Kind::ALL {
                    if kind_filter.is_some_and(|k| k != kind) {
                        continue;
                    }
                    for id in self.store.list_ids(&collection, kind)? {
                        if namespace_matches || id.to_lowercase().contains(&needle) {
                            hits.push(SearchHit {
                                class,
                                namespace: namespace.clone(),
                                kind,
                                id,
                            });
                        }
                    }
                }
            }
        }
        Ok(hits)
    }

    /// Erases the whole temporary persistence class.
    pub fn clear_temporary(&self) -> CoreResult<usize> {
        self.store.clear_temporary()
    }

    /// Applies a write under an explicit strategy and optional interactive
    /// resolver. Exposed for callers that drive the merge engine directly.
    pub fn write_document(
        &self,
        path: &str,
        kind: Kind,
        body: Body,
        strategy: MergeStrategy,
        resolver: Option<&dyn ConflictResolver>,
    ) -> CoreResult<Body> {
        let resolved = namespace::resolve_dotted(path)?;
        let collection = self
            .store
            .open_collection(&resolved.namespace, resolved.class)?;
        merge::apply(
            &self.store,
            &collection,
            kind,
            &resolved.id,
            body,
            strategy,
            resolver,
        )
    }

    fn import_documents(
        &self,
        source: &Path,
        target: &CollectionHandle,
        strategy: MergeStrategy,
    ) -> CoreResult<()> {
        for kind in Kind::ALL {
            let dir = source.join(kind.dir_name());
            if !dir.is_dir() {
                continue;
            }
            for entry in std::fs::read_dir(&dir)? {
                let file = entry?.path();
                if !file.extension().is_some_and(|ext| ext == "json") {
                    continue;
                }
                let Some(id) = file.file_stem().and_then(|s| s.to_str()).map(String::from)
                else {
                    continue;
                };
                let body: Body = crate::dir::WorkspaceDir::read_json(&file)?
                    .ok_or_else(|| CoreError::corrupt_document(&file, "unreadable document"))?;
                merge::apply(&self.store, target, kind, &id, body, strategy, None)?;
            }
        }
        Ok(())
    }

    /// Resolves a dotted path without touching the store. Convenience
    /// re-export for surfaces that need the address itself.
    pub fn resolve_path(&self, path: &str) -> CoreResult<ResolvedPath> {
        namespace::resolve_dotted(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn engine() -> (tempfile::TempDir, Engine) {
        let temp = tempdir().unwrap();
        let engine = Engine::open(Config::new().root(temp.path())).unwrap();
        (temp, engine)
    }

    #[test]
    fn register_then_inspect_round_trips_description() {
        let (_temp, engine) = engine();
        engine
            .register(
                "w.novies",
                RegisterRequest {
                    description: Some(FieldValue::Literal("D".into())),
                    ..Default::default()
                },
            )
            .unwrap();

        let doc = engine.inspect("w.novies", Kind::Narrative).unwrap();
        assert_eq!(doc.get("description"), Some(&json!("D")));
        assert_eq!(doc.get("registered_from"), Some(&json!("w.novies")));
    }

    #[test]
    fn register_is_create_if_absent() {
        let (_temp, engine) = engine();
        engine
            .register("w.novies", RegisterRequest::default())
            .unwrap();
        // Registering again into the same work is not a collision.
        engine
            .register(
                "w.novies",
                RegisterRequest {
                    personas: vec![FieldValue::Literal("Kai".into())],
                    ..Default::default()
                },
            )
            .unwrap();

        let doc = engine.inspect("w.kai", Kind::Persona).unwrap();
        assert_eq!(doc.get("description"), Some(&json!("Kai")));
    }

    #[test]
    fn fabricate_writes_the_setting_narrative() {
        let (_temp, engine) = engine();
        engine
            .fabricate("mist.novies", FieldValue::Literal("a drowned city".into()))
            .unwrap();

        let doc = engine.inspect("mist.novies", Kind::Narrative).unwrap();
        assert_eq!(doc.get("setting"), Some(&json!("a drowned city")));

        // The namespace is taken; fabricating again collides.
        let err = engine
            .fabricate("mist.novies", FieldValue::Literal("again".into()))
            .unwrap_err();
        assert!(matches!(err, CoreError::NamespaceCollision { .. }));
    }

    #[test]
    fn inspect_missing_document_is_entity_not_found() {
        let (_temp, engine) = engine();
        engine
            .register("w.novies", RegisterRequest::default())
            .unwrap();
        let err = engine.inspect("w.ghost", Kind::Persona).unwrap_err();
        assert!(matches!(err, CoreError::EntityNotFound { .. }));
    }

    #[test]
    fn temp_path_routes_into_temporary_class() {
        let (_temp, engine) = engine();
        engine
            .register("temps.scratch.novies", RegisterRequest::default())
            .unwrap();

        assert!(engine
            .store()
            .collection_exists("scratch", PersistenceClass::Temporary));
        assert!(!engine
            .store()
            .collection_exists("scratch", PersistenceClass::Persistent));
    }

    #[test]
    fn search_matches_ids_and_namespaces() {
        let (_temp, engine) = engine();
        engine
            .register(
                "dune.novies",
                RegisterRequest {
                    personas: vec![FieldValue::Literal("Paul Atreides".into())],
                    ..Default::default()
                },
            )
            .unwrap();
        engine
            .register(
                "other.novies",
                RegisterRequest {
                    personas: vec![FieldValue::Literal("Duncan".into())],
                    ..Default::default()
                },
            )
            .unwrap();

        let hits = engine.search("paul", None, None).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "paul_atreides");

        // Namespace match pulls every document of the work.
        let hits = engine.search("dune", None, None).unwrap();
        assert!(hits.iter().all(|h| h.namespace == "dune"));
        assert!(!hits.is_empty());

        // Kind filter narrows.
        let hits = engine.search("dun", None, Some(Kind::Persona)).unwrap();
        assert!(hits.iter().all(|h| h.kind == Kind::Persona));
    }

    #[test]
    fn run_accumulates_outcome_keys_across_invocations() {
        let (_temp, engine) = engine();
        engine
            .register("w.novies", RegisterRequest::default())
            .unwrap();

        let outcome_a = json!({"kai": "wounded"}).as_object().unwrap().clone();
        engine.run("w.battle", None, "ambush", outcome_a).unwrap();

        let outcome_b = json!({"rei": "escaped"}).as_object().unwrap().clone();
        let stored = engine.run("w.battle", None, "ambush", outcome_b).unwrap();

        assert_eq!(
            stored.get("outcome"),
            Some(&json!({"kai": "wounded", "rei": "escaped"}))
        );
        assert_eq!(stored.get("condition"), Some(&json!("always")));
    }
}
