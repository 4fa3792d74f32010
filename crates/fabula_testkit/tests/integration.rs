//! End-to-end tests driving the engine through whole verb sequences.

use fabula_core::{
    CoreError, FieldValue, Kind, MergeStrategy, PersistenceClass, RegisterRequest,
};
use fabula_testkit::prelude::*;
use serde_json::json;
use std::fs;

fn body(value: serde_json::Value) -> fabula_core::Body {
    value.as_object().expect("test body must be an object").clone()
}

#[test]
fn deploying_the_same_namespace_twice_collides() {
    with_engine(|engine| {
        engine.deploy("dune.novies", None, None).unwrap();
        let err = engine.deploy("dune.novies", None, None).unwrap_err();
        assert!(matches!(err, CoreError::NamespaceCollision { .. }));
    });
}

#[test]
fn register_then_inspect_round_trips() {
    with_engine(|engine| {
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
    });
}

#[test]
fn strict_refuses_an_occupied_slot_overlay_replaces_it() {
    with_engine(|engine| {
        engine.register("w.novies", RegisterRequest::default()).unwrap();
        engine
            .write_document(
                "w.kai",
                Kind::Persona,
                body(json!({"role": "scout"})),
                MergeStrategy::Overlay,
                None,
            )
            .unwrap();

        let err = engine
            .write_document(
                "w.kai",
                Kind::Persona,
                body(json!({"role": "captain"})),
                MergeStrategy::Strict,
                None,
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::MergeConflict { .. }));

        let replaced = engine
            .write_document(
                "w.kai",
                Kind::Persona,
                body(json!({"role": "captain"})),
                MergeStrategy::Overlay,
                None,
            )
            .unwrap();
        assert_eq!(replaced.get("role"), Some(&json!("captain")));
    });
}

#[test]
fn patch_recurses_into_nested_objects() {
    with_engine(|engine| {
        engine.register("w.novies", RegisterRequest::default()).unwrap();
        engine
            .write_document(
                "w.kai",
                Kind::Persona,
                body(json!({"traits": {"a": 1}, "x": 5})),
                MergeStrategy::Overlay,
                None,
            )
            .unwrap();
        let merged = engine
            .write_document(
                "w.kai",
                Kind::Persona,
                body(json!({"traits": {"b": 2}, "x": 9})),
                MergeStrategy::Patch,
                None,
            )
            .unwrap();

        assert_eq!(merged.get("traits"), Some(&json!({"a": 1, "b": 2})));
        assert_eq!(merged.get("x"), Some(&json!(9)));
    });
}

#[test]
fn mix_takes_weighted_sums_of_numeric_keys() {
    with_engine(|engine| {
        engine.register("a.novies", RegisterRequest::default()).unwrap();
        engine.register("b.novies", RegisterRequest::default()).unwrap();
        engine
            .write_document(
                "a.physics",
                Kind::Ruleset,
                body(json!({"power": 10.0})),
                MergeStrategy::Overlay,
                None,
            )
            .unwrap();
        engine
            .write_document(
                "b.physics",
                Kind::Ruleset,
                body(json!({"power": 20.0})),
                MergeStrategy::Overlay,
                None,
            )
            .unwrap();

        let mixed = engine
            .mix(
                &["a.physics", "b.physics"],
                &[0.6, 0.4],
                Kind::Ruleset,
                "blend.physics",
            )
            .unwrap();
        assert_eq!(mixed.get("power"), Some(&json!(14.0)));
    });
}

#[test]
fn mix_records_normalized_weights_and_sources() {
    with_engine(|engine| {
        engine.register("a.novies", RegisterRequest::default()).unwrap();
        engine.register("b.novies", RegisterRequest::default()).unwrap();
        engine
            .write_document(
                "a.law",
                Kind::Ruleset,
                body(json!({"name": "entropy"})),
                MergeStrategy::Overlay,
                None,
            )
            .unwrap();
        engine
            .write_document(
                "b.law",
                Kind::Ruleset,
                body(json!({"name": "gravity"})),
                MergeStrategy::Overlay,
                None,
            )
            .unwrap();

        let mixed = engine
            .mix(&["a.law", "b.law"], &[3.0, 1.0], Kind::Ruleset, "blend.law")
            .unwrap();

        assert_eq!(mixed.get("weights"), Some(&json!([0.75, 0.25])));
        assert_eq!(mixed.get("mixed_from"), Some(&json!(["a/law", "b/law"])));
        // Non-numeric key goes to the heaviest source.
        assert_eq!(mixed.get("name"), Some(&json!("entropy")));
    });
}

#[test]
fn mix_refuses_an_occupied_target() {
    with_engine(|engine| {
        engine.register("a.novies", RegisterRequest::default()).unwrap();
        engine
            .write_document(
                "a.law",
                Kind::Ruleset,
                body(json!({"k": 1})),
                MergeStrategy::Overlay,
                None,
            )
            .unwrap();

        engine
            .mix(&["a.law"], &[1.0], Kind::Ruleset, "blend.law")
            .unwrap();
        let err = engine
            .mix(&["a.law"], &[1.0], Kind::Ruleset, "blend.law")
            .unwrap_err();
        assert!(matches!(err, CoreError::TargetExists { .. }));
    });
}

#[test]
fn mirror_stamps_lineage_onto_the_variant() {
    let workspace = scenarios::registered_work("dune");
    let variant = workspace
        .mirror(
            "dune.novies",
            "kai",
            FieldValue::Literal("dies at the gate".into()),
            "kai_fallen",
            MergeStrategy::Overlay,
        )
        .unwrap();

    assert_eq!(variant.get("mirror_of"), Some(&json!("kai")));
    assert_eq!(variant.get("fate_change"), Some(&json!("dies at the gate")));
    // The source persona is untouched.
    let source = workspace.inspect("dune.kai", Kind::Persona).unwrap();
    assert!(!source.contains_key("mirror_of"));
}

#[test]
fn transmute_copies_documents_byte_for_byte_and_records_lineage() {
    let workspace = scenarios::registered_work("dune");
    workspace
        .transmute("dune.novies", "dune_v2", "a darker retelling")
        .unwrap();

    let store = workspace.store();
    let source = store
        .open_collection("dune", PersistenceClass::Persistent)
        .unwrap();
    let target = store
        .open_collection("dune_v2", PersistenceClass::Persistent)
        .unwrap();

    for kind in Kind::ALL {
        for id in store.list_ids(&source, kind).unwrap() {
            let file = format!("{}.json", id);
            let original = fs::read(source.path().join(kind.dir_name()).join(&file)).unwrap();
            let copied = fs::read(target.path().join(kind.dir_name()).join(&file)).unwrap();
            assert_eq!(original, copied, "{}/{} diverged", kind.dir_name(), id);
        }
    }

    let manifest = store.read_manifest(&target).unwrap();
    assert_eq!(manifest.derived_from.as_deref(), Some("dune"));
    assert_eq!(manifest.lineage_desc.as_deref(), Some("a darker retelling"));
}

#[test]
fn clear_temporary_leaves_persistent_works_alone() {
    with_engine(|engine| {
        engine.register("keep.novies", RegisterRequest::default()).unwrap();
        engine
            .register("temps.scratch.novies", RegisterRequest::default())
            .unwrap();
        engine
            .register("temps.draft.novies", RegisterRequest::default())
            .unwrap();

        assert_eq!(engine.clear_temporary().unwrap(), 2);
        assert!(engine
            .store()
            .collection_exists("keep", PersistenceClass::Persistent));
        assert!(!engine
            .store()
            .collection_exists("scratch", PersistenceClass::Temporary));
    });
}

#[test]
fn update_branches_into_a_new_work_when_asked() {
    let workspace = scenarios::registered_work("dune");

    // A collection-shaped source tree with one extra persona.
    let source = tempfile::tempdir().unwrap();
    let personas = source.path().join("personas");
    fs::create_dir_all(&personas).unwrap();
    fs::write(
        personas.join("vera.json"),
        serde_json::to_vec_pretty(&json!({"description": "a smuggler"})).unwrap(),
    )
    .unwrap();

    let branched = workspace
        .update(
            "dune.novies",
            source.path(),
            MergeStrategy::Overlay,
            Some("dune_branch"),
        )
        .unwrap();
    assert_eq!(branched.qualified_name(), "dune_branch");

    // The branch holds both the copied and the imported personas.
    let doc = workspace.inspect("dune_branch.vera", Kind::Persona).unwrap();
    assert_eq!(doc.get("description"), Some(&json!("a smuggler")));
    workspace.inspect("dune_branch.kai", Kind::Persona).unwrap();
    // The original work did not gain the new persona.
    assert!(workspace.inspect("dune.vera", Kind::Persona).is_err());
}
