//! Content-pack loading tests.
//!
//! These tests verify:
//! - Two-pass reference resolution (forward and cross-pack references)
//! - Rule resources resolving against the rule library
//! - Whole-load failure leaving only the base pack

mod common;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use rust_gridrules::content::{tags, ContentPackRegistry, ObjectClass, RuleContext};
use rust_gridrules::core::ContentPackLoadError;

fn registry() -> ContentPackRegistry {
    let mut registry = ContentPackRegistry::new();
    registry.rules_mut().register("kinglike", common::kinglike);
    registry
}

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// A pack directory with a manifest and one pawn-like move set.
fn minimal_pack(root: &Path, id: &str) {
    let pack = root.join(id);
    write(&pack.join("pack.json"), r#"{"description": "test", "packFormat": 1}"#);
    write(&pack.join("moveSet").join("step.json"), r#"{"id": "step"}"#);
    write(&pack.join("moveSet").join("step.rule"), "pawnlike\n");
}

#[test]
fn test_load_fixture_packs() {
    let mut registry = registry();
    registry.load_content_packs(common::content_packs()).unwrap();

    assert_eq!(registry.pack_ids(), vec!["base", "fairy", "orthochess"]);

    let orthochess = registry.pack("orthochess").unwrap();
    assert_eq!(orthochess.description, "Orthodox chess pieces.");
    assert_eq!(orthochess.objects(ObjectClass::PieceType).count(), 3);
    assert_eq!(orthochess.objects(ObjectClass::MoveSet).count(), 2);
    assert_eq!(orthochess.objects(ObjectClass::PieceClass).count(), 2);

    let pawn = registry.piece_type("@orthochess:pawn").unwrap();
    assert_eq!(pawn.name, "Pawn");
    assert_eq!(pawn.shorthand, Some('p'));
    assert_eq!(pawn.point_value, 1);
    assert_eq!(pawn.move_set.as_ref().unwrap().rule.name(), "pawnlike");
    assert_eq!(pawn.piece_class.as_ref().unwrap().id, "infantry");
    assert!(pawn.special_move.is_none());

    let wall = registry.piece_type("@orthochess:wall").unwrap();
    assert!(wall.move_set.is_none());
    assert!(wall.has_tag(tags::IMMOBILE));
    assert!(wall.has_tag(tags::UNJUMPABLE));
    assert!(!wall.has_tag(tags::CAN_JUMP));
}

#[test]
fn test_cross_pack_forward_reference() {
    // "fairy" is read before "orthochess", so its references only resolve
    // on the retry pass.
    let mut registry = registry();
    registry.load_content_packs(common::content_packs()).unwrap();

    let sergeant = registry.piece_type("@fairy:sergeant").unwrap();
    let pawn = registry.piece_type("@orthochess:pawn").unwrap();

    let sergeant_moves = sergeant.move_set.as_ref().unwrap();
    let pawn_moves = pawn.move_set.as_ref().unwrap();
    assert!(Arc::ptr_eq(sergeant_moves, pawn_moves));
    assert!(Arc::ptr_eq(
        sergeant.piece_class.as_ref().unwrap(),
        pawn.piece_class.as_ref().unwrap()
    ));
    assert!(sergeant.has_tag(tags::CAN_JUMP));
}

#[test]
fn test_reference_into_previous_load() {
    let mut registry = registry();
    let first = tempfile::tempdir().unwrap();
    minimal_pack(first.path(), "steps");
    registry.load_content_packs(first.path()).unwrap();

    let second = tempfile::tempdir().unwrap();
    write(&second.path().join("later").join("pack.json"), r#"{"packFormat": 1}"#);
    write(
        &second.path().join("later").join("pieceType").join("walker.json"),
        r#"{"id": "walker", "name": "Walker", "moveSet": "@steps:step"}"#,
    );
    registry.load_content_packs(second.path()).unwrap();

    let walker = registry.piece_type("@later:walker").unwrap();
    assert_eq!(walker.move_set.as_ref().unwrap().id, "step");
    assert_eq!(registry.pack("later").unwrap().description, "No description.");
}

#[test]
fn test_non_json_files_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    minimal_pack(dir.path(), "steps");
    write(&dir.path().join("steps").join("moveSet").join("README.md"), "notes");

    let mut registry = registry();
    registry.load_content_packs(dir.path()).unwrap();
    assert_eq!(registry.pack("steps").unwrap().len(), 1);
}

#[test]
fn test_failed_load_leaves_only_base() {
    let mut registry = registry();
    registry.load_content_packs(common::content_packs()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join("broken").join("pack.json"), "{ not json");

    let err = registry.load_content_packs(dir.path()).unwrap_err();
    assert!(matches!(err, ContentPackLoadError::Manifest { ref pack, .. } if pack == "broken"));
    assert_eq!(registry.pack_ids(), vec!["base"]);
    assert!(registry.piece_type("@base:empty").is_some());
}

#[test]
fn test_wrong_pack_format() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join("future").join("pack.json"), r#"{"packFormat": 2}"#);

    let err = registry().load_content_packs(dir.path()).unwrap_err();
    assert!(matches!(
        err,
        ContentPackLoadError::PackFormat { found: 2, expected: 1, .. }
    ));
}

#[test]
fn test_configured_pack_format() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join("future").join("pack.json"), r#"{"packFormat": 2}"#);

    let mut registry = ContentPackRegistry::new().with_pack_format(2);
    registry.load_content_packs(dir.path()).unwrap();
    assert!(registry.contains_pack("future"));
}

#[test]
fn test_missing_rule_resource() {
    let dir = tempfile::tempdir().unwrap();
    minimal_pack(dir.path(), "steps");
    fs::remove_file(dir.path().join("steps").join("moveSet").join("step.rule")).unwrap();

    let err = registry().load_content_packs(dir.path()).unwrap_err();
    assert!(matches!(err, ContentPackLoadError::MissingRule { class: "moveSet", .. }));
}

#[test]
fn test_unknown_rule_callable() {
    let dir = tempfile::tempdir().unwrap();
    minimal_pack(dir.path(), "steps");
    write(&dir.path().join("steps").join("moveSet").join("step.rule"), "teleport");

    let err = registry().load_content_packs(dir.path()).unwrap_err();
    assert!(matches!(err, ContentPackLoadError::UnknownRule { ref rule, .. } if rule == "teleport"));
}

#[test]
fn test_registered_rule_callable() {
    let dir = tempfile::tempdir().unwrap();
    minimal_pack(dir.path(), "steps");
    write(&dir.path().join("steps").join("moveSet").join("step.rule"), "teleport");

    let mut registry = registry();
    registry
        .rules_mut()
        .register("teleport", |ctx: &RuleContext<'_>| vec![ctx.relative(0, -3)]);
    registry.load_content_packs(dir.path()).unwrap();

    let step = registry.resolve("@steps:step", ObjectClass::MoveSet).unwrap();
    assert_eq!(step.as_rule_object().unwrap().rule.name(), "teleport");
}

#[test]
fn test_unresolved_reference() {
    let dir = tempfile::tempdir().unwrap();
    minimal_pack(dir.path(), "steps");
    write(
        &dir.path().join("steps").join("pieceType").join("ghost.json"),
        r#"{"id": "ghost", "name": "Ghost", "moveSet": "@steps:float"}"#,
    );

    let err = registry().load_content_packs(dir.path()).unwrap_err();
    match err {
        ContentPackLoadError::UnresolvedReference { id, field, reference, .. } => {
            assert_eq!(id, "ghost");
            assert_eq!(field, "moveSet");
            assert_eq!(reference, "@steps:float");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_reference_class_comes_from_field() {
    // "step" exists, but as a move set, not a piece class.
    let dir = tempfile::tempdir().unwrap();
    minimal_pack(dir.path(), "steps");
    write(
        &dir.path().join("steps").join("pieceType").join("odd.json"),
        r#"{"id": "odd", "name": "Odd", "pieceClass": "@steps:step"}"#,
    );

    let err = registry().load_content_packs(dir.path()).unwrap_err();
    assert!(matches!(err, ContentPackLoadError::UnresolvedReference { .. }));
}

#[test]
fn test_malformed_definition() {
    let dir = tempfile::tempdir().unwrap();
    minimal_pack(dir.path(), "steps");
    write(&dir.path().join("steps").join("pieceClass").join("bad.json"), "[1, 2");

    let err = registry().load_content_packs(dir.path()).unwrap_err();
    assert!(matches!(err, ContentPackLoadError::Definition { .. }));
}

#[test]
fn test_definition_without_id() {
    let dir = tempfile::tempdir().unwrap();
    minimal_pack(dir.path(), "steps");
    write(
        &dir.path().join("steps").join("pieceClass").join("anon.json"),
        r#"{"name": "Anonymous"}"#,
    );

    let err = registry().load_content_packs(dir.path()).unwrap_err();
    assert!(matches!(err, ContentPackLoadError::InvalidDefinition { .. }));
}

#[test]
fn test_duplicate_object_id() {
    let dir = tempfile::tempdir().unwrap();
    minimal_pack(dir.path(), "steps");
    write(&dir.path().join("steps").join("pieceClass").join("a.json"), r#"{"id": "same"}"#);
    write(&dir.path().join("steps").join("pieceClass").join("b.json"), r#"{"id": "same"}"#);

    let err = registry().load_content_packs(dir.path()).unwrap_err();
    assert!(matches!(err, ContentPackLoadError::DuplicateObject { ref id, .. } if id == "same"));
}

#[test]
fn test_reserved_and_duplicate_packs() {
    let dir = tempfile::tempdir().unwrap();
    minimal_pack(dir.path(), "base");
    let err = registry().load_content_packs(dir.path()).unwrap_err();
    assert!(matches!(err, ContentPackLoadError::ReservedPack(_)));

    let dir = tempfile::tempdir().unwrap();
    minimal_pack(dir.path(), "steps");
    let mut registry = registry();
    registry.load_content_packs(dir.path()).unwrap();
    let err = registry.load_content_packs(dir.path()).unwrap_err();
    assert!(matches!(err, ContentPackLoadError::DuplicatePack(ref id) if id == "steps"));
}

#[test]
fn test_missing_directory() {
    let err = registry()
        .load_content_packs(common::fixtures().join("does-not-exist"))
        .unwrap_err();
    assert!(matches!(err, ContentPackLoadError::Io { .. }));
}
