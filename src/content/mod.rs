//! Content packs: data-driven rule definitions.
//!
//! ## Key Types
//!
//! - `ObjectClass`: the kinds of object a pack may define
//! - `ContentPackObject`: tagged union over `PieceType`, `PieceClass` and
//!   `RuleObject` (MoveSet, SpecialMove, Macro)
//! - `Reference`: `@pack:id` cross-object reference
//! - `RuleLibrary`: named rule callables that packs attach to rule objects
//! - `ContentPackRegistry`: loads pack directories and resolves references

pub mod object;
pub mod reference;
pub mod registry;
pub mod rules;

pub use object::{tags, ContentPackObject, ObjectClass, ObjectKey, PieceClass, PieceType, RuleObject};
pub use reference::Reference;
pub use registry::{ContentPack, ContentPackRegistry, BASE_PACK_ID, EMPTY_PIECE_TYPE_ID};
pub use rules::{pawnlike, Rule, RuleContext, RuleFn, RuleLibrary};
