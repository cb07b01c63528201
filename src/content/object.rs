//! Content-pack objects.
//!
//! Every object a pack can define is identified by its pack, its class and
//! an id unique within that class. `ContentPackObject` is the tagged union
//! over the concrete record types:
//!
//! - `PieceType`: what a piece is (value, tags, links to its rules)
//! - `PieceClass`: grouping of piece types
//! - `RuleObject`: MoveSet, SpecialMove or Macro, each carrying a callable

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::rules::Rule;

/// Well-known tag names interpreted by the engine.
pub mod tags {
    /// Marks the empty sentinel piece.
    pub const GHOST: &str = "isGhostPiece";
    pub const UNTAKEABLE: &str = "isUntakeable";
    pub const IMMOBILE: &str = "isImmobile";
    pub const CAN_JUMP: &str = "canJump";
    pub const UNJUMPABLE: &str = "isUnjumpable";
    pub const LIABLE_FOR_EN_PASSANT: &str = "isLiableForEnPassant";
}

/// The kinds of object a content pack may define.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectClass {
    PieceType,
    PieceClass,
    MoveSet,
    SpecialMove,
    Macro,
}

impl ObjectClass {
    /// Load order within a pack.
    pub const ALL: [ObjectClass; 5] = [
        ObjectClass::PieceType,
        ObjectClass::PieceClass,
        ObjectClass::MoveSet,
        ObjectClass::SpecialMove,
        ObjectClass::Macro,
    ];

    /// Directory name, and the JSON field name that references this class.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            ObjectClass::PieceType => "pieceType",
            ObjectClass::PieceClass => "pieceClass",
            ObjectClass::MoveSet => "moveSet",
            ObjectClass::SpecialMove => "specialMove",
            ObjectClass::Macro => "macro",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.key() == key)
    }

    /// Does an object of this class carry a rule callable?
    #[must_use]
    pub const fn has_rule(self) -> bool {
        matches!(
            self,
            ObjectClass::MoveSet | ObjectClass::SpecialMove | ObjectClass::Macro
        )
    }
}

impl std::fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Fully qualified object identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub pack: String,
    pub class: ObjectClass,
    pub id: String,
}

impl ObjectKey {
    #[must_use]
    pub fn new(pack: impl Into<String>, class: ObjectClass, id: impl Into<String>) -> Self {
        Self {
            pack: pack.into(),
            class,
            id: id.into(),
        }
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.pack, self.class, self.id)
    }
}

/// Static definition of a kind of piece.
///
/// ## Example
///
/// ```
/// use rust_gridrules::content::PieceType;
///
/// let rook = PieceType::new("orthochess", "rook", "Rook")
///     .with_shorthand('r')
///     .with_point_value(5)
///     .with_tag("canJump", false);
///
/// assert_eq!(rook.point_value, 5);
/// assert!(!rook.has_tag("canJump"));
/// assert!(!rook.has_tag("isImmobile"));
/// ```
#[derive(Clone, Debug)]
pub struct PieceType {
    pub pack: String,
    pub id: String,
    pub name: String,
    pub shorthand: Option<char>,
    pub description: Option<String>,
    pub point_value: i64,
    /// Tag defaults. Absent means false.
    pub tags: FxHashMap<String, bool>,
    pub move_set: Option<Arc<RuleObject>>,
    pub piece_class: Option<Arc<PieceClass>>,
    pub special_move: Option<Arc<RuleObject>>,
}

impl PieceType {
    #[must_use]
    pub fn new(pack: impl Into<String>, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            pack: pack.into(),
            id: id.into(),
            name: name.into(),
            shorthand: None,
            description: None,
            point_value: 0,
            tags: FxHashMap::default(),
            move_set: None,
            piece_class: None,
            special_move: None,
        }
    }

    #[must_use]
    pub fn with_shorthand(mut self, shorthand: char) -> Self {
        self.shorthand = Some(shorthand);
        self
    }

    #[must_use]
    pub fn with_point_value(mut self, value: i64) -> Self {
        self.point_value = value;
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>, value: bool) -> Self {
        self.tags.insert(tag.into(), value);
        self
    }

    #[must_use]
    pub fn with_move_set(mut self, move_set: Arc<RuleObject>) -> Self {
        self.move_set = Some(move_set);
        self
    }

    #[must_use]
    pub fn with_piece_class(mut self, piece_class: Arc<PieceClass>) -> Self {
        self.piece_class = Some(piece_class);
        self
    }

    #[must_use]
    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(&self.pack, ObjectClass::PieceType, &self.id)
    }

    /// Default value of a tag for pieces of this type.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.get(tag).copied().unwrap_or(false)
    }
}

/// A grouping of piece types. Cosmetic for now; rules may inspect it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PieceClass {
    pub pack: String,
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// A MoveSet, SpecialMove or Macro: an object whose behavior is a callable.
#[derive(Clone, Debug)]
pub struct RuleObject {
    pub pack: String,
    pub class: ObjectClass,
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub rule: Rule,
}

impl RuleObject {
    #[must_use]
    pub fn new(pack: impl Into<String>, class: ObjectClass, id: impl Into<String>, rule: Rule) -> Self {
        Self {
            pack: pack.into(),
            class,
            id: id.into(),
            name: None,
            description: None,
            rule,
        }
    }
}

/// Any object held by a content pack.
#[derive(Clone, Debug)]
pub enum ContentPackObject {
    PieceType(Arc<PieceType>),
    PieceClass(Arc<PieceClass>),
    MoveSet(Arc<RuleObject>),
    SpecialMove(Arc<RuleObject>),
    Macro(Arc<RuleObject>),
}

impl ContentPackObject {
    #[must_use]
    pub fn class(&self) -> ObjectClass {
        match self {
            ContentPackObject::PieceType(_) => ObjectClass::PieceType,
            ContentPackObject::PieceClass(_) => ObjectClass::PieceClass,
            ContentPackObject::MoveSet(_) => ObjectClass::MoveSet,
            ContentPackObject::SpecialMove(_) => ObjectClass::SpecialMove,
            ContentPackObject::Macro(_) => ObjectClass::Macro,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            ContentPackObject::PieceType(o) => &o.id,
            ContentPackObject::PieceClass(o) => &o.id,
            ContentPackObject::MoveSet(o)
            | ContentPackObject::SpecialMove(o)
            | ContentPackObject::Macro(o) => &o.id,
        }
    }

    #[must_use]
    pub fn as_piece_type(&self) -> Option<&Arc<PieceType>> {
        match self {
            ContentPackObject::PieceType(o) => Some(o),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_piece_class(&self) -> Option<&Arc<PieceClass>> {
        match self {
            ContentPackObject::PieceClass(o) => Some(o),
            _ => None,
        }
    }

    /// The rule-carrying object, for MoveSet, SpecialMove and Macro.
    #[must_use]
    pub fn as_rule_object(&self) -> Option<&Arc<RuleObject>> {
        match self {
            ContentPackObject::MoveSet(o)
            | ContentPackObject::SpecialMove(o)
            | ContentPackObject::Macro(o) => Some(o),
            _ => None,
        }
    }
}
