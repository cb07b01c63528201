//! Cross-object references: `@<packId>:<objectId>`.
//!
//! A reference stands in for an object inside a JSON definition. The class
//! of the referenced object is implied by the field that holds it.

use serde::{Deserialize, Serialize};

use super::object::{ObjectClass, ObjectKey};

/// Prefix marking a string value as a reference.
pub const REFERENCE_PREFIX: char = '@';

/// A parsed `@pack:id` reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Reference {
    pub pack: String,
    pub id: String,
}

impl Reference {
    /// Does this string look like a reference?
    #[must_use]
    pub fn is_reference(value: &str) -> bool {
        value.starts_with(REFERENCE_PREFIX)
    }

    /// Parse `@pack:id`. Returns `None` if either half is missing.
    ///
    /// ```
    /// use rust_gridrules::content::Reference;
    ///
    /// let r = Reference::parse("@orthochess:pawn").unwrap();
    /// assert_eq!(r.pack, "orthochess");
    /// assert_eq!(r.id, "pawn");
    /// assert!(Reference::parse("orthochess:pawn").is_none());
    /// ```
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let body = value.strip_prefix(REFERENCE_PREFIX)?;
        let (pack, id) = body.split_once(':')?;
        if pack.is_empty() || id.is_empty() {
            return None;
        }
        Some(Self {
            pack: pack.to_string(),
            id: id.to_string(),
        })
    }

    /// Qualify with the class implied by the referencing field.
    #[must_use]
    pub fn key(&self, class: ObjectClass) -> ObjectKey {
        ObjectKey::new(&self.pack, class, &self.id)
    }
}

impl TryFrom<String> for Reference {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("malformed reference '{}'", value))
    }
}

impl From<Reference> for String {
    fn from(r: Reference) -> Self {
        r.to_string()
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}:{}", REFERENCE_PREFIX, self.pack, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_partial_references() {
        assert!(Reference::parse("@orthochess").is_none());
        assert!(Reference::parse("@:pawn").is_none());
        assert!(Reference::parse("@orthochess:").is_none());
    }

    #[test]
    fn test_display() {
        let r = Reference::parse("@base:empty").unwrap();
        assert_eq!(r.to_string(), "@base:empty");
        assert_eq!(r.key(ObjectClass::PieceType).to_string(), "base:pieceType:empty");
    }

    #[test]
    fn test_deserialize() {
        let r: Reference = serde_json::from_str("\"@orthochess:pawnlike\"").unwrap();
        assert_eq!(r.id, "pawnlike");
        assert!(serde_json::from_str::<Reference>("\"pawnlike\"").is_err());
    }

    #[test]
    fn test_is_reference() {
        assert!(Reference::is_reference("@anything"));
        assert!(!Reference::is_reference("plain"));
    }
}
