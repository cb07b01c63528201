//! Content-pack registry: loading, reference resolution and lookup.
//!
//! ## Layout
//!
//! ```text
//! <dir>/<packId>/pack.json             {"description": "...", "packFormat": 1}
//! <dir>/<packId>/<class>/<file>.json   one object definition per file
//! <dir>/<packId>/<class>/<id>.rule     rule callable name (moveSet, specialMove, macro)
//! ```
//!
//! ## Resolution
//!
//! Loading is two-phase. While definitions are parsed, every `@pack:id`
//! string is checked against the objects registered so far; misses go onto a
//! pending worklist. After every pack has been read, each pending reference
//! is retried exactly once against the complete index. Anything still
//! missing aborts the load. Once every reference is known to resolve, piece
//! types are linked to shared handles of the objects they name.
//!
//! A failed load discards every loaded pack, leaving only the built-in
//! `base` pack.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument};

use super::object::{tags, ContentPackObject, ObjectClass, ObjectKey, PieceClass, PieceType, RuleObject};
use super::reference::Reference;
use super::rules::{Rule, RuleLibrary};
use crate::core::{ContentPackLoadError, LATEST_CONTENT_PACK_FORMAT};

/// Id of the built-in pack that every registry holds.
pub const BASE_PACK_ID: &str = "base";

/// Id of the empty sentinel piece type inside the base pack.
pub const EMPTY_PIECE_TYPE_ID: &str = "empty";

const MANIFEST_FILE: &str = "pack.json";
const DEFINITION_EXTENSION: &str = "json";
const RULE_EXTENSION: &str = "rule";

/// A loaded content pack.
#[derive(Clone, Debug)]
pub struct ContentPack {
    pub id: String,
    pub description: String,
    pub format: u32,
    objects: FxHashMap<ObjectClass, FxHashMap<String, ContentPackObject>>,
}

impl ContentPack {
    #[must_use]
    pub fn new(id: impl Into<String>, description: impl Into<String>, format: u32) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            format,
            objects: FxHashMap::default(),
        }
    }

    /// Add an object, replacing any object of the same class and id.
    pub fn insert(&mut self, object: ContentPackObject) {
        self.objects
            .entry(object.class())
            .or_default()
            .insert(object.id().to_string(), object);
    }

    #[must_use]
    pub fn get(&self, class: ObjectClass, id: &str) -> Option<&ContentPackObject> {
        self.objects.get(&class).and_then(|objects| objects.get(id))
    }

    /// Iterate over the objects of one class.
    pub fn objects(&self, class: ObjectClass) -> impl Iterator<Item = &ContentPackObject> {
        self.objects.get(&class).into_iter().flat_map(|objects| objects.values())
    }

    /// Total number of objects in the pack.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.values().map(|objects| objects.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `pack.json`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Manifest {
    #[serde(default)]
    description: Option<String>,
    pack_format: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PieceTypeDefinition {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    shorthand: Option<char>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    point_value: i64,
    #[serde(default)]
    tags: FxHashMap<String, bool>,
    #[serde(default)]
    move_set: Option<Reference>,
    #[serde(default)]
    piece_class: Option<Reference>,
    #[serde(default)]
    special_move: Option<Reference>,
}

/// PieceClass, MoveSet, SpecialMove and Macro definitions.
#[derive(Debug, Deserialize)]
struct LeafDefinition {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Registry of every loaded content pack.
///
/// ## Example
///
/// ```
/// use rust_gridrules::content::{ContentPackRegistry, ObjectClass};
///
/// let registry = ContentPackRegistry::new();
///
/// // The base pack is always present.
/// let empty = registry.get("base", ObjectClass::PieceType, "empty").unwrap();
/// assert_eq!(empty.id(), "empty");
/// assert!(registry.piece_type("@base:empty").is_some());
/// ```
#[derive(Clone, Debug)]
pub struct ContentPackRegistry {
    packs: FxHashMap<String, ContentPack>,
    rules: RuleLibrary,
    pack_format: u32,
    empty: Arc<PieceType>,
}

impl Default for ContentPackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentPackRegistry {
    /// Create a registry with the built-in rules and only the base pack.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rules(RuleLibrary::with_builtins())
    }

    /// Create a registry resolving rule resources against `rules`.
    #[must_use]
    pub fn with_rules(rules: RuleLibrary) -> Self {
        let empty = Arc::new(
            PieceType::new(BASE_PACK_ID, EMPTY_PIECE_TYPE_ID, "Empty")
                .with_shorthand(crate::core::BASE_SHORTHAND)
                .with_tag(tags::GHOST, true)
                .with_tag(tags::UNTAKEABLE, true)
                .with_tag(tags::IMMOBILE, true),
        );
        let mut registry = Self {
            packs: FxHashMap::default(),
            rules,
            pack_format: LATEST_CONTENT_PACK_FORMAT,
            empty,
        };
        registry.reset();
        registry
    }

    /// Require manifests to declare `format`.
    #[must_use]
    pub fn with_pack_format(mut self, format: u32) -> Self {
        self.pack_format = format;
        self
    }

    pub fn rules(&self) -> &RuleLibrary {
        &self.rules
    }

    /// Register callables here before loading packs that name them.
    pub fn rules_mut(&mut self) -> &mut RuleLibrary {
        &mut self.rules
    }

    /// The empty sentinel piece type.
    #[must_use]
    pub fn empty_piece_type(&self) -> Arc<PieceType> {
        Arc::clone(&self.empty)
    }

    #[must_use]
    pub fn pack(&self, id: &str) -> Option<&ContentPack> {
        self.packs.get(id)
    }

    #[must_use]
    pub fn contains_pack(&self, id: &str) -> bool {
        self.packs.contains_key(id)
    }

    /// Ids of every loaded pack, sorted.
    #[must_use]
    pub fn pack_ids(&self) -> Vec<&str> {
        let mut ids: Vec<_> = self.packs.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    #[must_use]
    pub fn get(&self, pack: &str, class: ObjectClass, id: &str) -> Option<&ContentPackObject> {
        self.packs.get(pack).and_then(|p| p.get(class, id))
    }

    fn get_key(&self, key: &ObjectKey) -> Option<&ContentPackObject> {
        self.get(&key.pack, key.class, &key.id)
    }

    /// Resolve a `@pack:id` string as an object of `class`.
    #[must_use]
    pub fn resolve(&self, reference: &str, class: ObjectClass) -> Option<&ContentPackObject> {
        let reference = Reference::parse(reference)?;
        self.get(&reference.pack, class, &reference.id)
    }

    /// Resolve a `@pack:id` string as a piece type.
    #[must_use]
    pub fn piece_type(&self, reference: &str) -> Option<Arc<PieceType>> {
        self.resolve(reference, ObjectClass::PieceType)
            .and_then(ContentPackObject::as_piece_type)
            .cloned()
    }

    /// Load every pack directory under `dir`.
    ///
    /// On failure the error is logged and returned, and the registry is left
    /// holding only the base pack.
    pub fn load_content_packs(
        &mut self,
        dir: impl AsRef<Path>,
    ) -> Result<&mut Self, ContentPackLoadError> {
        self.load_dir(dir.as_ref())?;
        Ok(self)
    }

    #[instrument(skip(self, dir), fields(dir = %dir.display()))]
    fn load_dir(&mut self, dir: &Path) -> Result<(), ContentPackLoadError> {
        let loaded = PackLoader::new(self).load(dir);
        match loaded {
            Ok(packs) => {
                for pack in packs {
                    info!(pack = %pack.id, objects = pack.len(), "loaded content pack");
                    self.packs.insert(pack.id.clone(), pack);
                }
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "could not load content packs");
                self.reset();
                Err(err)
            }
        }
    }

    /// Drop every pack except base.
    fn reset(&mut self) {
        let mut base = ContentPack::new(BASE_PACK_ID, "Built-in objects.", self.pack_format);
        base.insert(ContentPackObject::PieceType(Arc::clone(&self.empty)));
        self.packs.clear();
        self.packs.insert(BASE_PACK_ID.to_string(), base);
    }
}

/// A parsed definition awaiting linking.
struct StagedObject {
    path: PathBuf,
    value: Value,
    rule: Option<Rule>,
}

/// A reference that missed on the first pass.
struct PendingReference {
    owner: ObjectKey,
    field: String,
    reference: String,
}

/// One `load_content_packs` call. Nothing touches the registry until the
/// whole load has succeeded.
struct PackLoader<'r> {
    registry: &'r ContentPackRegistry,
    manifests: Vec<ContentPack>,
    staged: BTreeMap<ObjectKey, StagedObject>,
    pending: Vec<PendingReference>,
}

impl<'r> PackLoader<'r> {
    fn new(registry: &'r ContentPackRegistry) -> Self {
        Self {
            registry,
            manifests: Vec::new(),
            staged: BTreeMap::new(),
            pending: Vec::new(),
        }
    }

    fn load(mut self, dir: &Path) -> Result<Vec<ContentPack>, ContentPackLoadError> {
        for pack_dir in sorted_entries(dir, |path| path.is_dir())? {
            self.read_pack(&pack_dir)?;
        }
        self.retry_pending()?;
        self.link()
    }

    fn read_pack(&mut self, pack_dir: &Path) -> Result<(), ContentPackLoadError> {
        let pack_id = file_name(pack_dir);
        if pack_id == BASE_PACK_ID {
            return Err(ContentPackLoadError::ReservedPack(pack_id));
        }
        if self.registry.contains_pack(&pack_id) || self.manifests.iter().any(|p| p.id == pack_id) {
            return Err(ContentPackLoadError::DuplicatePack(pack_id));
        }

        let manifest_path = pack_dir.join(MANIFEST_FILE);
        let text = read_to_string(&manifest_path)?;
        let manifest: Manifest = serde_json::from_str(&text).map_err(|source| {
            ContentPackLoadError::Manifest {
                pack: pack_id.clone(),
                source,
            }
        })?;
        if manifest.pack_format != self.registry.pack_format {
            return Err(ContentPackLoadError::PackFormat {
                pack: pack_id,
                found: manifest.pack_format,
                expected: self.registry.pack_format,
            });
        }

        debug!(pack = %pack_id, "reading content pack");
        for class in ObjectClass::ALL {
            let class_dir = pack_dir.join(class.key());
            if class_dir.is_dir() {
                self.read_class(&pack_id, class, &class_dir)?;
            }
        }

        self.manifests.push(ContentPack::new(
            pack_id,
            manifest.description.unwrap_or_else(|| "No description.".to_string()),
            manifest.pack_format,
        ));
        Ok(())
    }

    fn read_class(
        &mut self,
        pack_id: &str,
        class: ObjectClass,
        class_dir: &Path,
    ) -> Result<(), ContentPackLoadError> {
        let definitions = sorted_entries(class_dir, |path| {
            path.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(DEFINITION_EXTENSION)
        })?;

        for path in definitions {
            let text = read_to_string(&path)?;
            let value: Value = serde_json::from_str(&text).map_err(|source| {
                ContentPackLoadError::Definition {
                    path: path.clone(),
                    source,
                }
            })?;
            let id = match value.get("id").and_then(Value::as_str) {
                Some(id) if !id.is_empty() => id.to_string(),
                _ => {
                    return Err(ContentPackLoadError::InvalidDefinition {
                        path,
                        reason: "missing string field 'id'".to_string(),
                    })
                }
            };
            let key = ObjectKey::new(pack_id, class, &id);

            let mut references = Vec::new();
            collect_references(&value, "", &mut references);
            for (field, reference) in references {
                if self.lookup(&field, &reference).is_none() {
                    debug!(object = %key, %field, %reference, "deferring unresolved reference");
                    self.pending.push(PendingReference {
                        owner: key.clone(),
                        field,
                        reference,
                    });
                }
            }

            let rule = if class.has_rule() {
                Some(self.read_rule(class, class_dir, &id)?)
            } else {
                None
            };

            if self.staged.contains_key(&key) {
                return Err(ContentPackLoadError::DuplicateObject {
                    pack: key.pack,
                    class: class.key(),
                    id: key.id,
                });
            }
            debug!(object = %key, "parsed definition");
            self.staged.insert(key, StagedObject { path, value, rule });
        }
        Ok(())
    }

    /// Read `<id>.rule` and look the named callable up.
    fn read_rule(
        &self,
        class: ObjectClass,
        class_dir: &Path,
        id: &str,
    ) -> Result<Rule, ContentPackLoadError> {
        let path = class_dir.join(format!("{}.{}", id, RULE_EXTENSION));
        let text = fs::read_to_string(&path).map_err(|source| ContentPackLoadError::MissingRule {
            class: class.key(),
            path: path.clone(),
            source,
        })?;
        let name = text.trim();
        self.registry
            .rules
            .get(name)
            .cloned()
            .ok_or_else(|| ContentPackLoadError::UnknownRule {
                class: class.key(),
                id: id.to_string(),
                rule: name.to_string(),
            })
    }

    /// Key of the object `reference` names, if it is known (staged or
    /// previously loaded). The class comes from the referencing field.
    fn lookup(&self, field: &str, reference: &str) -> Option<ObjectKey> {
        let class = ObjectClass::from_key(field)?;
        let key = Reference::parse(reference)?.key(class);
        let known = self.staged.contains_key(&key) || self.registry.get_key(&key).is_some();
        known.then_some(key)
    }

    /// The single extra resolution pass.
    fn retry_pending(&mut self) -> Result<(), ContentPackLoadError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        debug!(count = self.pending.len(), "retrying pending references");
        for pending in &self.pending {
            if self.lookup(&pending.field, &pending.reference).is_none() {
                return Err(ContentPackLoadError::UnresolvedReference {
                    pack: pending.owner.pack.clone(),
                    class: pending.owner.class.key(),
                    id: pending.owner.id.clone(),
                    field: pending.field.clone(),
                    reference: pending.reference.clone(),
                });
            }
        }
        self.pending.clear();
        Ok(())
    }

    /// Build typed objects: leaves first, then piece types linked to them.
    fn link(self) -> Result<Vec<ContentPack>, ContentPackLoadError> {
        let mut linked: FxHashMap<ObjectKey, ContentPackObject> = FxHashMap::default();

        for (key, staged) in &self.staged {
            if key.class == ObjectClass::PieceType {
                continue;
            }
            let definition: LeafDefinition = parse_definition(staged)?;
            let object = match (key.class, &staged.rule) {
                (ObjectClass::PieceClass, _) => ContentPackObject::PieceClass(Arc::new(PieceClass {
                    pack: key.pack.clone(),
                    id: definition.id,
                    name: definition.name,
                    description: definition.description,
                })),
                (class, Some(rule)) => {
                    let mut object = RuleObject::new(&key.pack, class, definition.id, rule.clone());
                    object.name = definition.name;
                    object.description = definition.description;
                    let object = Arc::new(object);
                    match class {
                        ObjectClass::MoveSet => ContentPackObject::MoveSet(object),
                        ObjectClass::SpecialMove => ContentPackObject::SpecialMove(object),
                        _ => ContentPackObject::Macro(object),
                    }
                }
                (class, None) => {
                    return Err(ContentPackLoadError::InvalidDefinition {
                        path: staged.path.clone(),
                        reason: format!("{} object has no rule callable", class),
                    })
                }
            };
            linked.insert(key.clone(), object);
        }

        for (key, staged) in &self.staged {
            if key.class != ObjectClass::PieceType {
                continue;
            }
            let definition: PieceTypeDefinition = parse_definition(staged)?;
            let find = |reference: &Option<Reference>, class: ObjectClass| {
                self.linked_object(&linked, key, reference.as_ref(), class)
            };
            let move_set = find(&definition.move_set, ObjectClass::MoveSet)?
                .and_then(|o| o.as_rule_object().cloned());
            let piece_class = find(&definition.piece_class, ObjectClass::PieceClass)?
                .and_then(|o| o.as_piece_class().cloned());
            let special_move = find(&definition.special_move, ObjectClass::SpecialMove)?
                .and_then(|o| o.as_rule_object().cloned());

            let piece_type = PieceType {
                pack: key.pack.clone(),
                name: definition.name.unwrap_or_else(|| definition.id.clone()),
                id: definition.id,
                shorthand: definition.shorthand,
                description: definition.description,
                point_value: definition.point_value,
                tags: definition.tags,
                move_set,
                piece_class,
                special_move,
            };
            linked.insert(key.clone(), ContentPackObject::PieceType(Arc::new(piece_type)));
        }

        let mut packs = self.manifests;
        for (key, object) in linked {
            if let Some(pack) = packs.iter_mut().find(|p| p.id == key.pack) {
                pack.insert(object);
            }
        }
        Ok(packs)
    }

    fn linked_object(
        &self,
        linked: &FxHashMap<ObjectKey, ContentPackObject>,
        owner: &ObjectKey,
        reference: Option<&Reference>,
        class: ObjectClass,
    ) -> Result<Option<ContentPackObject>, ContentPackLoadError> {
        let Some(reference) = reference else {
            return Ok(None);
        };
        let key = reference.key(class);
        linked
            .get(&key)
            .or_else(|| self.registry.get_key(&key))
            .cloned()
            .map(Some)
            .ok_or_else(|| ContentPackLoadError::UnresolvedReference {
                pack: owner.pack.clone(),
                class: owner.class.key(),
                id: owner.id.clone(),
                field: class.key().to_string(),
                reference: reference.to_string(),
            })
    }
}

fn parse_definition<T: DeserializeOwned>(
    staged: &StagedObject,
) -> Result<T, ContentPackLoadError> {
    T::deserialize(&staged.value).map_err(|err| ContentPackLoadError::InvalidDefinition {
        path: staged.path.clone(),
        reason: err.to_string(),
    })
}

/// Collect every `@`-prefixed string with the name of the field holding it.
/// Array elements take the name of the array's field.
fn collect_references(value: &Value, field: &str, out: &mut Vec<(String, String)>) {
    match value {
        Value::String(s) if Reference::is_reference(s) => out.push((field.to_string(), s.clone())),
        Value::Array(items) => {
            for item in items {
                collect_references(item, field, out);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                collect_references(item, key, out);
            }
        }
        _ => {}
    }
}

fn read_to_string(path: &Path) -> Result<String, ContentPackLoadError> {
    fs::read_to_string(path).map_err(|source| ContentPackLoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Entries of `dir` accepted by `keep`, sorted by file name.
fn sorted_entries(
    dir: &Path,
    keep: impl Fn(&Path) -> bool,
) -> Result<Vec<PathBuf>, ContentPackLoadError> {
    let io_err = |source| ContentPackLoadError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if keep(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
