//! Scenario files.
//!
//! A scenario names the content packs it needs, its players and play order,
//! a shorthand table of piece types, and the starting board:
//!
//! ```json
//! {
//!     "name": "Pawn race",
//!     "contentPacks": ["orthochess"],
//!     "players": {
//!         "1": {"id": "white", "name": "White", "isUserControlled": true, "playDirection": "NORTH"},
//!         "2": {"id": "black", "name": "Black", "isUserControlled": true, "playDirection": "SOUTH"}
//!     },
//!     "playOrder": "12",
//!     "pieces": {"p": "@orthochess:pawn"},
//!     "boardWidth": 2,
//!     "boardHeight": 3,
//!     "board": "2p* 00 00 00 1p* 00"
//! }
//! ```
//!
//! Board tokens are `[player][piece]` with an optional `*` marking a vital
//! piece. `0` is the base player and the empty piece; a `0` on either side
//! must be matched by a `0` on the other.
//!
//! Sections are validated in order and the first failure aborts the load.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::turn::TurnOrder;
use crate::board::{Board, Piece};
use crate::content::{ContentPackRegistry, PieceType};
use crate::core::{
    Coord, GameLoadError, PlayDirection, Player, PlayerId, Roster, BASE_PLAYER_ID, BASE_SHORTHAND,
};

/// Marks a vital piece in a board token.
pub const VITAL_MARKER: char = '*';

/// Cosmetic scenario metadata, stored as given.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScenarioInfo {
    pub name: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerSpec {
    id: String,
    name: String,
    is_user_controlled: bool,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    play_direction: Option<PlayDirection>,
    #[serde(default)]
    gold: Option<i64>,
}

/// Everything a validated scenario produces.
#[derive(Debug)]
pub(crate) struct Setup {
    pub info: ScenarioInfo,
    pub content_packs: Vec<String>,
    pub roster: Roster,
    pub turns: TurnOrder,
    pub board: Board,
}

/// Validate `json` against `registry` and build the game state it describes.
pub(crate) fn parse(json: &str, registry: &ContentPackRegistry) -> Result<Setup, GameLoadError> {
    let root: Map<String, Value> = serde_json::from_str(json)?;

    let info = ScenarioInfo {
        name: text(&root, "name"),
        description: text(&root, "description"),
        author: text(&root, "author"),
    };

    let content_packs: Vec<String> = section(&root, "contentPacks")?;
    if let Some(missing) = content_packs.iter().find(|p| !registry.contains_pack(p)) {
        return Err(GameLoadError::MissingContentPack(missing.clone()));
    }

    let (mut roster, players) = load_players(&root)?;
    let turns = load_play_order(&root, &roster, &players)?;
    let pieces = load_pieces(&root, registry)?;

    let board = load_board(&root, registry.empty_piece_type(), &mut roster, &players, &pieces)?;

    Ok(Setup {
        info,
        content_packs,
        roster,
        turns,
        board,
    })
}

fn text(root: &Map<String, Value>, key: &str) -> Option<String> {
    root.get(key).and_then(Value::as_str).map(str::to_string)
}

fn section<T: DeserializeOwned>(root: &Map<String, Value>, key: &'static str) -> Result<T, GameLoadError> {
    let value = root.get(key).ok_or(GameLoadError::Section(key))?;
    T::deserialize(value).map_err(|_| GameLoadError::Section(key))
}

/// A shorthand key of exactly one character other than `0`.
fn shorthand(key: &str) -> Option<char> {
    let mut chars = key.chars();
    let c = chars.next()?;
    (chars.next().is_none() && c != BASE_SHORTHAND).then_some(c)
}

fn load_players(
    root: &Map<String, Value>,
) -> Result<(Roster, FxHashMap<char, PlayerId>), GameLoadError> {
    let specs: Map<String, Value> = section(root, "players")?;
    if specs.is_empty() {
        return Err(GameLoadError::NoPlayers);
    }

    let mut roster = Roster::new();
    let mut by_shorthand = FxHashMap::default();
    for (key, value) in &specs {
        let c = shorthand(key).ok_or_else(|| GameLoadError::InvalidPlayerShorthand(key.clone()))?;
        let spec = PlayerSpec::deserialize(value).map_err(|e| GameLoadError::InvalidPlayer {
            shorthand: key.clone(),
            reason: e.to_string(),
        })?;
        if spec.id.is_empty() || spec.name.is_empty() {
            return Err(GameLoadError::InvalidPlayer {
                shorthand: key.clone(),
                reason: "id and name must not be empty".to_string(),
            });
        }
        if spec.id == BASE_PLAYER_ID {
            return Err(GameLoadError::DuplicatePlayer(spec.id));
        }

        let mut player = Player::new(&spec.id, spec.name, spec.is_user_controlled).with_shorthand(c);
        if let Some(color) = spec.color {
            player = player.with_color(color);
        }
        if let Some(direction) = spec.play_direction {
            player = player.with_play_direction(direction);
        }
        if let Some(gold) = spec.gold {
            player = player.with_gold(gold);
        }
        let id = roster
            .insert(player)
            .ok_or(GameLoadError::DuplicatePlayer(spec.id))?;
        by_shorthand.insert(c, id);
    }

    if !roster.iter().any(|(_, p)| p.is_user_controlled()) {
        return Err(GameLoadError::NoUserControlledPlayer);
    }
    Ok((roster, by_shorthand))
}

fn load_play_order(
    root: &Map<String, Value>,
    roster: &Roster,
    players: &FxHashMap<char, PlayerId>,
) -> Result<TurnOrder, GameLoadError> {
    let play_order: String = section(root, "playOrder")?;
    if play_order.is_empty() {
        return Err(GameLoadError::Section("playOrder"));
    }
    let mut order = Vec::with_capacity(play_order.len());
    for c in play_order.chars() {
        let id = *players
            .get(&c)
            .ok_or(GameLoadError::UnknownPlayOrderShorthand(c))?;
        if !roster[id].is_user_controlled() {
            return Err(GameLoadError::NpcInPlayOrder(roster[id].id().to_string()));
        }
        order.push(id);
    }
    Ok(TurnOrder::new(order))
}

fn load_pieces(
    root: &Map<String, Value>,
    registry: &ContentPackRegistry,
) -> Result<FxHashMap<char, Arc<PieceType>>, GameLoadError> {
    let table: Map<String, Value> = section(root, "pieces")?;
    let mut pieces: FxHashMap<char, Arc<PieceType>> = FxHashMap::default();
    for (key, value) in &table {
        let c = shorthand(key)
            .filter(|c| !pieces.contains_key(c))
            .ok_or_else(|| GameLoadError::InvalidPieceShorthand(key.clone()))?;
        let reference = value.as_str().ok_or(GameLoadError::Section("pieces"))?;
        let piece_type = registry
            .piece_type(reference)
            .ok_or_else(|| GameLoadError::UnknownPieceType(reference.to_string()))?;
        pieces.insert(c, piece_type);
    }
    Ok(pieces)
}

fn dimension(value: Option<&Value>) -> Option<u32> {
    value
        .and_then(Value::as_u64)
        .filter(|n| *n > 0)
        .and_then(|n| u32::try_from(n).ok())
}

fn load_board(
    root: &Map<String, Value>,
    empty: Arc<PieceType>,
    roster: &mut Roster,
    players: &FxHashMap<char, PlayerId>,
    pieces: &FxHashMap<char, Arc<PieceType>>,
) -> Result<Board, GameLoadError> {
    let (width_value, height_value) = (root.get("boardWidth"), root.get("boardHeight"));
    let dimensions = dimension(width_value)
        .zip(dimension(height_value))
        .filter(|(w, h)| (*w as usize).checked_mul(*h as usize).is_some());
    let Some((width, height)) = dimensions else {
        let show = |v: Option<&Value>| v.map_or_else(|| "undefined".to_string(), Value::to_string);
        return Err(GameLoadError::InvalidDimensions {
            width: show(width_value),
            height: show(height_value),
        });
    };

    let board: String = section(root, "board")?;
    let tokens: Vec<&str> = board.split_whitespace().collect();
    let expected = width as usize * height as usize;
    if tokens.len() != expected {
        return Err(GameLoadError::BoardLength {
            found: tokens.len(),
            expected,
        });
    }

    let mut placed = Vec::with_capacity(expected);
    for (i, token) in tokens.iter().enumerate() {
        let coord = Coord::new((i % width as usize) as i32, (i / width as usize) as i32);
        let piece = parse_token(token, coord, &empty, players, pieces)?;
        if piece.is_vital() {
            roster[piece.owner()].add_vital_piece_count(1);
        }
        placed.push(piece);
    }

    let mut placed = placed.into_iter();
    Ok(Board::new(width, height, Arc::clone(&empty), |_| {
        placed.next().unwrap_or_else(|| Piece::empty(Arc::clone(&empty)))
    }))
}

fn parse_token(
    token: &str,
    coord: Coord,
    empty: &Arc<PieceType>,
    players: &FxHashMap<char, PlayerId>,
    pieces: &FxHashMap<char, Arc<PieceType>>,
) -> Result<Piece, GameLoadError> {
    let invalid = || GameLoadError::InvalidToken {
        token: token.to_string(),
        coord,
    };

    let mut chars = token.chars();
    let (Some(p), Some(t)) = (chars.next(), chars.next()) else {
        return Err(invalid());
    };
    let vital = match chars.as_str() {
        "" => false,
        rest if rest.len() == 1 && rest.starts_with(VITAL_MARKER) => true,
        _ => return Err(invalid()),
    };

    if p == BASE_SHORTHAND || t == BASE_SHORTHAND {
        if p != t || vital {
            return Err(invalid());
        }
        return Ok(Piece::empty(Arc::clone(empty)));
    }

    let owner = *players
        .get(&p)
        .ok_or(GameLoadError::UnknownBoardPlayer { shorthand: p, coord })?;
    let piece_type = pieces
        .get(&t)
        .ok_or(GameLoadError::UnknownBoardPiece { shorthand: t, coord })?;
    Ok(Piece::new(owner, Arc::clone(piece_type))
        .with_shorthand(t)
        .with_vital(vital))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::tags;

    fn registry_with_pawn() -> ContentPackRegistry {
        // Scenario parsing only needs a resolvable piece type; build it by
        // loading a minimal pack from disk.
        let dir = tempfile::tempdir().unwrap();
        let pack = dir.path().join("mini");
        std::fs::create_dir_all(pack.join("pieceType")).unwrap();
        std::fs::write(pack.join("pack.json"), r#"{"packFormat": 1}"#).unwrap();
        std::fs::write(
            pack.join("pieceType").join("pawn.json"),
            r#"{"id": "pawn", "name": "Pawn", "shorthand": "p", "pointValue": 1}"#,
        )
        .unwrap();

        let mut registry = ContentPackRegistry::new();
        registry.load_content_packs(dir.path()).unwrap();
        registry
    }

    fn scenario(board: &str) -> String {
        serde_json::json!({
            "name": "Mini",
            "contentPacks": ["mini"],
            "players": {
                "1": {"id": "white", "name": "White", "isUserControlled": true},
                "2": {"id": "black", "name": "Black", "isUserControlled": true, "playDirection": "SOUTH"}
            },
            "playOrder": "12",
            "pieces": {"p": "@mini:pawn"},
            "boardWidth": 2,
            "boardHeight": 2,
            "board": board
        })
        .to_string()
    }

    #[test]
    fn test_parse_builds_everything() {
        let registry = registry_with_pawn();
        let setup = parse(&scenario("2p* 00 00 1p*"), &registry).unwrap();

        assert_eq!(setup.info.name.as_deref(), Some("Mini"));
        assert_eq!(setup.content_packs, vec!["mini".to_string()]);
        assert_eq!(setup.roster.len(), 3);
        assert_eq!(setup.turns.order().len(), 2);

        let white = setup.roster.find("white").unwrap();
        let black = setup.roster.find("black").unwrap();
        assert_eq!(setup.roster[white].shorthand(), '1');
        assert_eq!(setup.roster[white].vital_piece_count(), 1);
        assert_eq!(setup.roster[black].play_direction(), PlayDirection::South);

        let corner = setup.board.square(Coord::new(1, 1));
        assert_eq!(corner.piece().owner(), white);
        assert!(corner.piece().is_vital());
        assert!(setup.board.square(Coord::new(1, 0)).piece().has_tag(tags::GHOST));
    }

    #[test]
    fn test_token_errors() {
        let registry = registry_with_pawn();

        for board in ["2p* 00 00 1p+", "2p 00 00 1", "2p 10 00 1p", "2p 00* 00 1p"] {
            let err = parse(&scenario(board), &registry).unwrap_err();
            assert!(matches!(err, GameLoadError::InvalidToken { .. }), "{board}: {err}");
        }

        let err = parse(&scenario("3p 00 00 1p"), &registry).unwrap_err();
        assert!(matches!(err, GameLoadError::UnknownBoardPlayer { shorthand: '3', .. }));

        let err = parse(&scenario("2p 00 00 1q"), &registry).unwrap_err();
        assert!(matches!(err, GameLoadError::UnknownBoardPiece { shorthand: 'q', .. }));
    }

    #[test]
    fn test_board_length_mismatch() {
        let registry = registry_with_pawn();
        let err = parse(&scenario("2p 00 1p"), &registry).unwrap_err();
        assert!(matches!(err, GameLoadError::BoardLength { found: 3, expected: 4 }));
    }

    #[test]
    fn test_shorthand_rules() {
        assert_eq!(shorthand("1"), Some('1'));
        assert_eq!(shorthand("0"), None);
        assert_eq!(shorthand("12"), None);
        assert_eq!(shorthand(""), None);
    }

    #[test]
    fn test_dimension_rules() {
        assert_eq!(dimension(Some(&serde_json::json!(8))), Some(8));
        assert_eq!(dimension(Some(&serde_json::json!(0))), None);
        assert_eq!(dimension(Some(&serde_json::json!(-2))), None);
        assert_eq!(dimension(Some(&serde_json::json!(2.5))), None);
        assert_eq!(dimension(Some(&serde_json::json!("8"))), None);
        assert_eq!(dimension(None), None);
    }
}
