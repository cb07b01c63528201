//! The game orchestrator.
//!
//! `Game` owns the content-pack registry, the players, the turn order and the
//! board. Every state change goes through `load_game`, `attempt_move`,
//! `eliminate` or the turn controls here.
//!
//! ## Move pipeline
//!
//! `attempt_move` runs its checks in a fixed order and stops at the first
//! failure, returning one comment and changing nothing:
//!
//! 1. the game is not over
//! 2. the player has not lost
//! 3. it is the player's turn
//! 4. the start square holds one of the player's pieces
//! 5. that piece is not immobile
//! 6. the destination is among the piece's reachable squares
//!
//! Faults raised while checking (including a panicking rule callable) are
//! reported as a runtime-error comment instead.

use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use tracing::{debug, error, info, instrument};

use super::scenario::{self, ScenarioInfo, Setup};
use super::turn::TurnOrder;
use crate::board::{Board, Piece, Square};
use crate::content::{ContentPackObject, ContentPackRegistry, ObjectClass, RuleContext};
use crate::core::{
    ContentPackLoadError, Coord, EngineConfig, GameLoadError, Player, PlayerId, Roster, StateFault,
    BASE_SHORTHAND,
};

/// Result of `Game::attempt_move`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    pub success: bool,
    pub comments: Vec<String>,
}

impl MoveOutcome {
    fn rejected(comment: String) -> Self {
        Self {
            success: false,
            comments: vec![comment],
        }
    }
}

/// A game in progress.
///
/// ## Example
///
/// ```no_run
/// use rust_gridrules::core::Coord;
/// use rust_gridrules::game::Game;
///
/// let mut game = Game::new();
/// game.load_content_packs("contentpacks")?;
/// game.load_game("scenarios/orthochess.json")?;
///
/// let white = game.player_id("white").unwrap();
/// let outcome = game.attempt_move(white, Coord::new(4, 6), Coord::new(4, 4))?;
/// assert!(outcome.success);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct Game {
    config: EngineConfig,
    registry: ContentPackRegistry,
    info: ScenarioInfo,
    content_packs: Vec<String>,
    roster: Roster,
    turns: TurnOrder,
    board: Board,
    won: bool,
    winner: Option<PlayerId>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Create a game with the default configuration and no scenario.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        let registry = ContentPackRegistry::new().with_pack_format(config.pack_format);
        let board = Board::empty(registry.empty_piece_type());
        Self {
            config,
            registry,
            info: ScenarioInfo::default(),
            content_packs: Vec::new(),
            roster: Roster::new(),
            turns: TurnOrder::default(),
            board,
            won: false,
            winner: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &ContentPackRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ContentPackRegistry {
        &mut self.registry
    }

    /// Make a rule callable available to content packs loaded afterwards.
    pub fn register_rule<F>(&mut self, name: &str, rule: F) -> &mut Self
    where
        F: Fn(&RuleContext<'_>) -> Vec<Coord> + Send + Sync + 'static,
    {
        self.registry.rules_mut().register(name, rule);
        self
    }

    /// Load every content pack under `dir` into the registry.
    pub fn load_content_packs(
        &mut self,
        dir: impl AsRef<Path>,
    ) -> Result<&mut Self, ContentPackLoadError> {
        self.registry.load_content_packs(dir)?;
        Ok(self)
    }

    /// Look an object up by pack, class and id.
    pub fn content_pack_object(
        &self,
        pack: &str,
        class: ObjectClass,
        id: &str,
    ) -> Option<&ContentPackObject> {
        self.registry.get(pack, class, id)
    }

    /// Load a scenario file.
    ///
    /// The game is replaced only if every section validates; on failure it
    /// is left as it was.
    pub fn load_game(&mut self, path: impl AsRef<Path>) -> Result<&mut Self, GameLoadError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| {
            let err = GameLoadError::Io {
                path: path.to_path_buf(),
                source,
            };
            error!(error = %err, "could not load game");
            err
        })?;
        self.load_game_str(&json)
    }

    /// Load a scenario from a JSON string.
    #[instrument(skip_all)]
    pub fn load_game_str(&mut self, json: &str) -> Result<&mut Self, GameLoadError> {
        match scenario::parse(json, &self.registry) {
            Ok(setup) => {
                self.install(setup);
                info!(
                    scenario = self.info.name.as_deref().unwrap_or("unnamed"),
                    players = self.roster.len() - 1,
                    width = self.board.width(),
                    height = self.board.height(),
                    "loaded game"
                );
                Ok(self)
            }
            Err(err) => {
                error!(error = %err, "could not load game");
                Err(err)
            }
        }
    }

    fn install(&mut self, setup: Setup) {
        self.info = setup.info;
        self.content_packs = setup.content_packs;
        self.roster = setup.roster;
        self.turns = setup.turns;
        self.board = setup.board;
        self.won = false;
        self.winner = None;
    }

    pub fn info(&self) -> &ScenarioInfo {
        &self.info
    }

    /// Packs the loaded scenario declared.
    pub fn content_packs(&self) -> &[String] {
        &self.content_packs
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The square at `coord`, or the nonexistent square off the board.
    pub fn square(&self, coord: Coord) -> &Square {
        self.board.square(coord)
    }

    pub fn square_mut(&mut self, coord: Coord) -> Option<&mut Square> {
        self.board.square_mut(coord)
    }

    pub fn players(&self) -> &Roster {
        &self.roster
    }

    pub fn player(&self, player: PlayerId) -> Option<&Player> {
        self.roster.get(player)
    }

    pub fn player_by_id(&self, id: &str) -> Option<&Player> {
        self.roster.find(id).map(|p| &self.roster[p])
    }

    pub fn player_id(&self, id: &str) -> Option<PlayerId> {
        self.roster.find(id)
    }

    /// Whose turn it is.
    pub fn current_player(&self) -> Option<PlayerId> {
        self.turns.current()
    }

    pub fn play_order(&self) -> &[PlayerId] {
        self.turns.order()
    }

    pub fn turn_order(&self) -> &TurnOrder {
        &self.turns
    }

    /// Completed passes through the play order.
    pub fn turn(&self) -> u32 {
        self.turns.turn()
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    /// Advance the turn pointer `steps` times.
    pub fn increment_turn(&mut self, steps: u32) {
        self.turns.increment(steps);
    }

    /// Flip the direction of play through the play order.
    pub fn reverse_play_direction(&mut self) {
        self.turns.reverse();
    }

    /// Try to move `player`'s piece from `start` to `destination`.
    ///
    /// A rejected move is `Ok` with `success == false`. `Err` means the game
    /// state was found inconsistent while applying an accepted move.
    #[instrument(skip_all, fields(player = %player, start = %start, destination = %destination))]
    pub fn attempt_move(
        &mut self,
        player: PlayerId,
        start: Coord,
        destination: Coord,
    ) -> Result<MoveOutcome, StateFault> {
        if let Err(comment) = self.check_move(player, start, destination) {
            debug!(reason = %comment, "move rejected");
            return Ok(MoveOutcome::rejected(comment));
        }

        let moving_name = self.square(start).piece().piece_type().name.clone();
        let mut comments = vec![format!("Moved {}.", moving_name)];

        let target = self.square(destination);
        if target.has_piece() {
            let victim = target.piece();
            let owner = self
                .roster
                .get(victim.owner())
                .ok_or(StateFault::UnknownPlayer(victim.owner()))?;
            comments.push(format!("Took {}'s {}.", owner.name(), victim.piece_type().name));
            self.board
                .square_checked_mut(destination)?
                .take_piece_by(player, &mut self.roster)?;
        }

        let empty = Piece::empty(self.registry.empty_piece_type());
        let mut moving = self.board.square_checked_mut(start)?.set_piece(empty);
        moving.increment_moves_made();
        self.board.square_checked_mut(destination)?.set_piece(moving);
        self.turns.increment(1);
        debug!(piece = %moving_name, "moved");

        let newly_lost: Vec<PlayerId> = self
            .roster
            .iter()
            .filter(|(id, p)| !id.is_base() && p.has_lost() && !p.is_eliminated())
            .map(|(id, _)| id)
            .collect();
        for id in newly_lost {
            comments.push(format!("{} has lost.", self.roster[id].name()));
            self.eliminate(id)?;
        }

        if self.won {
            if let Some(winner) = self.winner {
                comments.push(format!("{} has won.", self.roster[winner].name()));
            }
        }

        Ok(MoveOutcome {
            success: true,
            comments,
        })
    }

    /// The validation half of `attempt_move`. `Err` holds the one comment.
    fn check_move(&self, player: PlayerId, start: Coord, destination: Coord) -> Result<(), String> {
        let runtime = |fault: StateFault| format!("A runtime error occurred: {}", fault);

        if self.won {
            return Err("Game is over.".to_string());
        }
        let mover = self
            .roster
            .get(player)
            .ok_or_else(|| runtime(StateFault::UnknownPlayer(player)))?;
        if mover.has_lost() {
            return Err(format!("{} has lost.", mover.name()));
        }
        if self.turns.current() != Some(player) {
            return Err(format!("It is not {}'s turn.", mover.name()));
        }

        let square = self.square(start);
        let piece = square.piece();
        if !square.exists() || piece.owner() != player {
            return Err(format!("{} does not have a Piece there.", mover.name()));
        }
        if piece.has_tag(crate::content::tags::IMMOBILE) {
            return Err(format!("The {} cannot move.", piece.piece_type().name));
        }

        let reachable = panic::catch_unwind(AssertUnwindSafe(|| piece.moveable_square_coordinates(self)))
            .map_err(|payload| runtime(StateFault::RulePanicked(panic_message(payload.as_ref()))))?
            .map_err(runtime)?;
        if destination == start
            || !self.board.contains(destination)
            || !reachable.contains(&destination)
        {
            return Err(format!("The {} cannot move like that.", piece.piece_type().name));
        }
        Ok(())
    }

    /// Remove `player` from the game.
    ///
    /// They leave the play order, their pieces are destroyed if the config
    /// says so, and they lose user control. If one distinct player is left
    /// in the play order, that player wins. Eliminating a player twice does
    /// nothing.
    pub fn eliminate(&mut self, player: PlayerId) -> Result<(), StateFault> {
        if player.is_base() {
            return Err(StateFault::BasePlayer);
        }
        let eliminated = self
            .roster
            .get(player)
            .ok_or(StateFault::UnknownPlayer(player))?
            .is_eliminated();
        if eliminated {
            return Ok(());
        }

        self.turns.remove_player(player);

        if self.config.destroy_eliminated_pieces {
            for square in self.board.squares_mut() {
                if square.has_piece() && square.piece().owner() == player {
                    square.destroy_piece(&mut self.roster)?;
                }
            }
        }

        let eliminated = &mut self.roster[player];
        eliminated.disable_user_control();
        eliminated.mark_eliminated();
        info!(player = eliminated.id(), "player eliminated");

        if !self.won {
            if let Some(survivor) = self.turns.sole_survivor() {
                self.won = true;
                self.winner = Some(survivor);
                info!(player = self.roster[survivor].id(), "player has won");
            }
        }
        Ok(())
    }

    /// Diagnostic dump of the board.
    ///
    /// The first line numbers the columns; each following line is a row
    /// number and that row's tokens, in the same `[player][piece][*]` form
    /// scenario boards use.
    pub fn stringified_board(&self) -> String {
        let mut out = String::from("y\\x");
        for x in 0..self.board.width() {
            out.push_str(&format!(" {:<3}", x));
        }
        for y in 0..self.board.height() {
            out.push_str(&format!("\n{:<3}", y));
            for x in 0..self.board.width() {
                let token = self.token(self.square(Coord::new(x as i32, y as i32)).piece());
                out.push_str(&format!(" {:<3}", token));
            }
        }
        out
    }

    fn token(&self, piece: &Piece) -> String {
        if piece.is_ghost() {
            return format!("{}{}", BASE_SHORTHAND, BASE_SHORTHAND);
        }
        let player = self.roster.get(piece.owner()).map_or('?', Player::shorthand);
        let shorthand = piece
            .shorthand()
            .or(piece.piece_type().shorthand)
            .unwrap_or('?');
        let mut token = format!("{}{}", player, shorthand);
        if piece.is_vital() {
            token.push(scenario::VITAL_MARKER);
        }
        token
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "rule callable panicked".to_string()
    }
}
