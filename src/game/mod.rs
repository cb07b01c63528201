//! Game orchestration: scenario loading, turn order and the move pipeline.

pub mod engine;
pub mod scenario;
pub mod turn;

pub use engine::{Game, MoveOutcome};
pub use scenario::{ScenarioInfo, VITAL_MARKER};
pub use turn::TurnOrder;
