//! Grid snake: a frame-driven snake game on fixed level boards.

pub mod board;
pub mod config;
pub mod error;
pub mod fraction;
pub mod game;
pub mod geom;
pub mod level;
pub mod matrix;
pub mod objects;
pub mod render;
pub mod snake;

pub use board::{GameBoardObjects, UpdateOutcome};
pub use error::{ErrorKind, GameError, Result, ResultExt};
pub use game::{Game, GameSnapshot, GameStatus, StopReason};
pub use geom::{Pos2D, Size2D, Vector2D};
pub use level::{Level, LevelRegistry};
