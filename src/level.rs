//! Level templates and the registry that holds them.
//!
//! Registered levels are frozen. Gameplay always works on a
//! [`Level::playable_copy`], so a running game can never alter a template.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result, ResultExt};
use crate::geom::{Pos2D, Size2D};
use crate::matrix::Matrix;
use crate::objects::CellKind;

const BUILTIN_LEVELS: &str = include_str!("../assets/levels.json");

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    id: String,
    board: Matrix<CellKind>,
    snake_init_pos: Pos2D,
    apple_init_num: usize,
    changeable: bool,
}

fn validate(board: &Matrix<CellKind>, snake_init_pos: Pos2D) -> Result<()> {
    if board.num_of_row() == 0 || board.num_of_col() == 0 {
        return Err(GameError::invalid_argument("level board is empty"));
    }
    if let Some((pos, cell)) = board.iter().find(|(_, c)| !c.is_template_cell()) {
        return Err(GameError::invalid_argument(format!(
            "cell {pos} holds code {}, templates may only contain empty (0) and wall (1)",
            cell.code()
        )));
    }
    if !board.contains(snake_init_pos) {
        return Err(GameError::invalid_argument(format!(
            "snake start {snake_init_pos} lies outside the {} board",
            board.size()
        )));
    }
    Ok(())
}

impl Level {
    pub fn new(
        id: impl Into<String>,
        board: Matrix<CellKind>,
        snake_init_pos: Pos2D,
        apple_init_num: usize,
    ) -> Result<Self> {
        validate(&board, snake_init_pos)?;
        Ok(Self {
            id: id.into(),
            board,
            snake_init_pos,
            apple_init_num,
            changeable: true,
        })
    }

    /// Build a level from raw cell codes.
    pub fn from_codes(
        id: impl Into<String>,
        rows: Vec<Vec<u8>>,
        snake_init_pos: Pos2D,
        apple_init_num: usize,
    ) -> Result<Self> {
        let id = id.into();
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|code| {
                        CellKind::from_code(code).ok_or_else(|| {
                            GameError::invalid_argument(format!("unknown cell code {code}"))
                        })
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()
            .context(|| format!("level {id}"))?;
        let board = Matrix::from_rows(rows).context(|| format!("level {id}"))?;
        Self::new(id.clone(), board, snake_init_pos, apple_init_num)
            .context(|| format!("level {id}"))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn board(&self) -> &Matrix<CellKind> {
        &self.board
    }

    pub fn size(&self) -> Size2D {
        self.board.size()
    }

    pub fn snake_init_pos(&self) -> Pos2D {
        self.snake_init_pos
    }

    pub fn apple_init_num(&self) -> usize {
        self.apple_init_num
    }

    pub fn is_changeable(&self) -> bool {
        self.changeable
    }

    /// A mutable copy for a game session to own.
    pub fn playable_copy(&self) -> Level {
        Level {
            changeable: true,
            ..self.clone()
        }
    }

    pub fn freeze(&mut self) {
        self.changeable = false;
    }

    fn ensure_changeable(&self) -> Result<()> {
        if self.changeable {
            Ok(())
        } else {
            Err(GameError::LevelImmutable(self.id.clone()))
        }
    }

    pub fn set_id(&mut self, id: impl Into<String>) -> Result<()> {
        self.ensure_changeable()?;
        self.id = id.into();
        Ok(())
    }

    pub fn set_board(&mut self, board: Matrix<CellKind>) -> Result<()> {
        self.ensure_changeable()?;
        validate(&board, self.snake_init_pos)?;
        self.board = board;
        Ok(())
    }

    pub fn set_snake_init_pos(&mut self, pos: Pos2D) -> Result<()> {
        self.ensure_changeable()?;
        validate(&self.board, pos)?;
        self.snake_init_pos = pos;
        Ok(())
    }

    pub fn set_apple_init_num(&mut self, apple_init_num: usize) -> Result<()> {
        self.ensure_changeable()?;
        self.apple_init_num = apple_init_num;
        Ok(())
    }

    /// Overwrite this level's contents with `other`'s, keeping it mutable.
    pub fn assign_from(&mut self, other: &Level) -> Result<()> {
        self.ensure_changeable()?;
        self.id = other.id.clone();
        self.board = other.board.clone();
        self.snake_init_pos = other.snake_init_pos;
        self.apple_init_num = other.apple_init_num;
        Ok(())
    }
}

/// One level as stored in a JSON level table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LevelRecord {
    pub id: String,
    pub board: Vec<Vec<u8>>,
    pub initial_snake_position: (i32, i32),
    pub initial_apple_count: usize,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LevelTable {
    pub levels: Vec<LevelRecord>,
}

impl TryFrom<LevelRecord> for Level {
    type Error = GameError;

    fn try_from(record: LevelRecord) -> Result<Self> {
        Level::from_codes(
            record.id,
            record.board,
            record.initial_snake_position.into(),
            record.initial_apple_count,
        )
    }
}

impl From<&Level> for LevelRecord {
    fn from(level: &Level) -> Self {
        let rows = (0..level.board.num_of_row())
            .map(|r| level.board.row(r).iter().map(|c| c.code()).collect())
            .collect();
        LevelRecord {
            id: level.id.clone(),
            board: rows,
            initial_snake_position: (level.snake_init_pos.x, level.snake_init_pos.y),
            initial_apple_count: level.apple_init_num,
        }
    }
}

/// Id-to-template map, filled once at startup and read-only afterwards.
#[derive(Debug, Default)]
pub struct LevelRegistry {
    levels: AHashMap<String, Level>,
    order: Vec<String>,
}

impl LevelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-filled with the levels shipped in `assets/levels.json`.
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();
        registry
            .register_json(BUILTIN_LEVELS)
            .context(|| "built-in levels")?;
        Ok(registry)
    }

    pub fn register(&mut self, mut level: Level) -> Result<&Level> {
        if self.levels.contains_key(level.id()) {
            return Err(GameError::invalid_argument(format!(
                "level with id {} already exists",
                level.id()
            )));
        }
        level.freeze();
        let id = level.id().to_owned();
        tracing::debug!(level = %id, size = %level.size(), "level registered");
        self.order.push(id.clone());
        Ok(self.levels.entry(id).or_insert(level))
    }

    /// Parse a JSON level table and register every level in it.
    /// Returns how many levels were added.
    pub fn register_json(&mut self, json: &str) -> Result<usize> {
        let table: LevelTable = serde_json::from_str(json)?;
        let count = table.levels.len();
        for record in table.levels {
            let level = Level::try_from(record)?;
            self.register(level)?;
        }
        tracing::info!(count, total = self.levels.len(), "levels loaded");
        Ok(count)
    }

    pub fn find(&self, id: &str) -> Result<&Level> {
        self.levels
            .get(id)
            .ok_or_else(|| GameError::LevelNotFound(id.to_owned()))
    }

    /// A mutable copy of the named template.
    pub fn checkout(&self, id: &str) -> Result<Level> {
        self.find(id).map(Level::playable_copy)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// The id registered after `id`, wrapping to the first.
    pub fn next_id(&self, id: &str) -> Option<&str> {
        let idx = self.order.iter().position(|i| i == id)?;
        self.order
            .get((idx + 1) % self.order.len())
            .map(String::as_str)
    }

    /// Smallest size that fits every registered board.
    pub fn max_board_size(&self) -> Size2D {
        self.levels.values().fold(Size2D::default(), |acc, l| {
            let s = l.size();
            Size2D::new(acc.width.max(s.width), acc.height.max(s.height))
        })
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
