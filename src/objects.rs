//! Things that occupy a board cell.

use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::{GameError, Result};
use crate::geom::{Pos2D, Vector2D};

/// Contents of one board cell. The discriminants are the cell codes used by
/// level templates and by the live board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CellKind {
    #[default]
    Empty = 0,
    Wall = 1,
    SnakeHead = 2,
    SnakeBody = 3,
    Apple = 4,
}

impl CellKind {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => CellKind::Empty,
            1 => CellKind::Wall,
            2 => CellKind::SnakeHead,
            3 => CellKind::SnakeBody,
            4 => CellKind::Apple,
            _ => return None,
        })
    }

    pub fn symbol(self) -> char {
        match self {
            CellKind::Empty => '-',
            CellKind::Wall => 'W',
            CellKind::SnakeHead => 'H',
            CellKind::SnakeBody => 'B',
            CellKind::Apple => 'A',
        }
    }

    /// Only empty and wall cells may appear in a level template.
    pub fn is_template_cell(self) -> bool {
        matches!(self, CellKind::Empty | CellKind::Wall)
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// One snake cell together with the direction it was given when it became
/// the head.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SnakeSeg {
    pub pos: Pos2D,
    pub direction: Vector2D,
}

impl SnakeSeg {
    pub fn new(pos: Pos2D, direction: Vector2D) -> Self {
        Self { pos, direction }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Apple {
    pub pos: Pos2D,
}

impl Apple {
    pub fn new(pos: Pos2D) -> Self {
        Self { pos }
    }

    /// Move the apple to a cell chosen uniformly from `candidates`.
    pub fn randomize_pos<R: Rng + ?Sized>(
        &mut self,
        candidates: &[Pos2D],
        rng: &mut R,
    ) -> Result<()> {
        let pos = candidates
            .choose(rng)
            .ok_or_else(|| GameError::invalid_argument("no free cell left to place an apple"))?;
        self.pos = *pos;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Wall {
    pub pos: Pos2D,
}

impl Wall {
    pub fn new(pos: Pos2D) -> Self {
        Self { pos }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn cell_codes_round_trip() {
        for code in 0..5u8 {
            let kind = CellKind::from_code(code).unwrap();
            assert_eq!(kind.code(), code);
        }
        assert_eq!(CellKind::from_code(5), None);
        assert!(CellKind::Wall.is_template_cell());
        assert!(!CellKind::Apple.is_template_cell());
    }

    #[test]
    fn apple_lands_on_a_candidate() {
        let mut rng = SmallRng::seed_from_u64(7);
        let candidates = [Pos2D::new(1, 1), Pos2D::new(4, 2), Pos2D::new(3, 3)];
        let mut apple = Apple::default();
        for _ in 0..20 {
            apple.randomize_pos(&candidates, &mut rng).unwrap();
            assert!(candidates.contains(&apple.pos));
        }
    }

    #[test]
    fn apple_needs_a_candidate() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut apple = Apple::new(Pos2D::new(2, 2));
        assert!(apple.randomize_pos(&[], &mut rng).is_err());
        assert_eq!(apple.pos, Pos2D::new(2, 2));
    }
}
