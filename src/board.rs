//! Board state: the snake, apples, walls and free cells, plus the cell
//! matrix derived from them.
//!
//! Every tick mutates the authoritative object lists and patches the matrix
//! and the free-cell list for exactly the cells that changed. A full rebuild
//! from the object lists ([`GameBoardObjects::rebuild_board`] and
//! [`GameBoardObjects::refresh_empty_poses`]) must always agree with the
//! patched state; [`GameBoardObjects::force_update`] checks that.

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::error::{GameError, Result, ResultExt};
use crate::geom::{Pos2D, Size2D, Vector2D};
use crate::level::Level;
use crate::matrix::Matrix;
use crate::objects::{Apple, CellKind, Wall};
use crate::snake::Snake;

/// What happened to the snake during one [`GameBoardObjects::update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The snake had no heading yet; it only picked one up.
    Stationary,
    Continued,
    AteApple,
    HitWall,
    /// The head ran into its own body, which wins the game.
    HitSelf,
}

impl UpdateOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, UpdateOutcome::HitWall | UpdateOutcome::HitSelf)
    }
}

#[derive(Clone, Debug)]
struct Objects {
    board: Matrix<CellKind>,
    snake: Snake,
    apples: Vec<Apple>,
    walls: Vec<Wall>,
    empty_poses: Vec<Pos2D>,
}

#[derive(Debug)]
pub struct GameBoardObjects {
    objects: Option<Objects>,
    rng: SmallRng,
}

impl GameBoardObjects {
    pub fn new(rng: SmallRng) -> Self {
        Self { objects: None, rng }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }

    pub fn is_initialized(&self) -> bool {
        self.objects.is_some()
    }

    fn objects(&self, method: &'static str) -> Result<&Objects> {
        self.objects.as_ref().ok_or(GameError::NotInitialized(method))
    }

    /// Lay out `level`: walls from the template, a one-segment snake on the
    /// start cell and the level's apples on random free cells. Any previous
    /// state is discarded.
    pub fn init(&mut self, level: &Level) -> Result<()> {
        let start = level.snake_init_pos();
        let mut board = level.board().clone();
        if board[start] != CellKind::Empty {
            return Err(GameError::invalid_argument(format!(
                "snake start {start} is not an empty cell"
            )))
            .context(|| format!("level {}", level.id()));
        }

        let walls: Vec<Wall> = board
            .iter()
            .filter(|(_, cell)| **cell == CellKind::Wall)
            .map(|(pos, _)| Wall::new(pos))
            .collect();
        board[start] = CellKind::SnakeHead;

        let mut objects = Objects {
            board,
            snake: Snake::new(start, 1)?,
            apples: Vec::with_capacity(level.apple_init_num()),
            walls,
            empty_poses: Vec::new(),
        };
        objects.refresh_empty_poses(None)?;

        let free = objects.empty_poses.len();
        if level.apple_init_num() > free {
            return Err(GameError::invalid_argument(format!(
                "{} apples requested but only {free} free cells",
                level.apple_init_num()
            )))
            .context(|| format!("level {}", level.id()));
        }
        objects.snake.reserve_total(free + 1);

        for _ in 0..level.apple_init_num() {
            let mut apple = Apple::default();
            apple.randomize_pos(&objects.empty_poses, &mut self.rng)?;
            objects.board[apple.pos] = CellKind::Apple;
            objects.empty_poses_remove(apple.pos);
            objects.apples.push(apple);
        }

        tracing::info!(
            level = level.id(),
            apples = objects.apples.len(),
            walls = objects.walls.len(),
            free = objects.empty_poses.len(),
            "board initialized"
        );
        self.objects = Some(objects);
        Ok(())
    }

    /// Advance the snake one cell and resolve what it ran into.
    ///
    /// `next_direction` is recorded on the new head and used by the following
    /// call. A request that would reverse the snake into its neck is replaced
    /// by the current heading.
    pub fn update(&mut self, next_direction: Vector2D) -> Result<UpdateOutcome> {
        let objects = self.objects.as_mut().ok_or(GameError::NotInitialized("update"))?;
        objects.update(next_direction, &mut self.rng)
    }

    /// [`update`](Self::update), then rebuild the board and free-cell list
    /// from scratch and report any divergence from the incremental result.
    /// The rebuilt state is kept.
    pub fn force_update(&mut self, next_direction: Vector2D) -> Result<UpdateOutcome> {
        let objects = self
            .objects
            .as_mut()
            .ok_or(GameError::NotInitialized("force_update"))?;
        let outcome = objects.update(next_direction, &mut self.rng)?;

        let patched_board = objects.board.clone();
        let patched_empty = objects.empty_poses.clone();
        objects.board = objects.rebuild_board();
        objects.refresh_empty_poses(None)?;

        if patched_board != objects.board {
            tracing::warn!(
                "incremental update left the board inconsistent\n\
                 patched:\n{patched_board}\nrebuilt:\n{}",
                objects.board
            );
        }
        if !same_elements(&patched_empty, &objects.empty_poses) {
            tracing::warn!(
                patched = ?patched_empty,
                rebuilt = ?objects.empty_poses,
                "incremental update left the free-cell list inconsistent"
            );
        }
        Ok(outcome)
    }

    /// Move apple `index` to another free cell.
    pub fn relocate_apple(&mut self, index: usize) -> Result<()> {
        let objects = self
            .objects
            .as_mut()
            .ok_or(GameError::NotInitialized("relocate_apple"))?;
        if index >= objects.apples.len() {
            return Err(GameError::invalid_argument(format!(
                "apple index {index} out of range ({} apples)",
                objects.apples.len()
            )));
        }
        objects.apple_randomize_pos(index, false, &mut self.rng)
    }

    /// Put an extra apple on the free cell `pos`.
    pub fn place_apple(&mut self, pos: Pos2D) -> Result<()> {
        let objects = self
            .objects
            .as_mut()
            .ok_or(GameError::NotInitialized("place_apple"))?;
        if objects.board.get(pos) != Some(&CellKind::Empty) {
            return Err(GameError::invalid_argument(format!("{pos} is not a free cell")));
        }
        objects.board[pos] = CellKind::Apple;
        objects.empty_poses_remove(pos);
        objects.apples.push(Apple::new(pos));
        Ok(())
    }

    /// Recompute the free-cell list from the board, either entirely or for
    /// the rectangle `range = (top_left, size)`.
    pub fn refresh_empty_poses(&mut self, range: Option<(Pos2D, Size2D)>) -> Result<()> {
        self.objects
            .as_mut()
            .ok_or(GameError::NotInitialized("refresh_empty_poses"))?
            .refresh_empty_poses(range)
    }

    /// The board as derived purely from walls, apples and snake.
    pub fn rebuild_board(&self) -> Result<Matrix<CellKind>> {
        Ok(self.objects("rebuild_board")?.rebuild_board())
    }

    pub fn board(&self) -> Result<&Matrix<CellKind>> {
        Ok(&self.objects("board")?.board)
    }

    pub fn snake(&self) -> Result<&Snake> {
        Ok(&self.objects("snake")?.snake)
    }

    pub fn snake_copy(&self) -> Result<Snake> {
        Ok(self.objects("snake_copy")?.snake.clone())
    }

    pub fn snake_length(&self) -> Result<usize> {
        Ok(self.objects("snake_length")?.snake.len())
    }

    pub fn apples(&self) -> Result<&[Apple]> {
        Ok(&self.objects("apples")?.apples)
    }

    pub fn walls(&self) -> Result<&[Wall]> {
        Ok(&self.objects("walls")?.walls)
    }

    pub fn empty_poses(&self) -> Result<&[Pos2D]> {
        Ok(&self.objects("empty_poses")?.empty_poses)
    }
}

fn same_elements(a: &[Pos2D], b: &[Pos2D]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort_by_key(|p| (p.y, p.x));
    b.sort_by_key(|p| (p.y, p.x));
    a == b
}

impl Objects {
    fn update(
        &mut self,
        mut next_direction: Vector2D,
        rng: &mut SmallRng,
    ) -> Result<UpdateOutcome> {
        let heading = self.snake.direction();
        // the current head becomes the neck once this move lands
        if self.snake.len() > 1 && next_direction.is_opposite_direction_with(&heading, false) {
            tracing::debug!(requested = %next_direction, %heading, "reversal ignored");
            next_direction = heading;
        }

        if heading.is_zero() {
            self.snake.set_head_direction(next_direction);
            return Ok(UpdateOutcome::Stationary);
        }

        let target = self.snake.head().pos + heading;
        if !self.board.contains(target) {
            tracing::debug!(%target, "head left the board");
            return Ok(UpdateOutcome::HitWall);
        }

        self.snake_move(next_direction);
        let head = self.snake.head().pos;

        if let Some(index) = self.apples.iter().position(|a| a.pos == head) {
            self.snake_grow();
            self.apple_randomize_pos(index, true, rng)
                .context(|| format!("relocating apple eaten at {head}"))?;
            return Ok(UpdateOutcome::AteApple);
        }
        if self.walls.iter().any(|w| w.pos == head) {
            return Ok(UpdateOutcome::HitWall);
        }
        if self.snake.body_contains(head) {
            return Ok(UpdateOutcome::HitSelf);
        }
        Ok(UpdateOutcome::Continued)
    }

    fn snake_move(&mut self, next_direction: Vector2D) {
        let old_head = self.snake.head().pos;
        let len = self.snake.len();
        self.snake.advance(next_direction);

        let head = self.snake.head().pos;
        let vacated = self.snake.previous_tail().pos;
        self.board[vacated] = CellKind::Empty;
        if len > 1 {
            self.board[old_head] = CellKind::SnakeBody;
        }
        self.board[head] = CellKind::SnakeHead;

        self.sync_empty_pos(vacated);
        self.sync_empty_pos(head);
        tracing::debug!(%head, %vacated, "snake moved");
    }

    fn snake_grow(&mut self) {
        self.snake.grow();
        let tail = self.snake.tail().pos;
        self.board[tail] = CellKind::SnakeBody;
        self.sync_empty_pos(tail);
        tracing::debug!(len = self.snake.len(), %tail, "snake grew");
    }

    /// Pick a new free cell for apple `index`. An eaten apple's old cell is
    /// already under the snake's head; an uneaten one hands its cell back to
    /// the free list. When no free cell is left an eaten apple leaves play.
    fn apple_randomize_pos(
        &mut self,
        index: usize,
        eaten_by_snake: bool,
        rng: &mut SmallRng,
    ) -> Result<()> {
        let old = self.apples[index].pos;
        if eaten_by_snake {
            if self.empty_poses_find(old).is_some() {
                tracing::warn!(pos = %old, "eaten apple cell still listed as free, refreshing");
                self.refresh_empty_poses(None)?;
            }
            if self.empty_poses.is_empty() {
                tracing::info!(pos = %old, "no free cell left, apple removed");
                self.apples.remove(index);
                return Ok(());
            }
        }

        let apple = &mut self.apples[index];
        apple.randomize_pos(&self.empty_poses, rng)?;
        let new = apple.pos;
        if new == old {
            return Err(GameError::logic(format!(
                "apple's new position {new} equals its old position"
            )));
        }

        if !eaten_by_snake {
            self.board[old] = CellKind::Empty;
            self.empty_poses.push(old);
        }
        self.empty_poses_remove(new);
        self.board[new] = CellKind::Apple;
        tracing::debug!(from = %old, to = %new, "apple relocated");
        Ok(())
    }

    fn rebuild_board(&self) -> Matrix<CellKind> {
        let mut board = Matrix::new(
            self.board.num_of_row(),
            self.board.num_of_col(),
            CellKind::Empty,
        );
        for apple in &self.apples {
            board[apple.pos] = CellKind::Apple;
        }
        for wall in &self.walls {
            board[wall.pos] = CellKind::Wall;
        }
        for seg in self.snake.slots() {
            board[seg.pos] = CellKind::SnakeBody;
        }
        board[self.snake.head().pos] = CellKind::SnakeHead;
        board
    }

    fn refresh_empty_poses(&mut self, range: Option<(Pos2D, Size2D)>) -> Result<()> {
        let board_size = self.board.size();
        let (origin, size) = match range {
            None => {
                self.empty_poses.clear();
                (Pos2D::new(0, 0), board_size)
            }
            Some((origin, size)) => {
                if origin.x < 0 || origin.y < 0 {
                    return Err(GameError::invalid_argument(format!(
                        "range origin {origin} must be non-negative"
                    )));
                }
                if origin.x as usize + size.width > board_size.width
                    || origin.y as usize + size.height > board_size.height
                {
                    return Err(GameError::invalid_argument(format!(
                        "range {size} at {origin} exceeds the {board_size} board"
                    )));
                }
                (origin, size)
            }
        };

        let mut to_remove = Vec::new();
        for y in origin.y..origin.y + size.height as i32 {
            for x in origin.x..origin.x + size.width as i32 {
                let pos = Pos2D::new(x, y);
                let free = self.board[pos] == CellKind::Empty;
                match (free, self.empty_poses_find(pos).is_some()) {
                    (true, false) => self.empty_poses.push(pos),
                    (false, true) => to_remove.push(pos),
                    _ => {}
                }
            }
        }
        self.empty_poses_remove_many(&to_remove);
        Ok(())
    }

    /// Bring `pos`'s membership in the free list in line with the board.
    fn sync_empty_pos(&mut self, pos: Pos2D) {
        let free = self.board[pos] == CellKind::Empty;
        match (free, self.empty_poses_find(pos)) {
            (true, None) => self.empty_poses.push(pos),
            (false, Some(i)) => {
                self.empty_poses.remove(i);
            }
            _ => {}
        }
    }

    fn empty_poses_find(&self, pos: Pos2D) -> Option<usize> {
        self.empty_poses.iter().position(|p| *p == pos)
    }

    /// Remove the first occurrence of `pos`, returning the index it held.
    fn empty_poses_remove(&mut self, pos: Pos2D) -> Option<usize> {
        let i = self.empty_poses_find(pos)?;
        self.empty_poses.remove(i);
        Some(i)
    }

    /// Remove every position in `poses` (one occurrence each), keeping the
    /// order of what remains. Returns the positions that were not listed.
    fn empty_poses_remove_many(&mut self, poses: &[Pos2D]) -> Vec<Pos2D> {
        let mut pending = poses.to_vec();
        if pending.is_empty() {
            return pending;
        }
        self.empty_poses.retain(|p| match pending.iter().position(|q| q == p) {
            Some(i) => {
                pending.swap_remove(i);
                false
            }
            None => true,
        });
        pending
    }
}
