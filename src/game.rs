use std::collections::VecDeque;
use std::fmt;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::board::{GameBoardObjects, UpdateOutcome};
use crate::error::{GameError, Result, ResultExt};
use crate::geom::{Pos2D, Size2D, Vector2D};
use crate::level::{Level, LevelRegistry};
use crate::objects::SnakeSeg;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Stopped,
    Running,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Stopped => "stopped",
            GameStatus::Running => "running",
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    NotStopping,
    Preparing,
    Paused,
    Lost,
    Won,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::NotStopping => "not stopping",
            StopReason::Preparing => "preparing",
            StopReason::Paused => "paused",
            StopReason::Lost => "lost",
            StopReason::Won => "won",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only copy of everything the display needs for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct GameSnapshot {
    pub level_id: String,
    pub board_size: Size2D,
    /// Head first.
    pub snake: Vec<SnakeSeg>,
    pub apples: Vec<Pos2D>,
    pub walls: Vec<Pos2D>,
    pub empty_poses: Vec<Pos2D>,
    pub num_of_step: u64,
    pub status: GameStatus,
    pub stop_reason: StopReason,
}

pub struct Game {
    level: Option<Level>,
    board_objects: GameBoardObjects,
    direction_queue: VecDeque<Vector2D>,
    status: GameStatus,
    stop_reason: StopReason,
    frame_num: u64,
    num_of_step: u64,
    snake_period_in_frames: u32,
    verify_board: bool,
}

impl Game {
    pub const DEFAULT_SNAKE_PERIOD: u32 = 6;

    pub fn new(seed: u64) -> Self {
        Self {
            level: None,
            board_objects: GameBoardObjects::new(SmallRng::seed_from_u64(seed)),
            direction_queue: VecDeque::new(),
            status: GameStatus::Stopped,
            stop_reason: StopReason::Preparing,
            frame_num: 0,
            num_of_step: 0,
            snake_period_in_frames: Self::DEFAULT_SNAKE_PERIOD,
            verify_board: false,
        }
    }

    /// Move the snake once every `frames` calls to [`update`](Self::update).
    pub fn with_snake_period(mut self, frames: u32) -> Result<Self> {
        if frames == 0 {
            return Err(GameError::invalid_argument("snake period must be at least one frame"));
        }
        self.snake_period_in_frames = frames;
        Ok(self)
    }

    /// Cross-check the board against a full rebuild after every move.
    pub fn with_board_verification(mut self, verify: bool) -> Self {
        self.verify_board = verify;
        self
    }

    fn ensure_initialized(&self, method: &'static str) -> Result<()> {
        if self.level.is_some() && self.board_objects.is_initialized() {
            Ok(())
        } else {
            Err(GameError::NotInitialized(method))
        }
    }

    /// Load a fresh copy of `level_id` (or replay the current level) and
    /// wait for [`start`](Self::start).
    ///
    /// An unknown id changes nothing. If the board cannot be laid out the
    /// previous level and board are kept and the game is paused.
    pub fn init(&mut self, registry: &LevelRegistry, level_id: Option<&str>) -> Result<()> {
        let level = match (level_id, &self.level) {
            (Some(id), _) => registry.checkout(id)?,
            (None, Some(current)) => current.clone(),
            (None, None) => {
                return Err(GameError::invalid_argument(
                    "no level loaded, a level id is required",
                ));
            }
        };

        if let Err(err) = self.board_objects.init(&level) {
            if self.status == GameStatus::Running {
                self.stop(StopReason::Paused);
            }
            return Err(err).context(|| format!("initializing level {}", level.id()));
        }

        self.level = Some(level);
        self.num_of_step = 0;
        self.frame_num = 0;
        self.direction_queue.clear();
        self.direction_queue.push_back(Vector2D::ZERO);
        self.status = GameStatus::Stopped;
        self.stop_reason = StopReason::Preparing;
        tracing::info!(level = self.level_id(), "game initialized");
        Ok(())
    }

    pub fn start(&mut self) -> Result<()> {
        self.ensure_initialized("start")?;
        if self.status == GameStatus::Running {
            tracing::debug!("start ignored, already running");
            return Ok(());
        }
        self.status = GameStatus::Running;
        self.stop_reason = StopReason::NotStopping;
        tracing::info!(level = self.level_id(), "game started");
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        self.ensure_initialized("pause")?;
        if self.status != GameStatus::Running {
            tracing::debug!(reason = %self.stop_reason, "pause ignored, not running");
            return Ok(());
        }
        self.stop(StopReason::Paused);
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        self.ensure_initialized("resume")?;
        if self.status != GameStatus::Stopped || self.stop_reason != StopReason::Paused {
            tracing::info!(
                status = %self.status,
                reason = %self.stop_reason,
                "resume ignored, not paused"
            );
            return Ok(());
        }
        self.start()
    }

    pub fn restart(&mut self, registry: &LevelRegistry, level_id: Option<&str>) -> Result<()> {
        self.init(registry, level_id)?;
        self.start()
    }

    fn stop(&mut self, reason: StopReason) {
        self.status = GameStatus::Stopped;
        self.stop_reason = reason;
        tracing::debug!(%reason, "game stopped");
    }

    fn lose(&mut self) {
        self.stop(StopReason::Lost);
        tracing::info!(
            level = self.level_id(),
            length = self.board_objects.snake_length().unwrap_or(0),
            step = self.num_of_step,
            "game over"
        );
    }

    fn win(&mut self) {
        self.stop(StopReason::Won);
        tracing::info!(
            level = self.level_id(),
            length = self.board_objects.snake_length().unwrap_or(0),
            step = self.num_of_step,
            "game won"
        );
    }

    /// Queue `direction` for the snake. A request to reverse a snake longer
    /// than one segment repeats the front of the queue instead.
    pub fn add_direction_to_queue(&mut self, direction: Vector2D) -> Result<()> {
        let length = self.board_objects.snake_length()?;
        match self.direction_queue.front().copied() {
            Some(front) if length > 1 && direction.is_opposite_direction_with(&front, false) => {
                tracing::debug!(requested = %direction, %front, "reversal replaced");
                self.direction_queue.push_back(front);
            }
            _ => self.direction_queue.push_back(direction),
        }
        Ok(())
    }

    /// Called once per frame. Does nothing while stopped; otherwise moves the
    /// snake on every `snake_period_in_frames`-th frame.
    pub fn update(&mut self, requested: Vector2D) -> Result<()> {
        self.ensure_initialized("update")?;
        let frame = self.frame_num;
        self.frame_num += 1;
        if self.status == GameStatus::Stopped {
            return Ok(());
        }
        if frame % u64::from(self.snake_period_in_frames) != 0 {
            return Ok(());
        }
        self.step(requested)
    }

    /// One movement tick regardless of the frame counter.
    pub fn step(&mut self, requested: Vector2D) -> Result<()> {
        self.ensure_initialized("step")?;
        if self.status == GameStatus::Stopped {
            return Ok(());
        }
        self.add_direction_to_queue(requested)?;
        self.move_snake()
    }

    fn move_snake(&mut self) -> Result<()> {
        let current = self
            .direction_queue
            .pop_front()
            .ok_or_else(|| GameError::logic("direction queue is empty"))?;
        let next = *self
            .direction_queue
            .front()
            .ok_or_else(|| GameError::logic("no direction queued for the following move"))?;

        let _span =
            tracing::debug_span!("tick", step = self.num_of_step, frame = self.frame_num).entered();
        let head = self.board_objects.snake()?.head().pos;
        let result = if self.verify_board {
            self.board_objects.force_update(next)
        } else {
            self.board_objects.update(next)
        };
        let step = self.num_of_step;
        let outcome = result.context(|| format!("step {step} from {head} heading {current}"))?;

        if outcome == UpdateOutcome::Stationary {
            tracing::trace!(%next, "waiting for a direction");
            return Ok(());
        }
        self.num_of_step += 1;
        match outcome {
            UpdateOutcome::AteApple => {
                tracing::debug!(length = self.board_objects.snake_length()?, "apple eaten");
            }
            UpdateOutcome::HitWall => self.lose(),
            UpdateOutcome::HitSelf => self.win(),
            UpdateOutcome::Continued | UpdateOutcome::Stationary => {}
        }
        Ok(())
    }

    pub fn snapshot(&self) -> Result<GameSnapshot> {
        self.ensure_initialized("snapshot")?;
        let board = &self.board_objects;
        Ok(GameSnapshot {
            level_id: self.level_id().to_owned(),
            board_size: board.board()?.size(),
            snake: board.snake()?.iter().copied().collect(),
            apples: board.apples()?.iter().map(|a| a.pos).collect(),
            walls: board.walls()?.iter().map(|w| w.pos).collect(),
            empty_poses: board.empty_poses()?.to_vec(),
            num_of_step: self.num_of_step,
            status: self.status,
            stop_reason: self.stop_reason,
        })
    }

    pub fn level(&self) -> Result<&Level> {
        self.level.as_ref().ok_or(GameError::NotInitialized("level"))
    }

    fn level_id(&self) -> &str {
        self.level.as_ref().map_or("", |l| l.id())
    }

    pub fn board_objects(&self) -> &GameBoardObjects {
        &self.board_objects
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn stop_reason(&self) -> StopReason {
        self.stop_reason
    }

    pub fn is_running(&self) -> bool {
        self.status == GameStatus::Running
    }

    pub fn num_of_step(&self) -> u64 {
        self.num_of_step
    }

    pub fn frame_num(&self) -> u64 {
        self.frame_num
    }

    pub fn snake_period_in_frames(&self) -> u32 {
        self.snake_period_in_frames
    }

    pub fn pending_directions(&self) -> impl Iterator<Item = Vector2D> + '_ {
        self.direction_queue.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn registry() -> LevelRegistry {
        let mut registry = LevelRegistry::new();
        let corridor = Level::from_codes(
            "C001",
            vec![
                vec![1, 1, 1, 1, 1, 1, 1],
                vec![1, 0, 0, 0, 0, 0, 1],
                vec![1, 1, 1, 1, 1, 1, 1],
            ],
            Pos2D::new(1, 1),
            0,
        )
        .unwrap();
        let mut rows = vec![vec![1u8; 7]];
        rows.extend(std::iter::repeat_n(vec![1, 0, 0, 0, 0, 0, 1], 4));
        rows.push(vec![1u8; 7]);
        let room = Level::from_codes("R001", rows, Pos2D::new(1, 3), 0).unwrap();
        registry.register(corridor).unwrap();
        registry.register(room).unwrap();
        registry
    }

    fn started(level: &str) -> (LevelRegistry, Game) {
        let registry = registry();
        let mut game = Game::new(3).with_snake_period(1).unwrap().with_board_verification(true);
        game.restart(&registry, Some(level)).unwrap();
        (registry, game)
    }

    fn head(game: &Game) -> Pos2D {
        game.board_objects().snake().unwrap().head().pos
    }

    #[test]
    fn calls_before_init_fail() {
        let mut game = Game::new(1);
        assert_eq!(game.update(Vector2D::UP).unwrap_err().kind(), ErrorKind::NotInitialized);
        assert_eq!(game.start().unwrap_err().kind(), ErrorKind::NotInitialized);
        assert!(game.snapshot().is_err());
        assert!(game.level().is_err());
        assert_eq!(game.frame_num(), 0);
        assert_eq!(game.status(), GameStatus::Stopped);
    }

    #[test]
    fn zero_period_is_rejected() {
        assert!(Game::new(1).with_snake_period(0).is_err());
    }

    #[test]
    fn init_waits_for_start() {
        let registry = registry();
        let mut game = Game::new(1);
        game.init(&registry, Some("C001")).unwrap();
        assert_eq!(game.status(), GameStatus::Stopped);
        assert_eq!(game.stop_reason(), StopReason::Preparing);
        assert_eq!(game.pending_directions().collect::<Vec<_>>(), vec![Vector2D::ZERO]);
        assert!(game.level().unwrap().is_changeable());

        game.update(Vector2D::RIGHT).unwrap();
        assert_eq!(head(&game), Pos2D::new(1, 1));
        assert_eq!(game.num_of_step(), 0);
    }

    #[test]
    fn init_with_unknown_level_keeps_the_current_one() {
        let (registry, mut game) = started("C001");
        let err = game.init(&registry, Some("NOPE")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LevelNotFound);
        assert_eq!(game.level().unwrap().id(), "C001");
        assert!(game.is_running());
    }

    #[test]
    fn failed_board_layout_keeps_the_current_game() {
        let (mut registry, mut game) = started("C001");
        let crowded = Level::from_codes(
            "FULL",
            vec![vec![1, 1, 1, 1], vec![1, 0, 0, 1], vec![1, 1, 1, 1]],
            Pos2D::new(1, 1),
            9,
        )
        .unwrap();
        registry.register(crowded).unwrap();
        game.step(Vector2D::RIGHT).unwrap();
        game.step(Vector2D::RIGHT).unwrap();
        let queued: Vec<_> = game.pending_directions().collect();

        let err = game.init(&registry, Some("FULL")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("initializing level FULL"));

        assert_eq!(game.level().unwrap().id(), "C001");
        assert_eq!(game.status(), GameStatus::Stopped);
        assert_eq!(game.stop_reason(), StopReason::Paused);
        assert_eq!(game.num_of_step(), 1);
        assert_eq!(game.pending_directions().collect::<Vec<_>>(), queued);
        assert_eq!(head(&game), Pos2D::new(2, 1));
        let snap = game.snapshot().unwrap();
        assert_eq!(snap.level_id, "C001");
        assert_eq!(snap.board_size, Size2D::new(7, 3));

        game.update(Vector2D::RIGHT).unwrap();
        assert_eq!(head(&game), Pos2D::new(2, 1));
    }

    #[test]
    fn init_without_id_needs_a_previous_level() {
        let registry = registry();
        let mut game = Game::new(1);
        assert_eq!(game.init(&registry, None).unwrap_err().kind(), ErrorKind::InvalidArgument);
        game.init(&registry, Some("R001")).unwrap();
        game.init(&registry, None).unwrap();
        assert_eq!(game.level().unwrap().id(), "R001");
    }

    #[test]
    fn pause_and_resume() {
        let (_, mut game) = started("C001");
        game.resume().unwrap();
        assert!(game.is_running());

        game.pause().unwrap();
        assert_eq!(game.stop_reason(), StopReason::Paused);
        game.step(Vector2D::RIGHT).unwrap();
        assert_eq!(game.pending_directions().count(), 1);

        game.resume().unwrap();
        assert_eq!(game.status(), GameStatus::Running);
        assert_eq!(game.stop_reason(), StopReason::NotStopping);
    }

    #[test]
    fn snake_moves_on_period_boundaries() {
        let registry = registry();
        let mut game = Game::new(1).with_snake_period(3).unwrap();
        game.restart(&registry, Some("C001")).unwrap();

        // frame 0 picks up the heading, frames 3 and 6 move
        for _ in 0..7 {
            game.update(Vector2D::RIGHT).unwrap();
        }
        assert_eq!(game.frame_num(), 7);
        assert_eq!(game.num_of_step(), 2);
        assert_eq!(head(&game), Pos2D::new(3, 1));
    }

    #[test]
    fn hitting_a_wall_loses() {
        let (_, mut game) = started("C001");
        game.step(Vector2D::LEFT).unwrap();
        game.step(Vector2D::LEFT).unwrap();
        assert_eq!(game.status(), GameStatus::Stopped);
        assert_eq!(game.stop_reason(), StopReason::Lost);
        assert_eq!(game.num_of_step(), 1);

        let frozen = game.snapshot().unwrap();
        game.update(Vector2D::RIGHT).unwrap();
        assert_eq!(game.snapshot().unwrap(), frozen);
    }

    #[test]
    fn running_into_itself_wins() {
        let (_, mut game) = started("R001");
        for pos in [(2, 3), (3, 3), (3, 2), (2, 2)] {
            game.board_objects.place_apple(pos.into()).unwrap();
        }
        let path = [
            Vector2D::RIGHT,
            Vector2D::RIGHT,
            Vector2D::UP,
            Vector2D::LEFT,
            Vector2D::DOWN,
        ];
        for dir in path {
            game.step(dir).unwrap();
            assert!(game.is_running());
        }
        assert_eq!(game.board_objects().snake_length().unwrap(), 5);

        game.step(Vector2D::DOWN).unwrap();
        assert_eq!(game.status(), GameStatus::Stopped);
        assert_eq!(game.stop_reason(), StopReason::Won);
        assert_eq!(game.num_of_step(), 5);
    }

    #[test]
    fn queued_reversal_repeats_the_front() {
        let (_, mut game) = started("R001");
        game.board_objects.place_apple(Pos2D::new(2, 3)).unwrap();
        game.step(Vector2D::RIGHT).unwrap();
        game.step(Vector2D::RIGHT).unwrap();
        assert_eq!(game.board_objects().snake_length().unwrap(), 2);

        game.step(Vector2D::UP).unwrap();
        assert_eq!(head(&game), Pos2D::new(3, 3));
        game.add_direction_to_queue(Vector2D::DOWN).unwrap();
        assert_eq!(
            game.pending_directions().collect::<Vec<_>>(),
            vec![Vector2D::UP, Vector2D::UP]
        );

        game.move_snake().unwrap();
        assert_eq!(head(&game), Pos2D::new(3, 2));
        assert!(game.is_running());
    }

    #[test]
    fn single_segment_may_reverse() {
        let (_, mut game) = started("C001");
        game.step(Vector2D::RIGHT).unwrap();
        game.step(Vector2D::LEFT).unwrap();
        assert_eq!(head(&game), Pos2D::new(2, 1));
        game.step(Vector2D::LEFT).unwrap();
        assert_eq!(head(&game), Pos2D::new(1, 1));
        assert!(game.is_running());
    }

    #[test]
    fn restart_resets_progress() {
        let (registry, mut game) = started("C001");
        game.step(Vector2D::RIGHT).unwrap();
        game.step(Vector2D::RIGHT).unwrap();
        assert_eq!(game.num_of_step(), 1);

        game.restart(&registry, None).unwrap();
        assert_eq!(game.num_of_step(), 0);
        assert_eq!(head(&game), Pos2D::new(1, 1));
        assert!(game.is_running());

        game.restart(&registry, Some("R001")).unwrap();
        assert_eq!(game.level().unwrap().id(), "R001");
    }

    #[test]
    fn snapshot_lists_head_first() {
        let (_, mut game) = started("R001");
        game.board_objects.place_apple(Pos2D::new(2, 3)).unwrap();
        game.step(Vector2D::RIGHT).unwrap();
        game.step(Vector2D::RIGHT).unwrap();

        let snap = game.snapshot().unwrap();
        assert_eq!(snap.level_id, "R001");
        assert_eq!(snap.board_size, Size2D::new(7, 6));
        assert_eq!(snap.snake[0].pos, Pos2D::new(2, 3));
        assert_eq!(snap.snake[1].pos, Pos2D::new(1, 3));
        assert_eq!(snap.walls.len(), 22);
        assert_eq!(snap.apples.len(), 1);
        assert_eq!(snap.empty_poses.len(), 20 - 2 - 1);
        assert_eq!(snap.num_of_step, 1);
    }
}
