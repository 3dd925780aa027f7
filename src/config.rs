//! Command-line settings and the log filter.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::error::{GameError, Result};
use crate::fraction::Fraction;
use crate::game::Game;

/// Grid snake on a fixed tick loop
#[derive(Parser, Debug, Clone)]
#[command(name = "grid-snake", version)]
pub struct Settings {
    /// Level to start with
    #[arg(long, default_value = "0001")]
    pub level: String,

    /// Extra JSON level table added to the built-in levels
    #[arg(long)]
    pub levels: Option<PathBuf>,

    /// Seed for apple placement
    #[arg(long, default_value_t = 1)]
    pub seed: u64,

    /// Frames per second
    #[arg(long, default_value_t = 60)]
    pub frame_rate: u32,

    /// Frames per snake move
    #[arg(long, default_value_t = Game::DEFAULT_SNAKE_PERIOD)]
    pub period: u32,

    /// Pixel size of one board cell
    #[arg(long, default_value_t = 32)]
    pub cell_size: u32,

    /// Rebuild and cross-check the board after every move
    #[arg(long)]
    pub verify_board: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self::parse_from(["grid-snake"])
    }
}

impl Settings {
    pub const CELL_SIZE_RANGE: std::ops::RangeInclusive<u32> = 4..=128;

    pub fn validate(&self) -> Result<()> {
        if self.frame_rate == 0 {
            return Err(GameError::invalid_argument("frame rate must be non-zero"));
        }
        if self.period == 0 {
            return Err(GameError::invalid_argument("period must be non-zero"));
        }
        if !Self::CELL_SIZE_RANGE.contains(&self.cell_size) {
            return Err(GameError::invalid_argument(format!(
                "cell size {} outside {:?}",
                self.cell_size,
                Self::CELL_SIZE_RANGE
            )));
        }
        Ok(())
    }

    /// Minimum delay between frames, whole milliseconds rounded down.
    pub fn frame_interval(&self) -> Result<Duration> {
        let millis = Fraction::new(1000, i64::from(self.frame_rate))?.floor();
        Ok(Duration::from_millis(millis as u64))
    }
}

/// Log filter from `RUST_LOG`-style directives, `info` when none are given.
pub fn log_filter(directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives.unwrap_or_default())
}
