//! Error types shared by the engine.

use std::fmt;

/// Coarse classification of a [`GameError`], independent of any context
/// wrapping that was attached while it propagated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    NotInitialized,
    ZeroDivision,
    Logic,
    LevelNotFound,
    LevelImmutable,
    Parse,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::NotInitialized => "not_initialized",
            ErrorKind::ZeroDivision => "zero_division",
            ErrorKind::Logic => "logic_error",
            ErrorKind::LevelNotFound => "level_not_found",
            ErrorKind::LevelImmutable => "level_immutable",
            ErrorKind::Parse => "parse_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0} called before initialization")]
    NotInitialized(&'static str),

    #[error("divisor cannot be zero")]
    ZeroDivision,

    #[error("logic error: {0}")]
    Logic(String),

    #[error("level `{0}` is not registered")]
    LevelNotFound(String),

    #[error("level `{0}` is registered and cannot be changed")]
    LevelImmutable(String),

    #[error("failed to parse level table: {0}")]
    Parse(String),

    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<GameError>,
    },
}

impl GameError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        GameError::InvalidArgument(msg.into())
    }

    pub fn logic(msg: impl Into<String>) -> Self {
        GameError::Logic(msg.into())
    }

    /// Kind of the innermost error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            GameError::NotInitialized(_) => ErrorKind::NotInitialized,
            GameError::ZeroDivision => ErrorKind::ZeroDivision,
            GameError::Logic(_) => ErrorKind::Logic,
            GameError::LevelNotFound(_) => ErrorKind::LevelNotFound,
            GameError::LevelImmutable(_) => ErrorKind::LevelImmutable,
            GameError::Parse(_) => ErrorKind::Parse,
            GameError::Context { source, .. } => source.kind(),
        }
    }

    pub fn with_context(self, context: impl Into<String>) -> Self {
        GameError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        GameError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GameError>;

/// Attach calling context to an error on its way up.
pub trait ResultExt<T> {
    fn context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T> ResultExt<T> for Result<T> {
    fn context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
