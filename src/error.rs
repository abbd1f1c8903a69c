//! Construction-time error types.
//!
//! Runtime saturation (full pools, full input ring) is never an error; only
//! sizing and data mistakes caught while building the game surface here.

use std::error::Error;
use std::fmt;

/// Errors raised while constructing game structures.
#[derive(Debug)]
pub enum GameError {
    /// The arena cannot satisfy an allocation.
    ArenaExhausted {
        /// Number of bytes requested.
        requested: usize,
        /// Bytes still available when the request was made.
        remaining: usize,
        /// Total arena capacity.
        capacity: usize,
    },
    /// A scripted sequence has more events than a queue can hold.
    SequenceTooLong {
        /// Number of events supplied.
        len: usize,
        /// Queue capacity.
        capacity: usize,
    },
    /// A map layout could not be parsed.
    InvalidMap(String),
    /// Tuning or settings JSON failed to parse.
    Config(serde_json::Error),
    /// A configuration file could not be read.
    Io(std::io::Error),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArenaExhausted {
                requested,
                remaining,
                capacity,
            } => write!(
                f,
                "arena exhausted: requested {requested} bytes, {remaining} of {capacity} bytes remaining"
            ),
            Self::SequenceTooLong { len, capacity } => {
                write!(f, "sequence has {len} events, queue holds at most {capacity}")
            }
            Self::InvalidMap(reason) => write!(f, "invalid map layout: {reason}"),
            Self::Config(err) => write!(f, "invalid configuration: {err}"),
            Self::Io(err) => write!(f, "i/o error: {err}"),
        }
    }
}

impl Error for GameError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err)
    }
}

impl From<std::io::Error> for GameError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

/// Convenience alias used across the crate.
pub type GameResult<T> = Result<T, GameError>;
