//! Engine-wide error type.
//!
//! One hand-rolled `Display + std::error::Error` enum, matching
//! `position::MoveError`'s style, covering the error kinds named in the
//! external-interfaces design: malformed configuration, protocol violations
//! from the command surface, illegal moves, and resource exhaustion. `anyhow`
//! remains at the outer edges (CLI argument handling, file I/O in `main.rs`).

use crate::position::MoveError;

#[derive(Debug)]
pub enum EngineError {
    /// A `key[=value]` configuration string had an unknown key, a value
    /// that failed to parse, or was malformed (missing `=`/stray comma).
    Config(String),
    /// A command-surface line was malformed or used an unknown command.
    Protocol(String),
    /// A move was rejected by the board.
    IllegalMove(MoveError),
    /// The arena or some other bounded resource has hit its configured
    /// cap (`max_tree_size`, game length).
    ResourceExhausted(String),
    /// Filesystem I/O failure (tree save/load, book file access).
    Io(std::io::Error),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Config(msg) => write!(f, "configuration error: {msg}"),
            EngineError::Protocol(msg) => write!(f, "protocol error: {msg}"),
            EngineError::IllegalMove(e) => write!(f, "illegal move: {e}"),
            EngineError::ResourceExhausted(msg) => write!(f, "resource exhausted: {msg}"),
            EngineError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::IllegalMove(e) => Some(e),
            EngineError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MoveError> for EngineError {
    fn from(e: MoveError) -> Self {
        EngineError::IllegalMove(e)
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_readable_message() {
        let e = EngineError::Config("unknown key 'foo'".into());
        assert_eq!(e.to_string(), "configuration error: unknown key 'foo'");
    }
}
