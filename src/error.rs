// src/error.rs
use thiserror::Error;

/// Failures reported by a pose source. The engine reports these once and
/// never retries.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("pose source permission denied: {0}")]
    PermissionDenied(String),
    #[error("pose source unavailable: {0}")]
    Unavailable(String),
    #[error("pose source I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("a section deck needs at least one section")]
    EmptyDeck,
    #[error("section index {index} is out of range for {count} sections")]
    IndexOutOfRange { index: usize, count: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read or write settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("unknown pose '{0}' (expected right, left, both, rest, absent or weak)")]
    UnknownPose(String),
    #[error("phase '{0}' is not of the form pose:duration_ms")]
    MalformedPhase(String),
    #[error("tick interval must be positive")]
    ZeroTick,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("gesture engine task has stopped")]
pub struct EngineClosed;
