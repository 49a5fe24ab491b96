use std::io;
use thiserror::Error;

/// Failures of the underlying key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state store io error: {0}")]
    Io(#[from] io::Error),

    #[error("state store holds malformed data: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("state store lock was poisoned")]
    Poisoned,
}

/// Errors surfaced by the dispatch operations.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The floor lies outside `[0, floor_count)`.
    #[error("invalid floor number: {floor}")]
    InvalidFloor { floor: i64 },

    /// No elevator carries this id.
    #[error("invalid elevator number: {id}")]
    NotFound { id: usize },

    /// The store failed to read or write. The whole operation may be re-run.
    #[error("state store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("dispatch server is not running")]
    Disconnected,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{reason} when parsing {key}={invalid:?}")]
    InvalidNumber {
        key: String,
        invalid: String,
        reason: String,
    },

    #[error("elevator count must be > 0")]
    NoElevators,

    #[error("floor count must be > 0")]
    NoFloors,

    #[error("initial floor({initial_floor}) must be < floor count({floor_count})")]
    InitialFloorOutOfRange { initial_floor: u8, floor_count: u8 },

    #[error("{key}({millis} ms) must be <= {max} ms")]
    TimingTooLong { key: String, millis: u64, max: u64 },
}

pub type Result<T> = std::result::Result<T, DispatchError>;
