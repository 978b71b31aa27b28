//! Error type shared by element construction, initialization and queries.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ElementError {
    /// Boundary-condition rows must be `(time, value)` pairs.
    #[error("input error: tsandbc must be a 2D list like [(0,1),(2,5),(8,0)], row {row} has {columns} columns")]
    InputShape { row: usize, columns: usize },
    #[error("input error: tsandbc must contain at least one (time, value) pair")]
    EmptyHistory,
    #[error("input error: tsandbc times must be strictly increasing (row {row})")]
    UnorderedHistory { row: usize },
    #[error("label {0} already exists")]
    LabelExists(String),
    /// A kernel variant did not override a required influence function.
    #[error("{element} does not implement {capability}")]
    Unimplemented {
        element: String,
        capability: &'static str,
    },
    #[error("element {0} has no solved parameters; run the model solve first")]
    NotSolved(String),
    #[error("element {0} is not initialized; call Model::initialize first")]
    NotInitialized(String),
    #[error("model {0} is already initialized")]
    AlreadyInitialized(String),
    #[error("parameters of element {0} are already set")]
    AlreadySolved(String),
    #[error("layer {layer} out of range for aquifer with {naq} layers")]
    LayerOutOfRange { layer: usize, naq: usize },
    #[error("shape mismatch in {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("query times must be ordered ascending")]
    UnorderedTimes,
    #[error("no element at index {0}")]
    UnknownElement(usize),
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ElementError>;
