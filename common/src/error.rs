use thiserror::Error;

/// Configuration errors detected before a round is generated.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    #[error("unknown difficulty level {0}")]
    UnknownLevel(u8),

    #[error("grid must contain at least one cell")]
    EmptyGrid,

    #[error("cell count {0} is not a perfect square")]
    NotSquare(usize),

    #[error("a round needs at least one bomb")]
    NoBombs,

    #[error("cannot place {bombs} bombs on a grid of {cells} cells")]
    TooManyBombs { bombs: usize, cells: usize },

    #[error("cell {index} is outside a grid of {cells} cells")]
    CellOutOfRange { index: usize, cells: usize },
}

pub type Result<T> = std::result::Result<T, GridError>;
