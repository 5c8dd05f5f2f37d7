//! Core of the minefield game.
//!
//! Everything needed to generate and play a round lives here: the difficulty
//! presets, bomb placement, the grid topology used to find neighbours, hint
//! aggregation and the [`Session`] that tracks a round in progress. The wire
//! types shared by the server and client crates sit in [`models`] and
//! [`protocol`].
//!
//! ```
//! use minefield_common::{Activation, Level, Session};
//!
//! let mut rng = rand::rng();
//! let mut session = Session::start(Level::Hard, &mut rng)?;
//! match session.on_cell_activated(1) {
//!     Activation::Revealed { hint } => println!("hint {hint}"),
//!     Activation::Detonated => println!("boom"),
//!     Activation::Invalid(reason) => println!("ignored: {reason:?}"),
//! }
//! # Ok::<(), minefield_common::GridError>(())
//! ```

pub mod error;
pub mod grid;
pub mod level;
pub mod models;
pub mod protocol;
pub mod session;

pub use error::{GridError, Result};
pub use grid::{
    BombSet, Direction, Grid, Hints, IndexSource, PositionClass, classify, compute_hints,
    place_bombs,
};
pub use level::{BOMBS_PER_ROUND, Level, cells_number};
pub use session::{Activation, CellView, Rejection, RoundStatus, Session};
