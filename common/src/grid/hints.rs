use tracing::{debug, instrument};

use super::{BombSet, Grid};
use crate::error::Result;

/// Number of adjacent bombs for every cell of a grid.
///
/// Bomb cells get counts too (a bomb can neighbour other bombs), but those
/// are never shown to a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hints {
    counts: Vec<u8>,
}

impl Hints {
    /// Count for `index`; cells no bomb touches, and indices off the grid, have 0.
    pub fn count(&self, index: usize) -> u8 {
        index
            .checked_sub(1)
            .and_then(|slot| self.counts.get(slot))
            .copied()
            .unwrap_or(0)
    }

    /// Cells with a non-zero count, in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, u8)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(slot, count)| (slot + 1, *count))
    }

    /// Sum of all counts, i.e. the number of (bomb, neighbour) pairs.
    pub fn total(&self) -> usize {
        self.counts.iter().map(|count| *count as usize).sum()
    }
}

/// Adds one to every on-grid neighbour of every bomb.
#[instrument(level = "trace", skip(bombs), fields(bomb_count = bombs.len()))]
pub fn compute_hints(bombs: &BombSet, cell_count: usize) -> Result<Hints> {
    let grid = Grid::new(cell_count)?;
    let mut counts = vec![0u8; cell_count];

    for bomb in bombs.iter() {
        for neighbour in grid.neighbours(bomb)? {
            counts[neighbour - 1] += 1;
        }
    }

    let hints = Hints { counts };
    debug!(
        "Computed {} hint contributions for {} bombs",
        hints.total(),
        bombs.len()
    );
    Ok(hints)
}
