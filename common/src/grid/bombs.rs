use std::collections::{BTreeSet, btree_set};

use tracing::{debug, instrument};

use super::{Grid, IndexSource};
use crate::error::{GridError, Result};

/// Distinct bomb cell indices of one round, all inside the grid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BombSet {
    cells: BTreeSet<usize>,
}

impl BombSet {
    /// Builds a set from explicit indices, rejecting any outside the grid.
    pub fn from_indices(grid: &Grid, indices: impl IntoIterator<Item = usize>) -> Result<Self> {
        let cells = indices
            .into_iter()
            .map(|index| grid.check(index))
            .collect::<Result<BTreeSet<_>>>()?;
        Ok(Self { cells })
    }

    pub fn contains(&self, index: usize) -> bool {
        self.cells.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells.iter().copied()
    }
}

impl<'a> IntoIterator for &'a BombSet {
    type Item = &'a usize;
    type IntoIter = btree_set::Iter<'a, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

/// Draws `bomb_count` distinct cells out of `1..=cell_count`.
///
/// Duplicate draws are thrown away and drawn again. At least one cell must
/// stay safe, otherwise the round could never be won, so `bomb_count` has to
/// be below `cell_count`; anything else is rejected before drawing.
#[instrument(level = "trace", skip(source))]
pub fn place_bombs(
    cell_count: usize,
    bomb_count: usize,
    source: &mut (impl IndexSource + ?Sized),
) -> Result<BombSet> {
    if cell_count == 0 {
        return Err(GridError::EmptyGrid);
    }
    if bomb_count == 0 {
        return Err(GridError::NoBombs);
    }
    if bomb_count >= cell_count {
        return Err(GridError::TooManyBombs {
            bombs: bomb_count,
            cells: cell_count,
        });
    }

    let mut cells = BTreeSet::new();
    let mut draws = 0usize;
    while cells.len() < bomb_count {
        cells.insert(source.next_index(cell_count));
        draws += 1;
    }

    debug!(
        "Placed {} bombs on {} cells in {} draws",
        bomb_count, cell_count, draws
    );
    Ok(BombSet { cells })
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    /// Replays a fixed list of draws.
    struct Scripted {
        draws: Vec<usize>,
        next: usize,
    }

    impl Scripted {
        fn new(draws: &[usize]) -> Self {
            Self {
                draws: draws.to_vec(),
                next: 0,
            }
        }
    }

    impl IndexSource for Scripted {
        fn next_index(&mut self, max_inclusive: usize) -> usize {
            let index = self.draws[self.next];
            assert!(index <= max_inclusive);
            self.next += 1;
            index
        }
    }

    #[test]
    fn places_exact_number_of_distinct_bombs() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            for (cells, bombs) in [(100, 16), (81, 16), (49, 16), (9, 1), (4, 3)] {
                let set = place_bombs(cells, bombs, &mut rng).unwrap();
                assert_eq!(set.len(), bombs);
                assert!(set.iter().all(|index| (1..=cells).contains(&index)));
            }
        }
    }

    #[test]
    fn skips_duplicate_draws() {
        let mut source = Scripted::new(&[5, 5, 1, 5, 1, 9]);
        let set = place_bombs(9, 3, &mut source).unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![1, 5, 9]);
        assert_eq!(source.next, 6);
    }

    #[test]
    fn fills_all_but_one_cell() {
        let mut rng = StdRng::seed_from_u64(11);
        let set = place_bombs(49, 48, &mut rng).unwrap();
        assert_eq!(set.len(), 48);
        assert_eq!((1..=49).filter(|i| !set.contains(*i)).count(), 1);
    }

    #[test]
    fn rejects_counts_that_would_never_finish() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            place_bombs(9, 9, &mut rng),
            Err(GridError::TooManyBombs { bombs: 9, cells: 9 })
        );
        assert_eq!(
            place_bombs(9, 12, &mut rng),
            Err(GridError::TooManyBombs { bombs: 12, cells: 9 })
        );
        assert_eq!(place_bombs(9, 0, &mut rng), Err(GridError::NoBombs));
        assert_eq!(place_bombs(0, 1, &mut rng), Err(GridError::EmptyGrid));
    }

    #[test]
    fn explicit_sets_are_checked_against_the_grid() {
        let grid = Grid::new(9).unwrap();
        let set = BombSet::from_indices(&grid, [3, 1, 3]).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(
            BombSet::from_indices(&grid, [1, 10]),
            Err(GridError::CellOutOfRange { index: 10, cells: 9 })
        );
    }
}
