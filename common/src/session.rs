//! State of one round: the generated board plus what the player has found.
//!
//! A new round is a new [`Session`]; nothing carries over from the previous one.

use std::fmt;

use tracing::{debug, info, instrument, warn};

use crate::{
    error::{GridError, Result},
    grid::{BombSet, Grid, Hints, IndexSource, compute_hints, place_bombs},
    level::Level,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundStatus {
    InProgress,
    Won,
    Lost,
}

impl RoundStatus {
    pub fn is_over(self) -> bool {
        self != RoundStatus::InProgress
    }
}

/// Outcome of the player activating a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Revealed { hint: u8 },
    Detonated,
    Invalid(Rejection),
}

/// Why an activation changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    OutOfRange,
    AlreadyRevealed,
    RoundOver,
}

/// What the player is allowed to see of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellView {
    Hidden,
    Revealed { hint: u8 },
    Bomb,
}

#[derive(Debug, Clone)]
pub struct Session {
    grid: Grid,
    bombs: BombSet,
    hints: Hints,
    revealed: Vec<bool>,
    score: usize,
    status: RoundStatus,
}

impl Session {
    /// Generates a fresh round for `level`.
    #[instrument(level = "trace", skip(source))]
    pub fn start(level: Level, source: &mut (impl IndexSource + ?Sized)) -> Result<Self> {
        let bombs = place_bombs(level.cell_count(), level.bomb_count(), source)?;
        let session = Self::with_bombs(level.cell_count(), bombs)?;
        info!(
            "Started {} round with {} bombs",
            level,
            session.bombs.len()
        );
        Ok(session)
    }

    /// Like [`Session::start`] but takes a raw level id, as sent by a client.
    pub fn start_level_id(level_id: u8, source: &mut (impl IndexSource + ?Sized)) -> Result<Self> {
        let level = Level::try_from(level_id).inspect_err(|_| {
            warn!("Refusing to start a round for unknown level {}", level_id);
        })?;
        Self::start(level, source)
    }

    /// Builds a round around an explicit bomb layout.
    pub fn with_bombs(cell_count: usize, bombs: BombSet) -> Result<Self> {
        let grid = Grid::new(cell_count)?;
        if bombs.is_empty() {
            return Err(GridError::NoBombs);
        }
        if bombs.len() >= cell_count {
            return Err(GridError::TooManyBombs {
                bombs: bombs.len(),
                cells: cell_count,
            });
        }
        let bombs = BombSet::from_indices(&grid, bombs.iter())?;
        let hints = compute_hints(&bombs, cell_count)?;

        Ok(Self {
            grid,
            bombs,
            hints,
            revealed: vec![false; cell_count],
            score: 0,
            status: RoundStatus::InProgress,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn bombs(&self) -> &BombSet {
        &self.bombs
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn status(&self) -> RoundStatus {
        self.status
    }

    pub fn safe_cells(&self) -> usize {
        self.grid.cells() - self.bombs.len()
    }

    pub fn is_bomb(&self, index: usize) -> bool {
        self.bombs.contains(index)
    }

    /// Hint of a safe cell. Bombs and off-grid indices have none.
    pub fn hint(&self, index: usize) -> Option<u8> {
        if !self.grid.contains(index) || self.is_bomb(index) {
            return None;
        }
        Some(self.hints.count(index))
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        index
            .checked_sub(1)
            .and_then(|slot| self.revealed.get(slot))
            .copied()
            .unwrap_or(false)
    }

    #[instrument(level = "trace", skip(self), fields(score = self.score))]
    pub fn on_cell_activated(&mut self, index: usize) -> Activation {
        if self.status.is_over() {
            debug!("Ignoring cell {} on a finished round", index);
            return Activation::Invalid(Rejection::RoundOver);
        }

        if !self.grid.contains(index) {
            warn!("Invalid cell index {}", index);
            return Activation::Invalid(Rejection::OutOfRange);
        }

        if self.is_revealed(index) {
            debug!("Cell {} already revealed", index);
            return Activation::Invalid(Rejection::AlreadyRevealed);
        }

        if self.is_bomb(index) {
            self.status = RoundStatus::Lost;
            info!("Bomb hit at cell {}, final score {}", index, self.score);
            return Activation::Detonated;
        }

        self.revealed[index - 1] = true;
        self.score += 1;
        let hint = self.hints.count(index);

        if self.score == self.safe_cells() {
            self.status = RoundStatus::Won;
            info!("Round won, all {} safe cells revealed", self.score);
        } else {
            debug!("Revealed cell {} with hint {}", index, hint);
        }

        Activation::Revealed { hint }
    }

    /// Player's view of a cell. Bombs only show once the round is over.
    pub fn cell_view(&self, index: usize) -> Option<CellView> {
        if !self.grid.contains(index) {
            return None;
        }

        let view = if self.status.is_over() && self.is_bomb(index) {
            CellView::Bomb
        } else if self.is_revealed(index) {
            CellView::Revealed {
                hint: self.hints.count(index),
            }
        } else {
            CellView::Hidden
        };
        Some(view)
    }

    /// Views of every cell, in index order.
    pub fn board(&self) -> Vec<CellView> {
        self.grid
            .indices()
            .map(|index| self.cell_view(index).unwrap_or(CellView::Hidden))
            .collect()
    }

    pub fn status_message(&self) -> String {
        match self.status {
            RoundStatus::InProgress => format!("Your score is {}", self.score),
            RoundStatus::Won => "Well Done! you won! Play again!".to_string(),
            RoundStatus::Lost => format!("You lost. Your score was {}! Try again.", self.score),
        }
    }
}

impl fmt::Display for Session {
    /// Renders the board as the player sees it, one row per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (slot, view) in self.board().iter().enumerate() {
            let symbol = match view {
                CellView::Hidden => "·".to_string(),
                CellView::Revealed { hint: 0 } => " ".to_string(),
                CellView::Revealed { hint } => hint.to_string(),
                CellView::Bomb => "*".to_string(),
            };
            write!(f, "{:>2}", symbol)?;
            if (slot + 1) % self.grid.columns() == 0 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn session(cells: usize, bombs: &[usize]) -> Session {
        let grid = Grid::new(cells).unwrap();
        let set = BombSet::from_indices(&grid, bombs.iter().copied()).unwrap();
        Session::with_bombs(cells, set).unwrap()
    }

    #[test]
    fn starts_every_level() {
        let mut rng = StdRng::seed_from_u64(5);
        for level in Level::ALL {
            let session = Session::start(level, &mut rng).unwrap();
            assert_eq!(session.grid().cells(), level.cell_count());
            assert_eq!(session.bombs().len(), 16);
            assert_eq!(session.score(), 0);
            assert_eq!(session.status(), RoundStatus::InProgress);
            assert_eq!(session.status_message(), "Your score is 0");
        }
    }

    #[test]
    fn unknown_level_ids_are_refused() {
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(
            Session::start_level_id(0, &mut rng).unwrap_err(),
            GridError::UnknownLevel(0)
        );
        assert!(Session::start_level_id(2, &mut rng).is_ok());
    }

    #[test]
    fn revealing_safe_cells_scores() {
        let mut session = session(9, &[1, 3]);
        assert_eq!(
            session.on_cell_activated(2),
            Activation::Revealed { hint: 2 }
        );
        assert_eq!(
            session.on_cell_activated(9),
            Activation::Revealed { hint: 0 }
        );
        assert_eq!(session.score(), 2);
        assert_eq!(session.status_message(), "Your score is 2");
        assert_eq!(session.cell_view(2), Some(CellView::Revealed { hint: 2 }));
        assert_eq!(session.cell_view(1), Some(CellView::Hidden));
    }

    #[test]
    fn repeated_reveal_does_not_score() {
        let mut session = session(9, &[1]);
        session.on_cell_activated(5);
        assert_eq!(
            session.on_cell_activated(5),
            Activation::Invalid(Rejection::AlreadyRevealed)
        );
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn out_of_range_cells_are_invalid() {
        let mut session = session(9, &[1]);
        assert_eq!(
            session.on_cell_activated(0),
            Activation::Invalid(Rejection::OutOfRange)
        );
        assert_eq!(
            session.on_cell_activated(10),
            Activation::Invalid(Rejection::OutOfRange)
        );
        assert_eq!(session.cell_view(10), None);
    }

    #[test]
    fn hitting_a_bomb_loses_and_shows_bombs() {
        let mut session = session(9, &[1, 9]);
        session.on_cell_activated(5);
        assert_eq!(session.on_cell_activated(9), Activation::Detonated);
        assert_eq!(session.status(), RoundStatus::Lost);
        assert_eq!(
            session.status_message(),
            "You lost. Your score was 1! Try again."
        );
        assert_eq!(session.cell_view(1), Some(CellView::Bomb));
        assert_eq!(session.cell_view(9), Some(CellView::Bomb));
        assert_eq!(session.cell_view(5), Some(CellView::Revealed { hint: 2 }));
        assert_eq!(
            session.on_cell_activated(2),
            Activation::Invalid(Rejection::RoundOver)
        );
    }

    #[test]
    fn revealing_every_safe_cell_wins() {
        let mut session = session(4, &[1, 2, 3]);
        assert_eq!(session.safe_cells(), 1);
        assert_eq!(
            session.on_cell_activated(4),
            Activation::Revealed { hint: 3 }
        );
        assert_eq!(session.status(), RoundStatus::Won);
        assert_eq!(session.status_message(), "Well Done! you won! Play again!");
        for bomb in 1..=3 {
            assert_eq!(session.cell_view(bomb), Some(CellView::Bomb));
        }
        assert_eq!(session.cell_view(4), Some(CellView::Revealed { hint: 3 }));
        assert_eq!(
            session.on_cell_activated(1),
            Activation::Invalid(Rejection::RoundOver)
        );
    }

    #[test]
    fn bombs_have_no_hint() {
        let session = session(9, &[1, 5]);
        assert_eq!(session.hint(1), None);
        assert_eq!(session.hint(5), None);
        assert_eq!(session.hint(2), Some(2));
        assert_eq!(session.hint(42), None);
    }

    #[test]
    fn rejects_unwinnable_layouts() {
        let grid = Grid::new(4).unwrap();
        let full = BombSet::from_indices(&grid, 1..=4).unwrap();
        assert_eq!(
            Session::with_bombs(4, full).unwrap_err(),
            GridError::TooManyBombs { bombs: 4, cells: 4 }
        );
        assert_eq!(
            Session::with_bombs(4, BombSet::default()).unwrap_err(),
            GridError::NoBombs
        );
        let big = BombSet::from_indices(&Grid::new(9).unwrap(), [9]).unwrap();
        assert_eq!(
            Session::with_bombs(4, big).unwrap_err(),
            GridError::CellOutOfRange { index: 9, cells: 4 }
        );
    }

    #[test]
    fn full_playthrough_on_a_random_board() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut session = Session::start(Level::Easy, &mut rng).unwrap();
        let safe: Vec<_> = session
            .grid()
            .indices()
            .filter(|index| !session.is_bomb(*index))
            .collect();

        for index in safe {
            assert!(matches!(
                session.on_cell_activated(index),
                Activation::Revealed { .. }
            ));
        }
        assert_eq!(session.score(), 84);
        assert_eq!(session.status(), RoundStatus::Won);
    }

    #[test]
    fn renders_rows() {
        let mut session = session(4, &[1]);
        session.on_cell_activated(4);
        assert_eq!(session.to_string(), " · ·\n · 1\n");
    }
}
