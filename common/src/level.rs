use std::fmt;

use crate::error::GridError;

/// Bombs placed in every round, whatever the grid size.
pub const BOMBS_PER_ROUND: usize = 16;

/// Difficulty presets. Harder levels use smaller grids with the same bomb
/// count, so bomb density goes up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Easy = 1,
    Medium = 2,
    Hard = 3,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Easy, Level::Medium, Level::Hard];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn cell_count(self) -> usize {
        match self {
            Level::Easy => 100,
            Level::Medium => 81,
            Level::Hard => 49,
        }
    }

    pub fn bomb_count(self) -> usize {
        BOMBS_PER_ROUND
    }
}

impl TryFrom<u8> for Level {
    type Error = GridError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            1 => Ok(Level::Easy),
            2 => Ok(Level::Medium),
            3 => Ok(Level::Hard),
            other => Err(GridError::UnknownLevel(other)),
        }
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.id()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Easy => "easy",
            Level::Medium => "medium",
            Level::Hard => "hard",
        };
        write!(f, "{} ({} cells)", name, self.cell_count())
    }
}

/// Number of cells for a level id, or 0 when the id is unknown.
///
/// Callers must treat 0 as an invalid configuration and refuse to start a
/// round; [`Level::try_from`] does that check for them.
pub fn cells_number(level_id: u8) -> usize {
    Level::try_from(level_id).map_or(0, Level::cell_count)
}
