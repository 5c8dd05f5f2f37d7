//! Square grid topology with 1-based, row-major cell indices.
//!
//! Index 1 is the top-left cell and `cells` the bottom-right one. A cell's
//! neighbours are found by classifying where it sits on the grid: corner and
//! edge cells only step in the directions that stay on the board, so no
//! neighbour ever wraps around to the opposite side.

use std::{fmt, ops::RangeInclusive};

use crate::error::{GridError, Result};

mod bombs;
mod hints;
mod random;

pub use bombs::{BombSet, place_bombs};
pub use hints::{Hints, compute_hints};
pub use random::IndexSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Grid {
    cells: usize,
    columns: usize,
}

impl Grid {
    /// Validates that `cells` is a non-zero perfect square.
    pub fn new(cells: usize) -> Result<Self> {
        if cells == 0 {
            return Err(GridError::EmptyGrid);
        }

        let columns = cells.isqrt();
        if columns * columns != cells {
            return Err(GridError::NotSquare(cells));
        }

        Ok(Self { cells, columns })
    }

    pub fn cells(&self) -> usize {
        self.cells
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn contains(&self, index: usize) -> bool {
        (1..=self.cells).contains(&index)
    }

    pub fn indices(&self) -> RangeInclusive<usize> {
        1..=self.cells
    }

    pub fn check(&self, index: usize) -> Result<usize> {
        if self.contains(index) {
            Ok(index)
        } else {
            Err(GridError::CellOutOfRange {
                index,
                cells: self.cells,
            })
        }
    }

    /// Zero-based row of a valid index.
    pub fn row(&self, index: usize) -> usize {
        (index - 1) / self.columns
    }

    /// Zero-based column of a valid index.
    pub fn column(&self, index: usize) -> usize {
        (index - 1) % self.columns
    }

    pub fn classify(&self, index: usize) -> Result<PositionClass> {
        self.check(index)?;
        Ok(self.position_of(index))
    }

    // Corners satisfy several of the row/column tests at once, so the order of
    // these checks decides the result: top row, then bottom row, then the side
    // columns.
    fn position_of(&self, index: usize) -> PositionClass {
        let columns = self.columns;
        let bottom_left = self.cells - columns + 1;

        if index <= columns {
            if index == 1 {
                PositionClass::TopLeft
            } else if index == columns {
                PositionClass::TopRight
            } else {
                PositionClass::Top
            }
        } else if index >= bottom_left {
            if index == bottom_left {
                PositionClass::BottomLeft
            } else if index == self.cells {
                PositionClass::BottomRight
            } else {
                PositionClass::Bottom
            }
        } else if index % columns == 0 {
            PositionClass::Right
        } else if (index - 1) % columns == 0 {
            PositionClass::Left
        } else {
            PositionClass::Standard
        }
    }

    /// Neighbours of `index` that exist on the grid.
    pub fn neighbours(&self, index: usize) -> Result<impl Iterator<Item = usize> + '_> {
        let class = self.classify(index)?;
        Ok(class
            .directions()
            .iter()
            .filter_map(move |direction| direction.step(index, self.columns))
            .filter(move |neighbour| self.contains(*neighbour)))
    }
}

/// Position class of `index` on a square grid of `cell_count` cells.
pub fn classify(index: usize, cell_count: usize) -> Result<PositionClass> {
    Grid::new(cell_count)?.classify(index)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Direction {
    /// Index one step away in this direction, or `None` when it would fall
    /// below index 1. Does not check the far edges of the grid.
    pub fn step(self, index: usize, columns: usize) -> Option<usize> {
        match self {
            Direction::Top => index.checked_sub(columns),
            Direction::Bottom => Some(index + columns),
            Direction::Left => index.checked_sub(1),
            Direction::Right => Some(index + 1),
            Direction::TopLeft => index.checked_sub(columns + 1),
            Direction::TopRight => (index + 1).checked_sub(columns),
            Direction::BottomLeft => (index + columns).checked_sub(1),
            Direction::BottomRight => Some(index + columns + 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionClass {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Top,
    Bottom,
    Left,
    Right,
    Standard,
}

impl PositionClass {
    /// Directions that stay on the grid for a cell of this class.
    pub fn directions(self) -> &'static [Direction] {
        use Direction::*;

        match self {
            PositionClass::TopLeft => &[Bottom, BottomRight, Right],
            PositionClass::TopRight => &[Bottom, BottomLeft, Left],
            PositionClass::BottomLeft => &[Top, TopRight, Right],
            PositionClass::BottomRight => &[Top, TopLeft, Left],
            PositionClass::Top => &[Left, Right, BottomLeft, BottomRight, Bottom],
            PositionClass::Bottom => &[Left, Right, TopLeft, TopRight, Top],
            PositionClass::Left => &[Top, TopRight, Right, BottomRight, Bottom],
            PositionClass::Right => &[Top, TopLeft, Left, BottomLeft, Bottom],
            PositionClass::Standard => &[
                Top,
                Bottom,
                Left,
                Right,
                TopLeft,
                TopRight,
                BottomLeft,
                BottomRight,
            ],
        }
    }

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            PositionClass::TopLeft
                | PositionClass::TopRight
                | PositionClass::BottomLeft
                | PositionClass::BottomRight
        )
    }
}

impl fmt::Display for PositionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PositionClass::TopLeft => "top-left",
            PositionClass::TopRight => "top-right",
            PositionClass::BottomLeft => "bottom-left",
            PositionClass::BottomRight => "bottom-right",
            PositionClass::Top => "top",
            PositionClass::Bottom => "bottom",
            PositionClass::Left => "left",
            PositionClass::Right => "right",
            PositionClass::Standard => "standard",
        };
        f.write_str(name)
    }
}
