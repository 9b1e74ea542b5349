use serde::{Deserialize, Serialize};

use crate::error::PuzzleError;

/// A cell coordinate, `x` counting columns from the left and `y` rows from the top.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell in `dir`, or `None` when it would leave a
    /// `width` x `height` grid.
    #[must_use]
    pub fn step(self, dir: Direction, width: usize, height: usize) -> Option<Pos> {
        let (dx, dy) = dir.delta();
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        (x < width && y < height).then_some(Pos { x, y })
    }
}

impl From<(usize, usize)> for Pos {
    fn from((x, y): (usize, usize)) -> Self {
        Self { x, y }
    }
}

/// One of the four moves; the discriminant is the discrete action index.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Unit vector `(dx, dy)` with `y` growing downwards.
    #[must_use]
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    #[must_use]
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    #[must_use]
    pub const fn action(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for Direction {
    type Error = PuzzleError;

    fn try_from(action: usize) -> Result<Self, Self::Error> {
        Direction::ALL
            .get(action)
            .copied()
            .ok_or(PuzzleError::InvalidAction(action))
    }
}

/// Input coming from a human (keyboard) or a window.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Reset,
    Quit,
}
