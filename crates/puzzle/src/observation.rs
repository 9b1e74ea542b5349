use crate::types::Pos;

/// Cell codes of the observation grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Cell {
    Empty = 0,
    Player = 1,
    Box = 2,
    Target = 3,
    BoxOnTarget = 4,
}

impl Cell {
    /// Largest code a cell can take.
    pub const MAX: u8 = Cell::BoxOnTarget as u8;

    #[must_use]
    pub fn from_code(code: u8) -> Option<Cell> {
        match code {
            0 => Some(Cell::Empty),
            1 => Some(Cell::Player),
            2 => Some(Cell::Box),
            3 => Some(Cell::Target),
            4 => Some(Cell::BoxOnTarget),
            _ => None,
        }
    }
}

/// Row-major `height x width` grid of cell codes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<u8>,
}

impl Grid {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, cells: vec![Cell::Empty as u8; width * height] }
    }

    pub fn set(&mut self, pos: Pos, cell: Cell) {
        self.cells[pos.y * self.width + pos.x] = cell as u8;
    }

    #[must_use]
    pub fn get(&self, pos: Pos) -> u8 {
        self.cells[pos.y * self.width + pos.x]
    }

    #[must_use]
    pub fn rows(&self) -> std::slice::Chunks<'_, u8> {
        self.cells.chunks(self.width)
    }
}
