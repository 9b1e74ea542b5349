use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PuzzleError;
use crate::observation::{Cell, Grid};
use crate::types::Pos;

/// Size and population of randomly generated levels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub width: usize,
    pub height: usize,
    pub num_boxes: usize,
    /// Thickness of the border ring in which boxes are never placed.
    pub box_margin: usize,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self { width: 6, height: 6, num_boxes: 2, box_margin: 1 }
    }
}

impl LevelConfig {
    /// Cells at least `box_margin` away from every border.
    #[must_use]
    pub fn interior_cells(&self) -> Vec<Pos> {
        let m = self.box_margin;
        let xs = m..self.width.saturating_sub(m);
        let ys = m..self.height.saturating_sub(m);
        ys.flat_map(|y| xs.clone().map(move |x| Pos::new(x, y))).collect()
    }

    fn all_cells(&self) -> Vec<Pos> {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| Pos::new(x, y)))
            .collect()
    }
}

/// A single puzzle: the player, the boxes and the targets on an open grid.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Level {
    width: usize,
    height: usize,
    pub(crate) player: Pos,
    pub(crate) boxes: BTreeSet<Pos>,
    targets: BTreeSet<Pos>,
}

impl Level {
    /// Samples a fresh level: boxes from the interior first, then the player
    /// and the targets from whatever cells are left.
    ///
    /// # Errors
    ///
    /// Fails when the grid cannot fit the requested population under the
    /// configured margin.
    pub fn generate(config: &LevelConfig, rng: &mut fastrand::Rng) -> Result<Self, PuzzleError> {
        let LevelConfig { width, height, num_boxes, box_margin } = *config;
        if width == 0 || height == 0 {
            return Err(PuzzleError::EmptyGrid { width, height });
        }

        let mut interior = config.interior_cells();
        if interior.len() < num_boxes {
            return Err(PuzzleError::InsufficientInterior {
                interior: interior.len(),
                boxes: num_boxes,
                margin: box_margin,
            });
        }
        rng.shuffle(&mut interior);
        let boxes: BTreeSet<Pos> = interior.into_iter().take(num_boxes).collect();

        let mut free: Vec<Pos> = config.all_cells().into_iter().filter(|p| !boxes.contains(p)).collect();
        if free.len() < num_boxes + 1 {
            return Err(PuzzleError::InsufficientCells { free: free.len(), targets: num_boxes });
        }
        rng.shuffle(&mut free);
        let player = free[0];
        let targets: BTreeSet<Pos> = free[1..=num_boxes].iter().copied().collect();

        Ok(Self { width, height, player, boxes, targets })
    }

    /// Builds a level from explicit positions.
    ///
    /// # Errors
    ///
    /// Rejects out-of-bounds cells, repeated cells and box/target count mismatches.
    pub fn from_parts(
        width: usize,
        height: usize,
        player: Pos,
        boxes: impl IntoIterator<Item = Pos>,
        targets: impl IntoIterator<Item = Pos>,
    ) -> Result<Self, PuzzleError> {
        if width == 0 || height == 0 {
            return Err(PuzzleError::EmptyGrid { width, height });
        }
        let in_bounds = |p: Pos| if p.x < width && p.y < height { Ok(p) } else { Err(PuzzleError::OutOfBounds(p)) };
        in_bounds(player)?;

        let collect = |cells: Vec<Pos>| -> Result<BTreeSet<Pos>, PuzzleError> {
            let mut set = BTreeSet::new();
            for p in cells {
                if !set.insert(in_bounds(p)?) {
                    return Err(PuzzleError::DuplicateCell(p));
                }
            }
            Ok(set)
        };
        let boxes = collect(boxes.into_iter().collect())?;
        let targets = collect(targets.into_iter().collect())?;
        if boxes.len() != targets.len() {
            return Err(PuzzleError::CountMismatch { boxes: boxes.len(), targets: targets.len() });
        }
        if boxes.contains(&player) {
            return Err(PuzzleError::DuplicateCell(player));
        }
        Ok(Self { width, height, player, boxes, targets })
    }

    /// Parses a rectangular text board.
    ///
    /// `.` empty, `@` player, `$` box, `*` target, `+` box on target and
    /// `&` player on target. Blank lines and surrounding whitespace are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::Parse`] for ragged rows, unknown glyphs or a
    /// missing/duplicated player, and any error of [`Level::from_parts`].
    pub fn parse(text: &str) -> Result<Self, PuzzleError> {
        let rows: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.chars().count());

        let mut player = None;
        let mut boxes = Vec::new();
        let mut targets = Vec::new();
        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(PuzzleError::Parse(format!("row {y} has {} cells, expected {width}", row.chars().count())));
            }
            for (x, glyph) in row.chars().enumerate() {
                let pos = Pos::new(x, y);
                match glyph {
                    '.' => {}
                    '$' => boxes.push(pos),
                    '*' => targets.push(pos),
                    '+' => {
                        boxes.push(pos);
                        targets.push(pos);
                    }
                    '@' | '&' => {
                        if player.replace(pos).is_some() {
                            return Err(PuzzleError::Parse("more than one player".into()));
                        }
                        if glyph == '&' {
                            targets.push(pos);
                        }
                    }
                    other => return Err(PuzzleError::Parse(format!("unknown glyph {other:?} at {pos:?}"))),
                }
            }
        }
        let player = player.ok_or_else(|| PuzzleError::Parse("no player".into()))?;
        Self::from_parts(width, height, player, boxes, targets)
    }

    /// Rebuilds a level from its encoded grid.
    ///
    /// The player code hides whatever lies beneath it; since boxes and
    /// targets always come in equal numbers, one target short means the
    /// player stands on it.
    ///
    /// # Errors
    ///
    /// Fails on unknown codes, on anything but exactly one player and on
    /// counts that no level could produce.
    pub fn from_grid(grid: &Grid) -> Result<Self, PuzzleError> {
        let mut player = None;
        let mut boxes = Vec::new();
        let mut targets = Vec::new();
        for (i, &code) in grid.cells.iter().enumerate() {
            let pos = Pos::new(i % grid.width, i / grid.width);
            match Cell::from_code(code) {
                Some(Cell::Empty) => {}
                Some(Cell::Player) => {
                    if player.replace(pos).is_some() {
                        return Err(PuzzleError::Parse("more than one player".into()));
                    }
                }
                Some(Cell::Box) => boxes.push(pos),
                Some(Cell::Target) => targets.push(pos),
                Some(Cell::BoxOnTarget) => {
                    boxes.push(pos);
                    targets.push(pos);
                }
                None => return Err(PuzzleError::Parse(format!("unknown cell code {code} at {pos:?}"))),
            }
        }
        let player = player.ok_or_else(|| PuzzleError::Parse("no player".into()))?;
        if targets.len() + 1 == boxes.len() {
            targets.push(player);
        }
        Self::from_parts(grid.width, grid.height, player, boxes, targets)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn player(&self) -> Pos {
        self.player
    }

    #[must_use]
    pub fn boxes(&self) -> &BTreeSet<Pos> {
        &self.boxes
    }

    #[must_use]
    pub fn targets(&self) -> &BTreeSet<Pos> {
        &self.targets
    }

    #[must_use]
    pub fn boxes_on_target(&self) -> usize {
        self.boxes.intersection(&self.targets).count()
    }

    /// Solved when the boxes cover exactly the targets.
    #[must_use]
    pub fn is_win(&self) -> bool {
        self.boxes == self.targets
    }

    /// Integer grid view of the level, row-major, the player drawn last.
    #[must_use]
    pub fn encode(&self) -> Grid {
        let mut grid = Grid::new(self.width, self.height);
        for &t in &self.targets {
            grid.set(t, Cell::Target);
        }
        for &b in &self.boxes {
            let cell = if self.targets.contains(&b) { Cell::BoxOnTarget } else { Cell::Box };
            grid.set(b, cell);
        }
        grid.set(self.player, Cell::Player);
        grid
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                let p = Pos::new(x, y);
                let glyph = match (p == self.player, self.boxes.contains(&p), self.targets.contains(&p)) {
                    (true, _, true) => '&',
                    (true, _, false) => '@',
                    (false, true, true) => '+',
                    (false, true, false) => '$',
                    (false, false, true) => '*',
                    (false, false, false) => '.',
                };
                write!(f, "{glyph}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
