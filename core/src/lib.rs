use core::ops::BitOr;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use engine::*;
pub use error::*;
pub use generator::*;
pub use input::*;
pub use types::*;

mod engine;
mod error;
mod generator;
mod input;
mod types;

/// Grid side length shared by all difficulty presets.
pub const DEFAULT_SIZE: Coord = 10;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Clamps to a feasible configuration: an even side length and a mine
    /// count that leaves the start cell plus at least one more cell free.
    pub fn new(size: Coord, mines: CellCount) -> Self {
        let size = size.clamp(2, 100);
        let size = size - size % 2;
        let total = (size * size) as CellCount;
        let mines = mines.clamp(1, total - 2);
        Self::new_unchecked(size, mines)
    }

    pub const fn half(&self) -> Coord {
        self.size / 2
    }

    pub const fn total_cells(&self) -> CellCount {
        (self.size * self.size) as CellCount
    }

    /// Where the player spawns: mid-x on the near edge.
    pub const fn start_cell(&self) -> Cell {
        (0, self.half() - 1)
    }
}

/// The three fixed presets, all on the 10x10 grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub const fn mine_count(self) -> CellCount {
        match self {
            Self::Easy => 8,
            Self::Normal => 14,
            Self::Hard => 22,
        }
    }

    pub fn game_config(self) -> GameConfig {
        GameConfig::new(DEFAULT_SIZE, self.mine_count())
    }
}

/// Immutable mine placement for one session, stored as a boolean mask over
/// the centered grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineField {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

impl MineField {
    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Self {
        let mine_count = mine_mask
            .iter()
            .filter(|&&is_mine| is_mine)
            .count()
            .try_into()
            .unwrap_or(CellCount::MAX);
        Self {
            mine_mask,
            mine_count,
        }
    }

    pub fn from_cells(size: Coord, cells: &[Cell]) -> Result<Self> {
        let size = size.max(2);
        let size = size - size % 2;
        let half = size / 2;
        let mut mine_mask: Array2<bool> = Array2::default((size as usize, size as usize));

        for &cell in cells {
            let index = mask_index(cell, half).ok_or(GameError::InvalidCell)?;
            mine_mask[index] = true;
        }

        Ok(Self::from_mine_mask(mine_mask))
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig::new_unchecked(self.size(), self.mine_count)
    }

    pub fn size(&self) -> Coord {
        self.mine_mask.dim().0 as Coord
    }

    pub fn half(&self) -> Coord {
        self.size() / 2
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn safe_cell_count(&self) -> CellCount {
        (self.mine_mask.len() as CellCount) - self.mine_count
    }

    /// Mine membership. Out-of-range cells are never mines, which is what
    /// lets the adjacency counter probe all 8 neighbors unconditionally.
    pub fn contains(&self, cell: Cell) -> bool {
        mask_index(cell, self.half()).is_some_and(|index| self.mine_mask[index])
    }

    /// Number of mines in the 8-neighborhood, always in `[0, 8]`.
    pub fn adjacent_mines(&self, cell: Cell) -> u8 {
        neighbors(cell).filter(|&pos| self.contains(pos)).count() as u8
    }

    pub fn iter_mines(&self) -> impl Iterator<Item = Cell> + '_ {
        let half = self.half();
        self.mine_mask
            .indexed_iter()
            .filter(|&(_, &is_mine)| is_mine)
            .map(move |((ix, iz), _)| (ix as Coord - half, iz as Coord - half))
    }
}

/// What a single tick changed, from the host's point of view.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TickOutcome {
    NoChange,
    Moved,
    Revealed,
    Detonated,
    Won,
}

impl TickOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

impl BitOr for TickOutcome {
    type Output = TickOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use TickOutcome::*;
        match (self, rhs) {
            (Detonated, _) | (_, Detonated) => Detonated,
            (Won, _) | (_, Won) => Won,
            (Revealed, _) | (_, Revealed) => Revealed,
            (Moved, _) | (_, Moved) => Moved,
            (NoChange, NoChange) => NoChange,
        }
    }
}
