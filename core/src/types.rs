use serde::{Deserialize, Serialize};

/// Single coordinate axis. The grid is centered at the origin, so cells use
/// signed coordinates in `[-N/2, N/2 - 1]`.
pub type Coord = i32;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// One discrete grid cell, identified by integer `(x, z)`.
pub type Cell = (Coord, Coord);

/// Continuous player position. Not confined to cell centers; the engine
/// discretizes it by rounding each axis.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub z: f32,
}

impl Position {
    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// Center of a cell in continuous coordinates.
    pub fn at_cell((x, z): Cell) -> Self {
        Self::new(x as f32, z as f32)
    }

    /// The nearest discrete cell, rounding each axis independently.
    pub fn rounded_cell(self) -> Cell {
        (self.x.round() as Coord, self.z.round() as Coord)
    }

    /// Squared Euclidean distance to a cell's center. Squared so that the
    /// detonation threshold can be compared without sqrt rounding.
    pub fn distance_sq_to(self, (x, z): Cell) -> f32 {
        let dx = self.x - x as f32;
        let dz = self.z - z as f32;
        dx * dx + dz * dz
    }
}

pub(crate) const DISPLACEMENTS: [(Coord, Coord); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// The 8-neighborhood of a cell. No bounds filtering: out-of-range neighbors
/// are simply never present in a mine mask, so membership tests handle edges
/// and corners naturally.
pub fn neighbors((x, z): Cell) -> impl Iterator<Item = Cell> {
    DISPLACEMENTS.iter().map(move |&(dx, dz)| (x + dx, z + dz))
}

/// Maps a centered cell coordinate into a `(N, N)` mask index, or `None` when
/// the cell lies outside the grid.
pub(crate) fn mask_index((x, z): Cell, half: Coord) -> Option<[usize; 2]> {
    if x < -half || x >= half || z < -half || z >= half {
        return None;
    }
    Some([(x + half) as usize, (z + half) as usize])
}
