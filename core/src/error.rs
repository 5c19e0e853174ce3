use thiserror::Error;

use crate::CellCount;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Cell is outside the grid")]
    InvalidCell,
    #[error("{requested} mines cannot fit a grid with {capacity} placeable cells")]
    InfeasibleMineCount {
        requested: CellCount,
        capacity: CellCount,
    },
    #[error("Mine placement gave up after {attempts} rejected samples")]
    PlacementExhausted { attempts: u32 },
}

pub type Result<T> = core::result::Result<T, GameError>;
