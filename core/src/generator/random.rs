use ndarray::Array2;

use super::*;

/// Rejected samples allowed per requested mine before the generator gives
/// up. Feasible configurations finish well below this; the bound exists so
/// an arbitrary configuration fails with an error instead of spinning.
const ATTEMPT_BUDGET_PER_MINE: u32 = 64;

/// Uniform random placement with rejection of duplicates and of the start
/// cell, bounded by an attempt budget.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RandomFieldGenerator {
    seed: u64,
    start: Cell,
}

impl RandomFieldGenerator {
    pub fn new(seed: u64, start: Cell) -> Self {
        Self { seed, start }
    }
}

impl FieldGenerator for RandomFieldGenerator {
    fn generate(self, config: GameConfig) -> Result<MineField> {
        use rand::prelude::*;

        let half = config.half();
        let size = config.size as usize;
        // one placeable cell per grid cell, minus the start cell
        let capacity = config.total_cells() - 1;
        if config.mines >= capacity {
            return Err(GameError::InfeasibleMineCount {
                requested: config.mines,
                capacity,
            });
        }

        let budget = u32::from(config.mines)
            .saturating_mul(ATTEMPT_BUDGET_PER_MINE)
            .max(1024);
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut mine_mask: Array2<bool> = Array2::default((size, size));
        let mut placed: CellCount = 0;
        let mut attempts: u32 = 0;

        while placed < config.mines {
            if attempts >= budget {
                return Err(GameError::PlacementExhausted { attempts });
            }
            attempts += 1;

            let cell = (rng.random_range(-half..half), rng.random_range(-half..half));
            if cell == self.start {
                continue;
            }
            let Some(index) = mask_index(cell, half) else {
                continue;
            };
            if mine_mask[index] {
                continue;
            }

            mine_mask[index] = true;
            placed += 1;
        }

        log::debug!(
            "placed {} mines in {} samples (seed {})",
            placed,
            attempts,
            self.seed
        );
        Ok(MineField::from_mine_mask(mine_mask))
    }
}
