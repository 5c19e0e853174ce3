use core::num::Saturating;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Fixed tick interval driving the session, in milliseconds.
pub const TICK_INTERVAL_MS: u32 = 16;

/// Distance the player covers per axis per tick while a direction is held.
pub const STEP_PER_TICK: f32 = 0.1;

/// The player must come this close to a mined cell's center to detonate it.
/// Merely entering the cell's outer region is survivable.
pub const DETONATION_RADIUS: f32 = 0.3;

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum EngineState {
    #[default]
    Ready,
    Active,
    GameOver,
    Victory,
}

impl EngineState {
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::GameOver | Self::Victory)
    }
}

/// One play-through: continuous player position over an immutable mine
/// field, with a grow-only revealed mask. `tick` is the only transition
/// function; once the state is finished the session is frozen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WalkEngine {
    field: MineField,
    revealed: Array2<bool>,
    revealed_count: Saturating<CellCount>,
    position: Position,
    exploded: Option<Cell>,
    state: EngineState,
}

impl WalkEngine {
    /// Fresh session: player at the start cell's center, revealed set
    /// seeded with the start cell.
    pub fn new(field: MineField) -> Self {
        let size = field.size() as usize;
        let start = field.game_config().start_cell();
        let mut engine = Self {
            field,
            revealed: Array2::default((size, size)),
            revealed_count: Saturating(0),
            position: Position::at_cell(start),
            exploded: None,
            state: Default::default(),
        };
        engine.reveal_cell(start);
        engine
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn game_over(&self) -> bool {
        matches!(self.state, EngineState::GameOver)
    }

    pub fn victory(&self) -> bool {
        matches!(self.state, EngineState::Victory)
    }

    pub fn field(&self) -> &MineField {
        &self.field
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn current_cell(&self) -> Cell {
        self.position.rounded_cell()
    }

    pub fn exploded_cell(&self) -> Option<Cell> {
        self.exploded
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count.0
    }

    pub fn is_revealed(&self, cell: Cell) -> bool {
        mask_index(cell, self.field.half()).is_some_and(|index| self.revealed[index])
    }

    /// Advances the session by one fixed tick: integrate the held input,
    /// reveal and probe the resulting cell, then check the far boundary.
    /// No-op once the session is finished.
    pub fn tick(&mut self, input: InputFlags) -> TickOutcome {
        if self.state.is_finished() {
            return TickOutcome::NoChange;
        }
        self.mark_started();

        let outcome = self.integrate(input) | self.reveal_and_probe();
        if matches!(outcome, TickOutcome::Detonated) {
            return outcome;
        }

        outcome | self.check_victory()
    }

    /// Applies the held directions at fixed per-axis speed, then clamps both
    /// axes independently to the grid extent. Diagonal input is deliberately
    /// not normalized.
    fn integrate(&mut self, input: InputFlags) -> TickOutcome {
        let (dx, dz) = input.axes();
        if dx == 0 && dz == 0 {
            return TickOutcome::NoChange;
        }

        let min = -self.field.half() as f32;
        let max = (self.field.half() - 1) as f32;
        let next = Position::new(
            (self.position.x + dx as f32 * STEP_PER_TICK).clamp(min, max),
            (self.position.z + dz as f32 * STEP_PER_TICK).clamp(min, max),
        );

        if next == self.position {
            return TickOutcome::NoChange;
        }
        self.position = next;
        TickOutcome::Moved
    }

    /// Discretizes the position, reveals that cell, and detonates when the
    /// player is strictly inside the detonation radius of a mined cell.
    fn reveal_and_probe(&mut self) -> TickOutcome {
        let cell = self.position.rounded_cell();
        let revealed = self.reveal_cell(cell);

        if self.field.contains(cell)
            && self.position.distance_sq_to(cell) < DETONATION_RADIUS * DETONATION_RADIUS
        {
            self.exploded = Some(cell);
            self.state = EngineState::GameOver;
            log::debug!("detonated at {:?}", cell);
            return TickOutcome::Detonated;
        }

        if revealed {
            TickOutcome::Revealed
        } else {
            TickOutcome::NoChange
        }
    }

    fn check_victory(&mut self) -> TickOutcome {
        let win_line = -self.field.half() as f32 + 0.5;
        if self.position.z <= win_line {
            self.state = EngineState::Victory;
            log::debug!("crossed the far boundary at {:?}", self.position);
            TickOutcome::Won
        } else {
            TickOutcome::NoChange
        }
    }

    fn reveal_cell(&mut self, cell: Cell) -> bool {
        let Some(index) = mask_index(cell, self.field.half()) else {
            return false;
        };
        if self.revealed[index] {
            return false;
        }
        self.revealed[index] = true;
        self.revealed_count += 1;
        true
    }

    fn mark_started(&mut self) {
        if self.state.is_ready() {
            self.state = EngineState::Active;
        }
    }

    /// Read-only view handed across the render boundary once per tick.
    pub fn snapshot(&self) -> Snapshot {
        let revealed = self
            .field
            .game_config()
            .iter_cells()
            .filter(|&cell| self.is_revealed(cell))
            .map(|cell| RevealedCell {
                cell,
                adjacent_mines: self.field.adjacent_mines(cell),
                mine: self.field.contains(cell),
            })
            .collect();

        Snapshot {
            mines: self.field.iter_mines().collect(),
            revealed,
            position: self.position,
            exploded: self.exploded,
            game_over: self.game_over(),
            victory: self.victory(),
        }
    }
}

impl GameConfig {
    /// All cells of the grid in row-major order, in centered coordinates.
    pub fn iter_cells(&self) -> impl Iterator<Item = Cell> + use<> {
        let half = self.half();
        (-half..half).flat_map(move |x| (-half..half).map(move |z| (x, z)))
    }
}

/// One revealed cell as the renderer sees it.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct RevealedCell {
    pub cell: Cell,
    pub adjacent_mines: u8,
    pub mine: bool,
}

/// Per-tick game-state snapshot for the rendering collaborator. Owned and
/// serializable; exposes no way to mutate the session.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub mines: Vec<Cell>,
    pub revealed: Vec<RevealedCell>,
    pub position: Position,
    pub exploded: Option<Cell>,
    pub game_over: bool,
    pub victory: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(mines: &[Cell]) -> MineField {
        MineField::from_cells(10, mines).unwrap()
    }

    fn engine(mines: &[Cell]) -> WalkEngine {
        WalkEngine::new(field(mines))
    }

    #[test]
    fn new_session_reveals_only_the_start_cell() {
        let engine = engine(&[(3, 3)]);

        assert_eq!(engine.state(), EngineState::Ready);
        assert_eq!(engine.revealed_count(), 1);
        assert!(engine.is_revealed((0, 4)));
        assert!(!engine.is_revealed((0, 3)));
    }

    #[test]
    fn first_tick_activates_the_session() {
        let mut engine = engine(&[]);

        engine.tick(InputFlags::empty());
        assert_eq!(engine.state(), EngineState::Active);
    }

    #[test]
    fn held_flag_moves_one_step_per_tick() {
        let mut engine = engine(&[]);

        engine.tick(InputFlags::UP);
        let pos = engine.position();
        assert_eq!(pos.x, 0.0);
        assert_eq!(pos.z, 4.0 - STEP_PER_TICK);
    }

    #[test]
    fn diagonal_movement_is_not_normalized() {
        let mut engine = engine(&[]);

        engine.tick(InputFlags::UP | InputFlags::LEFT);
        let pos = engine.position();
        assert_eq!(pos.x, -STEP_PER_TICK);
        assert_eq!(pos.z, 4.0 - STEP_PER_TICK);
    }

    #[test]
    fn position_never_leaves_the_grid_extent() {
        let flag_combos = [
            InputFlags::RIGHT | InputFlags::DOWN,
            InputFlags::LEFT | InputFlags::UP,
            InputFlags::all(),
            InputFlags::RIGHT,
            InputFlags::DOWN,
        ];

        for flags in flag_combos {
            let mut engine = engine(&[]);
            for _ in 0..500 {
                engine.tick(flags);
                let pos = engine.position();
                assert!((-5.0..=4.0).contains(&pos.x), "{flags:?} escaped: {pos:?}");
                assert!((-5.0..=4.0).contains(&pos.z), "{flags:?} escaped: {pos:?}");
                if engine.is_finished() {
                    break;
                }
            }
        }
    }

    #[test]
    fn revealed_count_grows_monotonically() {
        let mut engine = engine(&[]);
        let mut prev = engine.revealed_count();

        for _ in 0..200 {
            engine.tick(InputFlags::LEFT);
            let count = engine.revealed_count();
            assert!(count >= prev);
            prev = count;
        }
    }

    #[test]
    fn detonation_requires_strictly_inside_the_radius() {
        // Distances are stored without any arithmetic on the threshold axis,
        // so the comparisons below are exact.
        let mut at_boundary = engine(&[(0, 0)]);
        at_boundary.position = Position::new(0.0, DETONATION_RADIUS);
        at_boundary.tick(InputFlags::empty());
        assert!(!at_boundary.game_over());

        let mut inside = engine(&[(0, 0)]);
        inside.position = Position::new(0.0, 0.29);
        inside.tick(InputFlags::empty());
        assert!(inside.game_over());
        assert_eq!(inside.exploded_cell(), Some((0, 0)));
    }

    #[test]
    fn grazing_a_mined_cell_reveals_it_without_detonating() {
        let mut engine = engine(&[(0, 0)]);
        engine.position = Position::new(0.45, 0.0);

        let outcome = engine.tick(InputFlags::empty());

        assert_eq!(outcome, TickOutcome::Revealed);
        assert!(engine.is_revealed((0, 0)));
        assert!(!engine.game_over());
    }

    #[test]
    fn victory_triggers_at_the_far_boundary() {
        let mut engine = engine(&[]);
        engine.position = Position::new(0.0, -4.41);

        let outcome = engine.tick(InputFlags::UP);

        assert_eq!(outcome, TickOutcome::Won);
        assert!(engine.victory());
        assert!(!engine.game_over());
    }

    #[test]
    fn detonation_on_the_final_row_beats_victory() {
        let mut engine = engine(&[(0, -5)]);
        engine.position = Position::new(0.0, -4.65);

        let outcome = engine.tick(InputFlags::UP);

        assert_eq!(outcome, TickOutcome::Detonated);
        assert!(engine.game_over());
        assert!(!engine.victory());
    }

    #[test]
    fn finished_session_is_frozen() {
        let mut engine = engine(&[]);
        engine.position = Position::new(0.0, -4.6);
        engine.tick(InputFlags::empty());
        assert!(engine.victory());

        let pos = engine.position();
        for _ in 0..10 {
            assert_eq!(engine.tick(InputFlags::DOWN), TickOutcome::NoChange);
        }
        assert_eq!(engine.position(), pos);
        assert!(engine.victory());
    }

    #[test]
    fn snapshot_reports_the_session_without_exposing_mutation() {
        let mut engine = engine(&[(3, 3)]);
        engine.tick(InputFlags::UP);

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.mines, vec![(3, 3)]);
        assert_eq!(snapshot.position, engine.position());
        assert_eq!(snapshot.exploded, None);
        assert!(!snapshot.game_over);
        assert!(!snapshot.victory);

        let start = snapshot
            .revealed
            .iter()
            .find(|revealed| revealed.cell == (0, 4))
            .expect("start cell is revealed");
        assert_eq!(start.adjacent_mines, 0);
        assert!(!start.mine);
    }

    #[test]
    fn snapshot_serializes_for_the_render_boundary() {
        let engine = engine(&[(3, 3)]);
        let json = serde_json::to_value(engine.snapshot()).unwrap();

        assert_eq!(json["mines"][0], serde_json::json!([3, 3]));
        assert_eq!(json["game_over"], serde_json::json!(false));
        assert_eq!(json["position"]["z"], serde_json::json!(4.0));
    }
}
