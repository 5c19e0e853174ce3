use crate::*;
pub use random::*;

mod random;

/// Produces the immutable mine placement for a new session.
pub trait FieldGenerator {
    fn generate(self, config: GameConfig) -> Result<MineField>;
}
