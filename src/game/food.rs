use super::constants::GRID_SIZE;
use super::types::Position;
use rand::Rng;

/// Uniform cell anywhere on the grid. The snake body is not excluded, so
/// food can land under the snake and stay unreachable until it moves off.
pub fn place<R: Rng + ?Sized>(rng: &mut R) -> Position {
    Position::new(rng.gen_range(0..GRID_SIZE), rng.gen_range(0..GRID_SIZE))
}
