use super::constants::{GRID_CELLS, GRID_SIZE};
use super::food;
use super::snake::Snake;
use super::types::{Direction, EndReason, GameSnapshot, Phase, Position};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
  Skipped,
  Moved,
  Ate,
  Ended { reason: EndReason, score: u32 },
}

/// Movement and collision state machine for a single run.
///
/// `heading` is the direction the last tick actually moved in; `direction`
/// is what the next tick will use. A turn opposite to either is rejected,
/// so several turns queued inside one tick can never fold the head back
/// onto the neck.
#[derive(Debug, Clone)]
pub struct Engine {
  snake: Snake,
  heading: Direction,
  direction: Direction,
  food: Position,
  score: u32,
  phase: Phase,
  rng: StdRng,
}

impl Engine {
  pub fn new() -> Self {
    Self::with_rng(StdRng::from_entropy())
  }

  pub fn with_seed(seed: u64) -> Self {
    Self::with_rng(StdRng::seed_from_u64(seed))
  }

  fn with_rng(mut rng: StdRng) -> Self {
    let food = food::place(&mut rng);
    Self {
      snake: Snake::new(Position::center()),
      heading: Direction::default(),
      direction: Direction::default(),
      food,
      score: 0,
      phase: Phase::Idle,
      rng,
    }
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  pub fn score(&self) -> u32 {
    self.score
  }

  pub fn direction(&self) -> Direction {
    self.direction
  }

  pub fn food(&self) -> Position {
    self.food
  }

  pub fn snake_len(&self) -> usize {
    self.snake.len()
  }

  pub fn head(&self) -> Position {
    self.snake.head()
  }

  pub fn start(&mut self) -> bool {
    if self.phase != Phase::Idle {
      return false;
    }
    self.reset();
    true
  }

  pub fn restart(&mut self) {
    self.reset();
  }

  pub fn toggle_pause(&mut self) -> bool {
    self.phase = match self.phase {
      Phase::Running => Phase::Paused,
      Phase::Paused => Phase::Running,
      _ => return false,
    };
    true
  }

  pub fn change_direction(&mut self, direction: Direction) -> bool {
    if self.phase != Phase::Running
      || direction.is_opposite(self.direction)
      || direction.is_opposite(self.heading)
    {
      return false;
    }
    self.direction = direction;
    true
  }

  pub fn tick(&mut self) -> TickOutcome {
    if self.phase != Phase::Running {
      return TickOutcome::Skipped;
    }

    let new_head = self.snake.head().step(self.direction);
    if !new_head.in_bounds() || self.snake.occupies(new_head) {
      self.phase = Phase::Ended(EndReason::Collision);
      return TickOutcome::Ended {
        reason: EndReason::Collision,
        score: self.score,
      };
    }

    self.heading = self.direction;
    let ate = new_head == self.food;
    self.snake.advance(new_head, ate);
    if !ate {
      return TickOutcome::Moved;
    }

    self.score += 1;
    self.food = food::place(&mut self.rng);
    if self.snake.len() == GRID_CELLS {
      self.score = GRID_CELLS as u32;
      self.phase = Phase::Ended(EndReason::Victory);
      return TickOutcome::Ended {
        reason: EndReason::Victory,
        score: self.score,
      };
    }
    TickOutcome::Ate
  }

  pub fn snapshot(&self) -> GameSnapshot {
    GameSnapshot {
      phase: self.phase,
      snake: self.snake.cells(),
      food: self.food,
      score: self.score,
      direction: self.direction,
      grid_size: GRID_SIZE,
    }
  }

  fn reset(&mut self) {
    self.snake = Snake::new(Position::center());
    self.heading = Direction::default();
    self.direction = Direction::default();
    self.food = food::place(&mut self.rng);
    self.score = 0;
    self.phase = Phase::Running;
  }

  #[cfg(test)]
  pub(crate) fn set_food(&mut self, food: Position) {
    self.food = food;
  }

  #[cfg(test)]
  pub(crate) fn load_layout(&mut self, cells: &[Position], heading: Direction, score: u32) {
    self.snake = Snake::from_cells(cells);
    self.heading = heading;
    self.direction = heading;
    self.score = score;
    self.phase = Phase::Running;
  }
}

impl Default for Engine {
  fn default() -> Self {
    Self::new()
  }
}
