use super::constants::GRID_SIZE;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
  pub x: i32,
  pub y: i32,
}

impl Position {
  pub const fn new(x: i32, y: i32) -> Self {
    Self { x, y }
  }

  pub fn center() -> Self {
    Self::new(GRID_SIZE / 2, GRID_SIZE / 2)
  }

  pub fn in_bounds(self) -> bool {
    (0..GRID_SIZE).contains(&self.x) && (0..GRID_SIZE).contains(&self.y)
  }

  pub fn step(self, direction: Direction) -> Self {
    let (dx, dy) = direction.delta();
    Self::new(self.x + dx, self.y + dy)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  Up,
  Down,
  Left,
  #[default]
  Right,
}

impl Direction {
  pub fn delta(self) -> (i32, i32) {
    match self {
      Direction::Up => (0, -1),
      Direction::Down => (0, 1),
      Direction::Left => (-1, 0),
      Direction::Right => (1, 0),
    }
  }

  pub fn opposite(self) -> Self {
    match self {
      Direction::Up => Direction::Down,
      Direction::Down => Direction::Up,
      Direction::Left => Direction::Right,
      Direction::Right => Direction::Left,
    }
  }

  pub fn is_opposite(self, other: Direction) -> bool {
    self.opposite() == other
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EndReason {
  Collision,
  Victory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "lowercase")]
pub enum Phase {
  Idle,
  Running,
  Paused,
  Ended(EndReason),
}

/// Outcome of a finished run, handed to the scoreboard exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
  pub score: u32,
  pub is_perfect: bool,
  pub player_label: String,
  pub timestamp_ms: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameSnapshot {
  pub phase: Phase,
  pub snake: Vec<Position>,
  pub food: Position,
  pub score: u32,
  pub direction: Direction,
  #[serde(rename = "gridSize")]
  pub grid_size: i32,
}
