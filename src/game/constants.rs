pub const GRID_SIZE: i32 = 18;
pub const GRID_CELLS: usize = (GRID_SIZE * GRID_SIZE) as usize;
pub const TICK_MS: u64 = 100;

pub const ALL_TIME_CAPACITY: usize = 10;
pub const WEEKLY_CAPACITY: usize = 20;

pub const GUEST_LABEL: &str = "Guest";
pub const DEFAULT_SESSION: &str = "main";
