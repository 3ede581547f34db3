use super::types::Direction;

/// Maps direction names and keyboard keys onto a direction.
pub fn parse_direction(value: &str) -> Option<Direction> {
    match value.trim().to_ascii_lowercase().as_str() {
        "up" | "arrowup" | "w" => Some(Direction::Up),
        "down" | "arrowdown" | "s" => Some(Direction::Down),
        "left" | "arrowleft" | "a" => Some(Direction::Left),
        "right" | "arrowright" | "d" => Some(Direction::Right),
        _ => None,
    }
}
