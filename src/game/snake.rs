use super::types::Position;
use std::collections::VecDeque;

/// Snake body, head first. Cells are distinct and on the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    body: VecDeque<Position>,
}

impl Snake {
    pub fn new(head: Position) -> Self {
        let mut body = VecDeque::new();
        body.push_front(head);
        Self { body }
    }

    #[cfg(test)]
    pub fn from_cells(cells: &[Position]) -> Self {
        assert!(!cells.is_empty(), "snake needs a head");
        Self {
            body: cells.iter().copied().collect(),
        }
    }

    pub fn head(&self) -> Position {
        // The constructor always seeds one cell and nothing pops the last one.
        self.body.front().copied().unwrap_or_else(Position::center)
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Includes the current tail, which has not moved yet when this runs.
    pub fn occupies(&self, cell: Position) -> bool {
        self.body.contains(&cell)
    }

    pub fn advance(&mut self, new_head: Position, grow: bool) {
        self.body.push_front(new_head);
        if !grow {
            self.body.pop_back();
        }
    }

    pub fn cells(&self) -> Vec<Position> {
        self.body.iter().copied().collect()
    }
}
