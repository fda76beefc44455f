use serde::{Deserialize, Serialize};

/// Direction the snake can move. Also the action space shared by every agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Number of discrete actions an agent chooses between
pub const NUM_ACTIONS: usize = 4;

impl Direction {
    /// All directions in action-index order
    pub const ALL: [Direction; NUM_ACTIONS] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Returns true if turning from self to other would be a 180-degree turn
    pub fn is_opposite(&self, other: Direction) -> bool {
        matches!(
            (self, other),
            (Direction::Up, Direction::Down)
                | (Direction::Down, Direction::Up)
                | (Direction::Left, Direction::Right)
                | (Direction::Right, Direction::Left)
        )
    }

    /// Returns the delta (dx, dy) for moving in this direction
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Inverse of [`Direction::delta`] for unit vectors
    pub fn from_delta(dx: i32, dy: i32) -> Option<Direction> {
        match (dx, dy) {
            (0, -1) => Some(Direction::Up),
            (0, 1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            _ => None,
        }
    }

    /// Action index: 0 = up, 1 = down, 2 = left, 3 = right
    pub fn index(&self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    /// Map an action index back to a direction. Out-of-range indices wrap.
    pub fn from_index(idx: usize) -> Direction {
        Self::ALL[idx % NUM_ACTIONS]
    }

    /// Heading after a 90° counter-clockwise turn (screen coordinates, y down)
    pub fn turned_left(&self) -> Direction {
        let (dx, dy) = self.delta();
        Self::rotate(dy, -dx)
    }

    /// Heading after a 90° clockwise turn (screen coordinates, y down)
    pub fn turned_right(&self) -> Direction {
        let (dx, dy) = self.delta();
        Self::rotate(-dy, dx)
    }

    fn rotate(dx: i32, dy: i32) -> Direction {
        // a quarter turn of a unit vector is always a unit vector
        Self::from_delta(dx, dy).unwrap_or(Direction::Up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_directions() {
        assert!(Direction::Up.is_opposite(Direction::Down));
        assert!(Direction::Down.is_opposite(Direction::Up));
        assert!(Direction::Left.is_opposite(Direction::Right));
        assert!(Direction::Right.is_opposite(Direction::Left));

        assert!(!Direction::Up.is_opposite(Direction::Left));
        assert!(!Direction::Up.is_opposite(Direction::Right));
        assert!(!Direction::Up.is_opposite(Direction::Up));
    }

    #[test]
    fn test_direction_delta() {
        assert_eq!(Direction::Up.delta(), (0, -1));
        assert_eq!(Direction::Down.delta(), (0, 1));
        assert_eq!(Direction::Left.delta(), (-1, 0));
        assert_eq!(Direction::Right.delta(), (1, 0));
    }

    #[test]
    fn test_index_mapping() {
        for (i, dir) in Direction::ALL.iter().enumerate() {
            assert_eq!(dir.index(), i);
            assert_eq!(Direction::from_index(i), *dir);
        }
        assert_eq!(Direction::from_index(5), Direction::Down);
    }

    #[test]
    fn test_relative_turns() {
        assert_eq!(Direction::Up.turned_left(), Direction::Left);
        assert_eq!(Direction::Up.turned_right(), Direction::Right);
        assert_eq!(Direction::Right.turned_left(), Direction::Up);
        assert_eq!(Direction::Right.turned_right(), Direction::Down);
        assert_eq!(Direction::Down.turned_left(), Direction::Right);
        assert_eq!(Direction::Left.turned_right(), Direction::Up);
    }
}
