use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

/// The four compass directions an agent can travel in.
///
/// Deltas are expressed in map coordinates, where row 0 is the north edge
/// of the grid, so heading north decreases the map Y.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// The (dx, dy) step for one cell of travel, in map coordinates.
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    pub fn axis(&self) -> Axis {
        match self {
            Direction::East | Direction::West => Axis::X,
            Direction::North | Direction::South => Axis::Y,
        }
    }

    /// The two directions perpendicular to this one, in detour preference
    /// order: north before south, east before west.
    pub fn perpendicular(&self) -> [Direction; 2] {
        match self.axis() {
            Axis::X => [Direction::North, Direction::South],
            Axis::Y => [Direction::East, Direction::West],
        }
    }

    /// The character used to mark a trail cell left by a run in this
    /// direction.
    pub fn marker(&self) -> char {
        match self {
            Direction::North => 'N',
            Direction::East => 'E',
            Direction::South => 'S',
            Direction::West => 'W',
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Direction::North => "north",
                Direction::East => "east",
                Direction::South => "south",
                Direction::West => "west",
            }
        )
    }
}

impl FromStr for Direction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "north" => Ok(Direction::North),
            "east" => Ok(Direction::East),
            "south" => Ok(Direction::South),
            "west" => Ok(Direction::West),
            _ => Err(anyhow::anyhow!("Invalid direction: {}", s)),
        }
    }
}

/// The two movement axes of the grid.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn other(&self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

/// A maximal straight-line advance: one direction and a positive distance
/// in klicks (grid cells).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub direction: Direction,
    pub distance: i32,
}

impl Display for Run {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.direction, self.distance)
    }
}
