use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::grid::{Cell, Grid};

/// Which way a fence spans from its start coordinate.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Orientation {
    North,
    East,
}

impl Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Orientation::North => "north",
                Orientation::East => "east",
            }
        )
    }
}

impl FromStr for Orientation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "north" => Ok(Orientation::North),
            "east" => Ok(Orientation::East),
            _ => Err(anyhow::anyhow!("Invalid orientation: {}", s)),
        }
    }
}

/// The obstacle categories, used to pick the marker character drawn on the
/// grid.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Guard,
    Fence,
    Sensor,
    Camera,
}

impl ObstacleKind {
    pub fn marker(&self) -> char {
        match self {
            ObstacleKind::Guard => 'G',
            ObstacleKind::Fence => 'F',
            ObstacleKind::Sensor => 'S',
            ObstacleKind::Camera => 'C',
        }
    }
}

/// A registered obstacle, positioned in world coordinates.
///
/// Obstacles are rasterized onto each [`Grid`] when it is constructed;
/// anything falling outside the grid window is clipped silently.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Obstacle {
    Guard {
        x: i32,
        y: i32,
    },
    Fence {
        x: i32,
        y: i32,
        orientation: Orientation,
        length: i32,
    },
    Sensor {
        x: i32,
        y: i32,
        radius: f32,
    },
    Camera {
        x: i32,
        y: i32,
        facing: Direction,
    },
}

impl Obstacle {
    pub fn kind(&self) -> ObstacleKind {
        match self {
            Obstacle::Guard { .. } => ObstacleKind::Guard,
            Obstacle::Fence { .. } => ObstacleKind::Fence,
            Obstacle::Sensor { .. } => ObstacleKind::Sensor,
            Obstacle::Camera { .. } => ObstacleKind::Camera,
        }
    }

    /// Draw this obstacle onto the grid.
    pub fn render(&self, grid: &mut Grid) {
        let cell = Cell::Blocked(self.kind());

        match *self {
            Obstacle::Guard { x, y } => {
                let (map_x, map_y) = grid.map_coordinates(x, y);
                grid.plot_if_in_bounds(map_x, map_y, cell);
            }
            Obstacle::Fence {
                x,
                y,
                orientation,
                length,
            } => {
                let (map_x, map_y) = grid.map_coordinates(x, y);
                for i in 0..length {
                    match orientation {
                        // northward means up the map, towards row zero
                        Orientation::North => grid.plot_if_in_bounds(map_x, map_y - i, cell),
                        Orientation::East => grid.plot_if_in_bounds(map_x + i, map_y, cell),
                    }
                }
            }
            Obstacle::Sensor { x, y, radius } => {
                let (map_x, map_y) = grid.map_coordinates(x, y);
                // a sliver of coverage blocks the whole cell, so round up
                let rounded = radius.ceil() as i32;
                let threshold = (f64::from(rounded) - 0.5).powi(2);
                for dy in -rounded..=rounded {
                    for dx in -rounded..=rounded {
                        if f64::from(dx * dx + dy * dy) < threshold {
                            grid.plot_if_in_bounds(map_x + dx, map_y + dy, cell);
                        }
                    }
                }
            }
            Obstacle::Camera { x, y, facing } => {
                let (map_x, map_y) = grid.map_coordinates(x, y);
                let (fx, fy) = facing.delta();
                // the cone covers every cell whose distance along the
                // facing axis is at least its perpendicular offset
                for map_row in 0..grid.height() {
                    for map_col in 0..grid.width() {
                        let vx = map_col - map_x;
                        let vy = map_row - map_y;
                        let along = vx * fx + vy * fy;
                        let across = (vx * fy - vy * fx).abs();
                        if along >= across {
                            grid.plot_if_in_bounds(map_col, map_row, cell);
                        }
                    }
                }
            }
        }
    }
}
