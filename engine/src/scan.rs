use crate::direction::Direction;
use crate::grid::Grid;
use crate::obstacle::Obstacle;

/// Coordinates of the scanned point inside the 3x3 window.
const CENTER: (i32, i32) = (1, 1);

/// A local safety scan: a 3x3 window rendered around a world point,
/// reporting which cardinal neighbors are free of obstacles.
#[derive(Debug)]
pub struct SafetyScan {
    window: Grid,
}

impl SafetyScan {
    /// Build the scan window so that the given world point sits at its
    /// center, re-rendering all obstacles into it.
    pub fn around(
        world_x: i32,
        world_y: i32,
        obstacles: &[Obstacle],
    ) -> Result<Self, anyhow::Error> {
        let window = Grid::new(world_x - 1, world_y - 1, 3, 3, obstacles)?;
        Ok(Self { window })
    }

    /// Whether the scanned point itself is unobstructed.
    pub fn is_safe_here(&self) -> bool {
        self.is_safe(CENTER.0, CENTER.1)
    }

    /// The cardinal directions whose neighbor cell is free, in fixed
    /// north, south, east, west order.
    pub fn safe_directions(&self) -> Vec<Direction> {
        let (cx, cy) = CENTER;
        let mut safe = Vec::new();
        if self.is_safe(cx, cy - 1) {
            safe.push(Direction::North);
        }
        if self.is_safe(cx, cy + 1) {
            safe.push(Direction::South);
        }
        if self.is_safe(cx + 1, cy) {
            safe.push(Direction::East);
        }
        if self.is_safe(cx - 1, cy) {
            safe.push(Direction::West);
        }
        safe
    }

    fn is_safe(&self, map_x: i32, map_y: i32) -> bool {
        // probing outside the window is a caller bug, not a user error
        assert!(
            self.window.contains_point(map_x, map_y),
            "safety scan probed outside its own window"
        );
        !self.window.is_obstructed(map_x, map_y)
    }
}
