use std::fmt::Display;

use crate::direction::Direction;
use crate::obstacle::{Obstacle, ObstacleKind};

/// The state of one grid cell.
///
/// Everything other than [`Cell::Free`] counts as obstructed for the route
/// search; the agent and objective markers double as sentinels it
/// recognizes specially.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Cell {
    Free,
    Agent,
    Objective,
    Blocked(ObstacleKind),
    Trail(Direction),
}

impl Default for Cell {
    fn default() -> Self {
        Self::Free
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Cell::Free => '.',
                Cell::Agent => 'A',
                Cell::Objective => 'O',
                Cell::Blocked(kind) => kind.marker(),
                Cell::Trail(direction) => direction.marker(),
            }
        )
    }
}

/// A rectangular window of the world with all known obstacles rasterized
/// onto it.
///
/// Rows are stored north-to-south: map Y 0 is the north edge and world Y
/// grows northward, hence the inversion in [`Grid::map_coordinates`]. The
/// origin is the world coordinate of the south-west cell.
#[derive(Debug)]
pub struct Grid {
    origin_x: i32,
    origin_y: i32,
    width: i32,
    height: i32,
    cells: Vec<Vec<Cell>>,
}

impl Grid {
    /// Create a grid whose south-west cell sits at the given world
    /// coordinate and draw every obstacle onto it, in registration order.
    /// Obstacles falling outside the window are clipped silently.
    pub fn new(
        southwest_x: i32,
        southwest_y: i32,
        width: i32,
        height: i32,
        obstacles: &[Obstacle],
    ) -> Result<Self, anyhow::Error> {
        if width <= 0 || height <= 0 {
            return Err(anyhow::anyhow!(
                "grid dimensions must be positive, got {}x{}",
                width,
                height
            ));
        }

        let mut grid = Self {
            origin_x: southwest_x,
            origin_y: southwest_y,
            width,
            height,
            cells: vec![vec![Cell::Free; width as usize]; height as usize],
        };

        for obstacle in obstacles {
            obstacle.render(&mut grid);
        }

        Ok(grid)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Translate a world coordinate into map coordinates. The result may
    /// lie outside the grid; use [`Grid::contains_point`] before indexing.
    pub fn map_coordinates(&self, world_x: i32, world_y: i32) -> (i32, i32) {
        let map_x = world_x - self.origin_x;
        let map_y = self.height - 1 - (world_y - self.origin_y);
        (map_x, map_y)
    }

    /// Inverse of [`Grid::map_coordinates`].
    pub fn world_coordinates(&self, map_x: i32, map_y: i32) -> (i32, i32) {
        let world_x = self.origin_x + map_x;
        let world_y = self.origin_y + self.height - 1 - map_y;
        (world_x, world_y)
    }

    pub fn contains_point(&self, map_x: i32, map_y: i32) -> bool {
        map_x >= 0 && map_x < self.width && map_y >= 0 && map_y < self.height
    }

    /// Plot a cell if the coordinate is on the grid; out-of-bounds plots
    /// are ignored so partially visible obstacles are simply clipped.
    pub fn plot_if_in_bounds(&mut self, map_x: i32, map_y: i32, cell: Cell) {
        if self.contains_point(map_x, map_y) {
            self.cells[map_y as usize][map_x as usize] = cell;
        }
    }

    /// Read the cell at an in-bounds map coordinate.
    pub fn at(&self, map_x: i32, map_y: i32) -> Cell {
        debug_assert!(self.contains_point(map_x, map_y));
        self.cells[map_y as usize][map_x as usize]
    }

    /// Whether the cell holds anything other than [`Cell::Free`].
    pub fn is_obstructed(&self, map_x: i32, map_y: i32) -> bool {
        self.at(map_x, map_y) != Cell::Free
    }

    pub fn cells(&self) -> &[Vec<Cell>] {
        &self.cells
    }
}

impl Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in &self.cells {
            for cell in row {
                write!(f, "{}", cell)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::obstacle::Orientation;

    #[test]
    fn test_coordinate_round_trip() {
        let grid = Grid::new(-7, 3, 12, 9, &[]).unwrap();

        for world_y in 3..12 {
            for world_x in -7..5 {
                let (mx, my) = grid.map_coordinates(world_x, world_y);
                assert!(grid.contains_point(mx, my));
                assert_eq!(grid.world_coordinates(mx, my), (world_x, world_y));
            }
        }

        // the south-west corner maps to the bottom row, column zero
        assert_eq!(grid.map_coordinates(-7, 3), (0, 8));
        // the north edge is row zero
        assert_eq!(grid.map_coordinates(-7, 11), (0, 0));
    }

    #[test]
    fn test_rejects_empty_grid() {
        assert!(Grid::new(0, 0, 0, 5, &[]).is_err());
        assert!(Grid::new(0, 0, 5, -1, &[]).is_err());
    }

    #[test]
    fn test_plot_out_of_bounds_is_ignored() {
        let mut grid = Grid::new(0, 0, 3, 3, &[]).unwrap();
        grid.plot_if_in_bounds(-1, 0, Cell::Agent);
        grid.plot_if_in_bounds(0, 3, Cell::Agent);
        for row in grid.cells() {
            assert!(row.iter().all(|c| *c == Cell::Free));
        }
    }

    #[test]
    fn test_render_guard() {
        let obstacles = vec![Obstacle::Guard { x: 1, y: 1 }];
        let grid = Grid::new(0, 0, 3, 3, &obstacles).unwrap();
        assert_eq!(format!("{}", grid), "...\n.G.\n...\n");
    }

    #[test]
    fn test_render_fence_clips_at_edge() {
        let obstacles = vec![Obstacle::Fence {
            x: 1,
            y: 0,
            orientation: Orientation::East,
            length: 10,
        }];
        let grid = Grid::new(0, 0, 4, 2, &obstacles).unwrap();
        assert_eq!(format!("{}", grid), "....\n.FFF\n");
    }

    #[test]
    fn test_render_north_fence() {
        let obstacles = vec![Obstacle::Fence {
            x: 0,
            y: 0,
            orientation: Orientation::North,
            length: 3,
        }];
        let grid = Grid::new(0, 0, 2, 4, &obstacles).unwrap();
        assert_eq!(format!("{}", grid), "..\nF.\nF.\nF.\n");
    }

    #[test]
    fn test_render_camera_cone() {
        let obstacles = vec![Obstacle::Camera {
            x: 2,
            y: 0,
            facing: Direction::North,
        }];
        let grid = Grid::new(0, 0, 5, 3, &obstacles).unwrap();
        // a 45 degree cone opening northward from the apex
        assert_eq!(format!("{}", grid), "CCCCC\n.CCC.\n..C..\n");
    }

    #[test]
    fn test_render_sensor_disc() {
        let obstacles = vec![Obstacle::Sensor {
            x: 2,
            y: 2,
            radius: 2.0,
        }];
        let grid = Grid::new(0, 0, 5, 5, &obstacles).unwrap();
        let rendered = format!("{}", grid);
        // center blocked, corners outside the disc stay free
        assert_eq!(&rendered[2 * 6 + 2..2 * 6 + 3], "S");
        assert_eq!(&rendered[0..1], ".");
        assert_eq!(&rendered[4..5], ".");
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let obstacles = vec![
            Obstacle::Guard { x: 2, y: 2 },
            Obstacle::Sensor {
                x: -1,
                y: 4,
                radius: 1.5,
            },
            Obstacle::Camera {
                x: 5,
                y: 5,
                facing: Direction::West,
            },
        ];
        let a = Grid::new(-3, -3, 12, 12, &obstacles).unwrap();
        let b = Grid::new(-3, -3, 12, 12, &obstacles).unwrap();
        assert_eq!(a.cells(), b.cells());
    }

    #[test]
    fn test_later_obstacles_overwrite_earlier() {
        let obstacles = vec![
            Obstacle::Guard { x: 0, y: 0 },
            Obstacle::Fence {
                x: 0,
                y: 0,
                orientation: Orientation::East,
                length: 1,
            },
        ];
        let grid = Grid::new(0, 0, 1, 1, &obstacles).unwrap();
        assert_eq!(grid.at(0, 0), Cell::Blocked(ObstacleKind::Fence));
    }
}
