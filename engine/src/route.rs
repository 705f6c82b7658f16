use crate::direction::{Axis, Direction, Run};
use crate::grid::{Cell, Grid};
use crate::obstacle::Obstacle;
use crate::scan::SafetyScan;

/// Padding added around the agent/objective bounding box so detours have
/// room to maneuver without leaving the grid.
const MARGIN: i32 = 15;

/// Longest supported agent-to-objective distance on one axis. Keeps the
/// working grid allocation bounded for arbitrary caller coordinates.
const MAX_SPAN: i32 = 5_000;

/// What a single head movement ran into.
#[derive(Debug, Clone, PartialEq, Eq)]
enum HeadOutcome {
    /// Stepped onto the objective sentinel; the mission is complete.
    Objective,
    /// Walked the full distance without interruption.
    Clear,
    /// Hit an obstructed cell (or the grid edge) and backed up to the
    /// last free cell.
    Blocked,
}

/// The result of planning a sidestep around an obstruction.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Detour {
    /// Move this far in this perpendicular direction, then resume.
    Sidestep(Direction, i32),
    /// Neither perpendicular direction is viable; the search is stuck.
    NoSafeDirection,
}

/// The current movement phase of the mission loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Closing the remaining offset on one axis.
    Advance(Axis),
    /// Executing a reconnoitred sidestep around an obstruction.
    Sidestep(Direction, i32),
}

/// Computes an obstacle-avoiding route between two world coordinates.
///
/// The finder owns a working [`Grid`] sized to bound the agent and the
/// objective with [`MARGIN`] cells of padding on each side. Committed runs
/// stamp trail markers onto the grid, which both supports rendering and
/// keeps the search from re-crossing its own track.
///
/// A finder serves exactly one query: construct, run the pre-checks, call
/// [`RouteFinder::attempt_mission`] once, then read the directions.
#[derive(Debug)]
pub struct RouteFinder {
    grid: Grid,
    obstacles: Vec<Obstacle>,
    cursor: (i32, i32),
    agent: (i32, i32),
    objective: (i32, i32),
    directions: Vec<Run>,
}

impl RouteFinder {
    pub fn new(
        agent_x: i32,
        agent_y: i32,
        objective_x: i32,
        objective_y: i32,
        obstacles: Vec<Obstacle>,
    ) -> Result<Self, anyhow::Error> {
        let span_x = (i64::from(objective_x) - i64::from(agent_x)).abs();
        let span_y = (i64::from(objective_y) - i64::from(agent_y)).abs();
        if span_x > i64::from(MAX_SPAN) || span_y > i64::from(MAX_SPAN) {
            return Err(anyhow::anyhow!(
                "agent and objective are more than {} klicks apart",
                MAX_SPAN
            ));
        }
        let width = span_x as i32 + 2 * MARGIN;
        let height = span_y as i32 + 2 * MARGIN;

        // the padded box must stay representable, margin included
        let out_of_range = || {
            anyhow::anyhow!("coordinates are too close to the representable limit")
        };
        let southwest_x = agent_x
            .min(objective_x)
            .checked_sub(MARGIN)
            .ok_or_else(out_of_range)?;
        let southwest_y = agent_y
            .min(objective_y)
            .checked_sub(MARGIN)
            .ok_or_else(out_of_range)?;
        if southwest_x.checked_add(width).is_none() || southwest_y.checked_add(height).is_none() {
            return Err(out_of_range());
        }

        let grid = Grid::new(southwest_x, southwest_y, width, height, &obstacles)?;
        let agent = grid.map_coordinates(agent_x, agent_y);
        let objective = grid.map_coordinates(objective_x, objective_y);

        Ok(Self {
            grid,
            obstacles,
            cursor: agent,
            agent,
            objective,
            directions: Vec::new(),
        })
    }

    /// Whether the objective cell is already obstructed. Callers check
    /// this before starting the search; the search itself does not.
    pub fn is_objective_blocked(&self) -> bool {
        self.grid.is_obstructed(self.objective.0, self.objective.1)
    }

    /// Whether the agent's starting cell is already obstructed.
    pub fn is_agent_blocked(&self) -> bool {
        self.grid.is_obstructed(self.agent.0, self.agent.1)
    }

    /// Run the route search. Returns true iff the cursor reaches the
    /// objective; a false result is a normal negative answer, not an
    /// error. The committed runs are available from
    /// [`RouteFinder::directions`] afterwards.
    pub fn attempt_mission(&mut self) -> bool {
        self.grid
            .plot_if_in_bounds(self.agent.0, self.agent.1, Cell::Agent);
        self.grid
            .plot_if_in_bounds(self.objective.0, self.objective.1, Cell::Objective);

        // close the short axis first; it lowers the odds of needing a
        // detour later on
        let first = if self.offset(Axis::X).abs() > self.offset(Axis::Y).abs() {
            Axis::Y
        } else {
            Axis::X
        };

        let mut phase = Phase::Advance(first);
        loop {
            let (direction, distance) = match phase {
                Phase::Advance(axis) => {
                    let remaining = self.offset(axis);
                    if remaining == 0 {
                        if self.offset(axis.other()) == 0 {
                            return true;
                        }
                        phase = Phase::Advance(axis.other());
                        continue;
                    }
                    (Self::signed_direction(axis, remaining), remaining.abs())
                }
                Phase::Sidestep(direction, distance) => (direction, distance),
            };

            match self.head(direction, distance) {
                HeadOutcome::Objective => return true,
                HeadOutcome::Clear => phase = Phase::Advance(direction.axis().other()),
                HeadOutcome::Blocked => match self.plan_detour(direction) {
                    Detour::Sidestep(side, span) => phase = Phase::Sidestep(side, span),
                    Detour::NoSafeDirection => return false,
                },
            }
        }
    }

    /// The committed runs, in the exact order movement decisions were
    /// made.
    pub fn directions(&self) -> &[Run] {
        &self.directions
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Dump the working grid to stdout, one character per cell, rows
    /// north to south.
    pub fn print_grid(&self) {
        print!("{}", self.grid);
    }

    /// Signed remaining offset from the cursor to the objective on the
    /// given axis, in map coordinates.
    fn offset(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.objective.0 - self.cursor.0,
            Axis::Y => self.objective.1 - self.cursor.1,
        }
    }

    /// The direction that reduces a positive/negative map-space offset on
    /// the axis. Positive map Y points south.
    fn signed_direction(axis: Axis, remaining: i32) -> Direction {
        match (axis, remaining > 0) {
            (Axis::X, true) => Direction::East,
            (Axis::X, false) => Direction::West,
            (Axis::Y, true) => Direction::South,
            (Axis::Y, false) => Direction::North,
        }
    }

    /// Walk up to `distance` cells in `direction`, stamping trail markers
    /// on the cells passed. Stops early on the objective sentinel or on
    /// any obstruction; the run committed always matches the cells
    /// actually advanced.
    fn head(&mut self, direction: Direction, distance: i32) -> HeadOutcome {
        let (dx, dy) = direction.delta();

        for step in 1..=distance {
            let x = self.cursor.0 + dx * step;
            let y = self.cursor.1 + dy * step;

            // the grid edge counts as an obstruction: clip, then detour
            if !self.grid.contains_point(x, y) {
                self.cursor = (x - dx, y - dy);
                self.push_run(direction, step - 1);
                return HeadOutcome::Blocked;
            }

            match self.grid.at(x, y) {
                Cell::Objective => {
                    self.push_run(direction, step);
                    self.cursor = self.objective;
                    return HeadOutcome::Objective;
                }
                Cell::Free => {
                    self.grid.plot_if_in_bounds(x, y, Cell::Trail(direction));
                }
                _ => {
                    self.cursor = (x - dx, y - dy);
                    self.push_run(direction, step - 1);
                    return HeadOutcome::Blocked;
                }
            }
        }

        self.cursor = (
            self.cursor.0 + dx * distance,
            self.cursor.1 + dy * distance,
        );
        self.push_run(direction, distance);
        HeadOutcome::Clear
    }

    /// Choose a perpendicular sidestep around an obstruction blocking
    /// travel in `blocked`. The local scan gates the candidate sides;
    /// reconnaissance picks the span. Candidates are tried in fixed
    /// preference order (north before south, east before west).
    fn plan_detour(&self, blocked: Direction) -> Detour {
        let (world_x, world_y) = self.grid.world_coordinates(self.cursor.0, self.cursor.1);

        let safe = match SafetyScan::around(world_x, world_y, &self.obstacles) {
            Ok(scan) => scan.safe_directions(),
            Err(_) => return Detour::NoSafeDirection,
        };

        for side in blocked.perpendicular() {
            if !safe.contains(&side) {
                continue;
            }
            if let Some(span) = self.reconnoitre(side, blocked) {
                return Detour::Sidestep(side, span);
            }
        }

        Detour::NoSafeDirection
    }

    /// Probe outward along `side` for the shortest sidestep that leaves
    /// forward progress in `travel` open. Every path cell up to the
    /// chosen span must be free; leaving the grid kills the candidate.
    fn reconnoitre(&self, side: Direction, travel: Direction) -> Option<i32> {
        let (sx, sy) = side.delta();
        let (tx, ty) = travel.delta();

        let mut span = 1;
        loop {
            let px = self.cursor.0 + sx * span;
            let py = self.cursor.1 + sy * span;
            let fx = px + tx;
            let fy = py + ty;

            if !self.grid.contains_point(px, py) || !self.grid.contains_point(fx, fy) {
                return None;
            }
            if self.grid.is_obstructed(px, py) {
                return None;
            }
            if !self.grid.is_obstructed(fx, fy) {
                return Some(span);
            }
            span += 1;
        }
    }

    /// Append a committed run. Interrupted runs that covered no ground
    /// are dropped rather than recorded as zero-length.
    fn push_run(&mut self, direction: Direction, distance: i32) {
        if distance > 0 {
            self.directions.push(Run {
                direction,
                distance,
            });
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::obstacle::Orientation;

    fn displacement(runs: &[Run]) -> (i32, i32) {
        runs.iter().fold((0, 0), |(x, y), run| {
            let (dx, dy) = run.direction.delta();
            (x + dx * run.distance, y + dy * run.distance)
        })
    }

    #[test]
    fn test_straight_line_east() {
        let mut finder = RouteFinder::new(0, 0, 10, 0, Vec::new()).unwrap();
        assert!(!finder.is_agent_blocked());
        assert!(!finder.is_objective_blocked());
        assert!(finder.attempt_mission());
        assert_eq!(
            finder.directions(),
            &[Run {
                direction: Direction::East,
                distance: 10
            }]
        );
    }

    #[test]
    fn test_straight_line_north() {
        let mut finder = RouteFinder::new(3, -2, 3, 5, Vec::new()).unwrap();
        assert!(finder.attempt_mission());
        assert_eq!(
            finder.directions(),
            &[Run {
                direction: Direction::North,
                distance: 7
            }]
        );
    }

    #[test]
    fn test_short_axis_first() {
        // x offset 8, y offset 3: the shorter y axis is closed first
        let mut finder = RouteFinder::new(0, 0, 8, 3, Vec::new()).unwrap();
        assert!(finder.attempt_mission());
        assert_eq!(
            finder.directions(),
            &[
                Run {
                    direction: Direction::North,
                    distance: 3
                },
                Run {
                    direction: Direction::East,
                    distance: 8
                }
            ]
        );
    }

    #[test]
    fn test_blocked_objective() {
        let obstacles = vec![Obstacle::Guard { x: 10, y: 0 }];
        let finder = RouteFinder::new(0, 0, 10, 0, obstacles).unwrap();
        assert!(finder.is_objective_blocked());
        assert!(!finder.is_agent_blocked());
    }

    #[test]
    fn test_blocked_agent() {
        let obstacles = vec![Obstacle::Sensor {
            x: 0,
            y: 0,
            radius: 2.0,
        }];
        let finder = RouteFinder::new(0, 0, 10, 0, obstacles).unwrap();
        assert!(finder.is_agent_blocked());
    }

    #[test]
    fn test_single_wall_detour() {
        // a one-cell-wide wall crossing the straight line east
        let obstacles = vec![Obstacle::Fence {
            x: 5,
            y: -2,
            orientation: Orientation::North,
            length: 5,
        }];
        let mut finder = RouteFinder::new(0, 0, 10, 0, obstacles).unwrap();
        assert!(finder.attempt_mission());

        // east up to the wall, north around it (preferred side), east
        // past it, then back south to the objective
        assert_eq!(
            finder.directions(),
            &[
                Run {
                    direction: Direction::East,
                    distance: 4
                },
                Run {
                    direction: Direction::North,
                    distance: 3
                },
                Run {
                    direction: Direction::East,
                    distance: 6
                },
                Run {
                    direction: Direction::South,
                    distance: 3
                }
            ]
        );
        assert_eq!(displacement(finder.directions()), (10, 0));
    }

    #[test]
    fn test_detour_prefers_north() {
        // wall symmetric around the travel line: both sides viable
        let obstacles = vec![Obstacle::Fence {
            x: 3,
            y: -3,
            orientation: Orientation::North,
            length: 7,
        }];
        let mut finder = RouteFinder::new(0, 0, 6, 0, obstacles).unwrap();
        assert!(finder.attempt_mission());
        assert_eq!(finder.directions()[1].direction, Direction::North);
    }

    #[test]
    fn test_enclosed_agent_has_no_route() {
        let obstacles = vec![
            Obstacle::Guard { x: 1, y: 0 },
            Obstacle::Guard { x: -1, y: 0 },
            Obstacle::Guard { x: 0, y: 1 },
            Obstacle::Guard { x: 0, y: -1 },
        ];
        let mut finder = RouteFinder::new(0, 0, 5, 0, obstacles).unwrap();
        assert!(!finder.is_agent_blocked());
        assert!(!finder.attempt_mission());
        assert!(finder.directions().is_empty());
    }

    #[test]
    fn test_trail_is_stamped_on_grid() {
        let mut finder = RouteFinder::new(0, 0, 4, 0, Vec::new()).unwrap();
        assert!(finder.attempt_mission());
        let rendered = format!("{}", finder.grid());
        assert!(rendered.contains('A'));
        assert!(rendered.contains('E'));
        // the objective sentinel survives arrival
        assert!(rendered.contains('O'));
    }

    #[test]
    fn test_rejects_oversized_span() {
        assert!(RouteFinder::new(0, 0, i32::MAX - 1, 0, Vec::new()).is_err());
        assert!(RouteFinder::new(0, 0, 999_999, 999_999, Vec::new()).is_err());
        assert!(RouteFinder::new(i32::MIN + 1, 0, i32::MAX - 1, 0, Vec::new()).is_err());
    }

    #[test]
    fn test_rejects_coordinates_near_representable_limit() {
        // span is fine, but the margin-padded box leaves i32 range
        assert!(RouteFinder::new(i32::MIN + 1, 0, i32::MIN + 5, 0, Vec::new()).is_err());
        assert!(RouteFinder::new(i32::MAX - 10, 0, i32::MAX - 5, 0, Vec::new()).is_err());
        // well clear of the limit, the same span is accepted
        let mut finder = RouteFinder::new(100_000, 0, 100_005, 0, Vec::new()).unwrap();
        assert!(finder.attempt_mission());
    }

    #[test]
    fn test_grid_is_padded_with_margin() {
        let finder = RouteFinder::new(0, 0, 10, 4, Vec::new()).unwrap();
        assert_eq!(finder.grid().width(), 10 + 2 * MARGIN);
        assert_eq!(finder.grid().height(), 4 + 2 * MARGIN);
    }

    #[test]
    fn test_runs_sum_to_world_delta_with_scattered_field() {
        let obstacles = vec![
            Obstacle::Guard { x: 3, y: 0 },
            Obstacle::Guard { x: 5, y: 2 },
            Obstacle::Sensor {
                x: 9,
                y: -1,
                radius: 1.5,
            },
        ];
        let mut finder = RouteFinder::new(0, 0, 14, 2, obstacles).unwrap();
        assert!(finder.attempt_mission());
        // the guard at (5, 2) interrupts the long east leg
        assert!(finder.directions().len() > 2);
        // map-space displacement: east is +x, north is -y
        assert_eq!(displacement(finder.directions()), (14, -2));
    }
}
