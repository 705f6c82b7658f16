//! Obstacle-field simulation and route finding.
//!
//! The [`Grid`] holds a rasterized window of the world; [`RouteFinder`]
//! computes compass-direction runs from an agent to an objective around
//! the registered [`Obstacle`]s, consulting a [`SafetyScan`] whenever a
//! straight run is interrupted.

pub mod direction;
pub mod grid;
pub mod obstacle;
pub mod route;
pub mod scan;

pub use direction::{Axis, Direction, Run};
pub use grid::{Cell, Grid};
pub use obstacle::{Obstacle, ObstacleKind, Orientation};
pub use route::RouteFinder;
pub use scan::SafetyScan;
