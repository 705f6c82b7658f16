use std::fs;

use anyhow::{Context, Result};
use log::debug;

use engine::{Grid, Obstacle, Orientation, RouteFinder, SafetyScan};

/// Whether the command loop should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// One interactive session: the registered obstacles plus the command
/// dispatcher that queries them.
pub struct Session {
    obstacles: Vec<Obstacle>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            obstacles: Vec::new(),
        }
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Parse and execute one command line. User mistakes are reported on
    /// stdout and never abort the session.
    pub fn dispatch(&mut self, line: &str) -> Flow {
        let args: Vec<&str> = line.split_whitespace().collect();
        let Some(command) = args.first() else {
            return Flow::Continue;
        };
        debug!("dispatching command: {:?}", args);

        match command.to_ascii_lowercase().as_str() {
            "add" => self.add(&args),
            "check" => self.check(&args),
            "map" => self.map(&args),
            "path" => self.path(&args),
            "save" => self.save(&args),
            "load" => self.load(&args),
            "help" => print_valid_commands(),
            "exit" => {
                println!("Thank you for using the obstacle avoidance route planner.");
                return Flow::Exit;
            }
            other => {
                println!(
                    "Invalid option: {}\nType 'help' to see a list of commands.",
                    other
                );
            }
        }

        Flow::Continue
    }

    fn add(&mut self, args: &[&str]) {
        let Some(kind) = args.get(1) else {
            println!("Invalid obstacle type.");
            return;
        };

        match kind.to_ascii_lowercase().as_str() {
            "guard" => self.add_guard(args),
            "fence" => self.add_fence(args),
            "sensor" => self.add_sensor(args),
            "camera" => self.add_camera(args),
            _ => println!("Invalid obstacle type."),
        }
    }

    fn add_guard(&mut self, args: &[&str]) {
        if args.len() != 4 {
            println!("Incorrect number of arguments.");
            return;
        }
        let Some((x, y)) = parse_point(args[2], args[3]) else {
            println!("Coordinates are not valid integers.");
            return;
        };

        self.obstacles.push(Obstacle::Guard { x, y });
        println!("Successfully added guard obstacle.");
    }

    fn add_fence(&mut self, args: &[&str]) {
        if args.len() != 6 {
            println!("Incorrect number of arguments.");
            return;
        }
        let Some((x, y)) = parse_point(args[2], args[3]) else {
            println!("Coordinates are not valid integers.");
            return;
        };
        let Ok(orientation) = args[4].parse::<Orientation>() else {
            println!("Orientation must be 'east' or 'north'.");
            return;
        };
        let length = match args[5].parse::<i32>() {
            Ok(length) if length > 0 => length,
            _ => {
                println!("Length must be a valid integer greater than 0.");
                return;
            }
        };

        self.obstacles.push(Obstacle::Fence {
            x,
            y,
            orientation,
            length,
        });
        println!("Successfully added fence obstacle.");
    }

    fn add_sensor(&mut self, args: &[&str]) {
        if args.len() != 5 {
            println!("Incorrect number of arguments.");
            return;
        }
        let Some((x, y)) = parse_point(args[2], args[3]) else {
            println!("Coordinates are not valid integers.");
            return;
        };
        let radius = match args[4].parse::<f32>() {
            Ok(radius) if radius > 0.0 => radius,
            _ => {
                println!("Range must be a valid positive number.");
                return;
            }
        };

        self.obstacles.push(Obstacle::Sensor { x, y, radius });
        println!("Successfully added sensor obstacle.");
    }

    fn add_camera(&mut self, args: &[&str]) {
        if args.len() != 5 {
            println!("Incorrect number of arguments.");
            return;
        }
        let Some((x, y)) = parse_point(args[2], args[3]) else {
            println!("Coordinates are not valid integers.");
            return;
        };
        let Ok(facing) = args[4].parse::<engine::Direction>() else {
            println!("Direction must be 'north', 'south', 'east' or 'west'.");
            return;
        };

        self.obstacles.push(Obstacle::Camera { x, y, facing });
        println!("Successfully added camera obstacle.");
    }

    fn check(&self, args: &[&str]) {
        if args.len() != 3 {
            println!("Incorrect number of arguments.");
            return;
        }
        let Some((x, y)) = parse_point(args[1], args[2]) else {
            println!("Coordinates are not valid integers.");
            return;
        };

        let scan = match SafetyScan::around(x, y, &self.obstacles) {
            Ok(scan) => scan,
            Err(e) => {
                println!("{}", e);
                return;
            }
        };

        if !scan.is_safe_here() {
            println!("Agent, your location is compromised. Abort mission.");
            return;
        }

        let safe = scan.safe_directions();
        if safe.is_empty() {
            println!("You cannot safely move in any direction. Abort mission.");
        } else {
            println!("You can safely take any of the following directions:");
            for direction in safe {
                println!("{}", direction);
            }
        }
    }

    fn map(&self, args: &[&str]) {
        if args.len() != 5 {
            println!("Incorrect number of arguments.");
            return;
        }
        let Some((x, y)) = parse_point(args[1], args[2]) else {
            println!("Coordinates are not valid integers.");
            return;
        };
        let (Ok(width), Ok(height)) = (args[3].parse::<i32>(), args[4].parse::<i32>()) else {
            println!("Width and height must be valid positive integers.");
            return;
        };
        if width <= 0 || height <= 0 {
            println!("Width and height must be valid positive integers.");
            return;
        }

        match Grid::new(x, y, width, height, &self.obstacles) {
            Ok(grid) => {
                println!("Here is a map of obstacles in the selected region:");
                print!("{}", grid);
            }
            Err(e) => println!("{}", e),
        }
    }

    fn path(&self, args: &[&str]) {
        if args.len() != 5 {
            println!("Incorrect number of arguments.");
            return;
        }
        let Some(agent) = parse_point(args[1], args[2]) else {
            println!("Coordinates are not valid integers.");
            return;
        };
        let Some(objective) = parse_point(args[3], args[4]) else {
            println!("Coordinates are not valid integers.");
            return;
        };

        for line in self.route_report(agent, objective) {
            println!("{}", line);
        }
    }

    /// Plan a route between two world points and describe the outcome,
    /// one report line per output line.
    fn route_report(&self, agent: (i32, i32), objective: (i32, i32)) -> Vec<String> {
        if agent == objective {
            return vec!["Agent, you are already at the objective.".to_owned()];
        }

        let mut finder = match RouteFinder::new(
            agent.0,
            agent.1,
            objective.0,
            objective.1,
            self.obstacles.clone(),
        ) {
            Ok(finder) => finder,
            Err(e) => return vec![e.to_string()],
        };

        if finder.is_objective_blocked() {
            return vec!["The objective is blocked by an obstacle and cannot be reached.".to_owned()];
        }
        if finder.is_agent_blocked() {
            return vec!["Agent, your location is compromised. Abort mission.".to_owned()];
        }

        let mut report = Vec::new();
        if finder.attempt_mission() {
            report.push("The following path will take you to the objective:".to_owned());
            for run in finder.directions() {
                report.push(format!("Head {} for {} klicks.", run.direction, run.distance));
            }
        } else {
            report.push("There is no safe path to the objective.".to_owned());
        }
        debug!("working grid:\n{}", finder.grid());
        report
    }

    fn save(&self, args: &[&str]) {
        if args.len() != 2 {
            println!("Incorrect number of arguments.");
            return;
        }
        match self.write_roster(args[1]) {
            Ok(count) => println!("Saved {} obstacles to {}.", count, args[1]),
            Err(e) => println!("Failed to save obstacles: {:#}", e),
        }
    }

    fn load(&mut self, args: &[&str]) {
        if args.len() != 2 {
            println!("Incorrect number of arguments.");
            return;
        }
        match read_roster(args[1]) {
            Ok(obstacles) => {
                println!("Loaded {} obstacles from {}.", obstacles.len(), args[1]);
                self.obstacles = obstacles;
            }
            Err(e) => println!("Failed to load obstacles: {:#}", e),
        }
    }

    fn write_roster(&self, path: &str) -> Result<usize> {
        let json = serde_json::to_string_pretty(&self.obstacles)?;
        fs::write(path, json).with_context(|| format!("writing {}", path))?;
        Ok(self.obstacles.len())
    }
}

fn read_roster(path: &str) -> Result<Vec<Obstacle>> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
    let obstacles = serde_json::from_str(&json).with_context(|| format!("parsing {}", path))?;
    Ok(obstacles)
}

fn parse_point(x: &str, y: &str) -> Option<(i32, i32)> {
    Some((x.parse().ok()?, y.parse().ok()?))
}

pub fn print_valid_commands() {
    println!(
        "Valid commands are:\n\
         add guard <x> <y>: registers a guard obstacle\n\
         add fence <x> <y> <orientation> <length>: registers a fence obstacle. Orientation must be 'east' or 'north'.\n\
         add sensor <x> <y> <radius>: registers a sensor obstacle\n\
         add camera <x> <y> <direction>: registers a camera obstacle. Direction must be 'north', 'south', 'east' or 'west'.\n\
         check <x> <y>: checks whether a location and its surroundings are safe\n\
         map <x> <y> <width> <height>: draws a text-based map of registered obstacles\n\
         path <agent x> <agent y> <objective x> <objective y>: finds a path free of obstacles\n\
         save <file>: saves the registered obstacles as JSON\n\
         load <file>: replaces the registered obstacles from a JSON file\n\
         help: displays this help message\n\
         exit: closes this program\n"
    );
}
