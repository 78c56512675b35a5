//! **maze_carver** carves seeded, fully connected mazes with cohorts of random diggers,
//! repairs their connectivity, lays them out with tunnel rooms and plans actor moves
//! through them.

pub mod builder;
pub mod cells;
pub mod config;
pub mod errors;
pub mod generators;
pub mod grid;
pub mod grid_displays;
pub mod integrity;
pub mod layout;
pub mod navigation;
pub mod pathing;
pub mod seeds;
pub mod tiles;
pub mod units;
pub mod utils;
pub mod workers;

pub use crate::builder::{Maze, MazeBuilder};
pub use crate::config::MazeConfig;
pub use crate::errors::{Error, ErrorKind, Result};
