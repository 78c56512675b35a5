use log::info;

use crate::config::MazeConfig;
use crate::errors::*;
use crate::generators::{Generator, Progress};
use crate::grid::Grid;
use crate::integrity::IntegrityRepair;
use crate::layout::{BlueprintCatalog, Layout, LayoutOptions};
use crate::seeds;
use crate::units::{Depth, Width};
use crate::utils::MazeRng;

/// A finished maze, ready for navigation.
#[derive(Debug, Clone)]
pub struct Maze {
    pub layout: Layout,
}

impl Maze {
    #[inline]
    pub fn grid(&self) -> &Grid {
        self.layout.grid()
    }

    #[inline]
    pub fn seed(&self) -> &str {
        self.layout.grid().seed()
    }
}

#[derive(Debug)]
enum Stage {
    Carving(Generator),
    Repairing(IntegrityRepair),
    Placing(Grid, MazeRng),
    Done(Maze),
    Failed,
}

/// Runs carving, repair and layout one bounded step at a time.
#[derive(Debug)]
pub struct MazeBuilder {
    stage: Stage,
    config: MazeConfig,
    catalog: &'static BlueprintCatalog,
}

impl MazeBuilder {
    pub fn new(config: MazeConfig) -> Result<MazeBuilder> {
        MazeBuilder::with_catalog(config, BlueprintCatalog::default_catalog())
    }

    pub fn with_catalog(mut config: MazeConfig, catalog: &'static BlueprintCatalog)
                        -> Result<MazeBuilder> {
        config.validate()?;
        if config.seed.trim().is_empty() {
            config.seed = seeds::random_seed(&mut MazeRng::new(rand::random()));
            info!("No seed given, using {}", config.seed);
        }

        let grid = Grid::new(&config.seed,
                             Depth(config.depth),
                             Width(config.width),
                             config.fill_ratio,
                             config.allow_overfill)?;
        let generator = Generator::new(grid, config.smart_digging);
        Ok(MazeBuilder {
            stage: Stage::Carving(generator),
            config,
            catalog,
        })
    }

    /// Build a maze in one go.
    pub fn build(config: MazeConfig) -> Result<Maze> {
        let mut builder = MazeBuilder::new(config)?;
        while builder.advance()? == Progress::InProgress {}
        builder.into_maze().ok_or_else(|| "maze builder stopped before finishing".into())
    }

    pub fn config(&self) -> &MazeConfig {
        &self.config
    }

    /// Loading screen text for the current stage.
    pub fn status(&self) -> &'static str {
        match self.stage {
            Stage::Carving(_) => "Carving the maze...",
            Stage::Repairing(_) => "Repairing the maze...",
            Stage::Placing(..) => "Placing the tiles...",
            Stage::Done(_) => "Done!",
            Stage::Failed => "Failed!",
        }
    }

    pub fn maze(&self) -> Option<&Maze> {
        match self.stage {
            Stage::Done(ref maze) => Some(maze),
            _ => None,
        }
    }

    pub fn into_maze(self) -> Option<Maze> {
        match self.stage {
            Stage::Done(maze) => Some(maze),
            _ => None,
        }
    }

    /// One unit of work of the current stage. Errors are final, the builder stays failed.
    pub fn advance(&mut self) -> Result<Progress> {
        let stage = std::mem::replace(&mut self.stage, Stage::Failed);
        let (next, progress) = match stage {
            Stage::Carving(mut generator) => {
                if generator.advance() == Progress::Done {
                    let (grid, rng) = generator.into_parts();
                    (Stage::Repairing(IntegrityRepair::new(grid, rng, self.config.wander_repairs)),
                     Progress::InProgress)
                } else {
                    (Stage::Carving(generator), Progress::InProgress)
                }
            }
            Stage::Repairing(mut repair) => {
                if repair.advance()? == Progress::Done {
                    let (grid, rng) = repair.into_parts();
                    (Stage::Placing(grid, rng), Progress::InProgress)
                } else {
                    (Stage::Repairing(repair), Progress::InProgress)
                }
            }
            Stage::Placing(grid, mut rng) => {
                let options = LayoutOptions {
                    allow_tunnels: self.config.allow_tunnels,
                    tunnel_chance: self.config.tunnel_chance,
                };
                let layout = Layout::build(grid, self.catalog, &mut rng, options)?;
                (Stage::Done(Maze { layout }), Progress::Done)
            }
            Stage::Done(maze) => (Stage::Done(maze), Progress::Done),
            Stage::Failed => bail!("maze builder already failed"),
        };
        self.stage = next;
        Ok(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrity::orphans;

    fn config(seed: &str, depth: usize, width: usize) -> MazeConfig {
        MazeConfig {
            seed: seed.to_owned(),
            depth,
            width,
            ..MazeConfig::default()
        }
    }

    #[test]
    fn stages_report_their_status() {
        let mut builder = MazeBuilder::new(config("stages", 8, 8)).unwrap();
        let mut seen = vec![builder.status()];
        loop {
            let progress = builder.advance().unwrap();
            if seen.last() != Some(&builder.status()) {
                seen.push(builder.status());
            }
            if progress == Progress::Done {
                break;
            }
        }
        assert_eq!(seen,
                   vec!["Carving the maze...", "Repairing the maze...", "Placing the tiles...",
                        "Done!"]);
        assert!(builder.maze().is_some());
        assert_eq!(builder.advance().unwrap(), Progress::Done);
    }

    #[test]
    fn built_mazes_are_connected() {
        let maze = MazeBuilder::build(config("connected", 14, 11)).unwrap();
        let grid = maze.grid();
        assert_eq!(grid.carved(), grid.quota());
        assert!(orphans(grid, grid.spawn()).is_empty());
        assert!(!maze.layout.is_tunnel(grid.spawn()));
        assert_eq!(maze.layout.spawn_room().map(|room| room.position), Some(grid.spawn()));
    }

    #[test]
    fn empty_seed_gets_a_name() {
        let builder = MazeBuilder::new(config("  ", 5, 5)).unwrap();
        assert!(!builder.config().seed.trim().is_empty());
    }

    #[test]
    fn same_config_same_maze() {
        let a = MazeBuilder::build(config("Twins", 12, 12)).unwrap();
        let b = MazeBuilder::build(config("Twins", 12, 12)).unwrap();
        let (ga, gb) = (a.grid(), b.grid());
        assert!(ga.iter().all(|p| ga.tile_at(p) == gb.tile_at(p)));
        assert!(a.layout.rooms().zip(b.layout.rooms()).all(|(x, y)| x == y));
    }

    #[test]
    fn bad_configurations_fail_early() {
        let mut bad = config("bad", 5, 5);
        bad.fill_ratio = 0.0;
        assert!(MazeBuilder::new(bad).is_err());
        assert!(MazeBuilder::build(config("tiny", 1, 1)).is_err());
    }
}
