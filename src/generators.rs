use log::{debug, info};

use crate::cells::Position;
use crate::grid::Grid;
use crate::utils::MazeRng;
use crate::workers::Worker;

/// Status of an incremental process after one call to `advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    InProgress,
    Done,
}

/// Carves a grid with cohorts of randomised workers until the fill quota is met.
///
/// Each `advance` runs one round: hire a cohort if nobody is left, let every worker take
/// one shift, then retire the workers that are done. The grid, the random stream and the
/// workforce all live here between rounds.
#[derive(Debug)]
pub struct Generator {
    grid: Grid,
    rng: MazeRng,
    workers: Vec<Worker>,
    size: usize,
    max_workers: usize,
    smart_digging: bool,
    cohorts: usize,
    rounds: usize,
}

impl Generator {
    pub fn new(mut grid: Grid, smart_digging: bool) -> Generator {
        let mut rng = MazeRng::new(grid.hash());

        let spawn = Position::new(rng.range(0, grid.depth()) as u32,
                                  rng.range(0, grid.width()) as u32);
        grid.set_spawn(spawn);

        let size = (grid.depth() + grid.width()) / 2;
        let max_workers = (size / rng.range(2, 5)).max(1);

        Generator {
            grid,
            rng,
            workers: Vec::with_capacity(max_workers),
            size,
            max_workers,
            smart_digging,
            cohorts: 0,
            rounds: 0,
        }
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    #[inline]
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.grid.is_filled()
    }

    /// Run one carving round.
    pub fn advance(&mut self) -> Progress {
        if self.grid.is_filled() {
            return Progress::Done;
        }

        if self.workers.is_empty() {
            self.recruit();
        }

        for worker in &mut self.workers {
            let shift = worker.work(&self.grid, &mut self.rng);
            self.grid.dig_shift(&shift);
            if !self.grid.allow_overfill() && self.grid.is_filled() {
                break;
            }
        }
        self.workers.retain(|worker| !worker.is_retired());
        self.rounds += 1;

        if self.grid.is_filled() {
            info!("Carved {} of {} tiles in {} rounds with {} cohorts",
                  self.grid.carved().0,
                  self.grid.capacity(),
                  self.rounds,
                  self.cohorts);
            Progress::Done
        } else {
            Progress::InProgress
        }
    }

    /// Drive every remaining round.
    pub fn generate(&mut self) {
        while self.advance() == Progress::InProgress {}
    }

    /// Hand over the carved grid and the random stream for the next stage.
    pub fn into_parts(self) -> (Grid, MazeRng) {
        (self.grid, self.rng)
    }

    fn recruit(&mut self) {
        let recruits = self.rng.range(1, self.max_workers + 1);
        // Cohorts hired on carved tiles keep the carved region in one piece and the count
        // exactly at quota. Only overfilled grids deploy anywhere, blocks included, and
        // leave islands behind for the integrity repair to join up.
        let deployment = if self.cohorts == 0 {
            self.grid.spawn()
        } else if self.grid.allow_overfill() {
            self.grid.random_cell(&mut self.rng)
        } else {
            self.grid.random_free_cell(&mut self.rng)
        };
        debug!("Cohort {}: hiring {} workers at {}", self.cohorts, recruits, deployment);

        for _ in 0..recruits {
            let lifespan = Worker::random_lifespan(self.size, &mut self.rng);
            self.workers.push(Worker::new(lifespan, deployment, self.smart_digging, &mut self.rng));
        }
        self.cohorts += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::algo::connected_components;
    use quickcheck::quickcheck;

    use crate::cells::CARDINALS;
    use crate::integrity::orphans;
    use crate::units::{Depth, Width};

    fn generated(seed: &str, depth: usize, width: usize, fill: f32, overfill: bool) -> Grid {
        let grid = Grid::new(seed, Depth(depth), Width(width), fill, overfill).unwrap();
        let mut generator = Generator::new(grid, true);
        generator.generate();
        generator.into_parts().0
    }

    fn is_reciprocal(grid: &Grid) -> bool {
        grid.iter().all(|p| {
            CARDINALS.iter().all(|dir| {
                !grid.is_open(*dir, p) || grid.tile_at(p.moved(*dir)).is_open(dir.opposite())
            })
        })
    }

    #[test]
    fn spawn_is_carved() {
        let g = generated("spawn", 12, 9, 0.4, false);
        assert!(g.contains(g.spawn()));
        assert!(!g.tile_at(g.spawn()).is_block());
    }

    #[test]
    fn exact_quota_without_overfill() {
        let g = generated("42", 10, 10, 0.5, false);
        assert_eq!(g.carved().0, 50);
        assert_eq!(g.carved(), g.quota());
    }

    #[test]
    fn cohorts_stay_within_the_worker_cap() {
        let grid = Grid::new("cohorts", Depth(16), Width(12), 0.6, false).unwrap();
        let mut generator = Generator::new(grid, true);
        while generator.advance() == Progress::InProgress {
            assert!(generator.workers().len() <= generator.max_workers);
            assert!(generator.workers().iter().all(|w| !w.is_retired()));
            assert!(generator.workers().iter().all(|w| generator.grid().contains(w.position())));
        }
    }

    #[test]
    fn carving_without_overfill_leaves_no_orphans() {
        fn p(seed: i32, depth: u8, width: u8, fill: u8) -> bool {
            let depth = (depth % 16) as usize + 2;
            let width = (width % 16) as usize + 2;
            let fill = f32::from(fill % 10 + 1) / 10.0;
            let g = generated(&seed.to_string(), depth, width, fill, false);
            orphans(&g, g.spawn()).is_empty()
        }
        quickcheck(p as fn(i32, u8, u8, u8) -> bool);
    }

    #[test]
    fn overfill_reaches_at_least_the_quota() {
        let g = generated("plenty", 15, 15, 0.6, true);
        assert!(g.carved() >= g.quota());
    }

    #[test]
    fn carving_stays_connected() {
        let g = generated("connected", 16, 16, 0.7, false);
        assert_eq!(connected_components(&g.links_graph()), 1);
    }

    #[test]
    fn advance_reports_done_once_filled() {
        let grid = Grid::new("rounds", Depth(6), Width(6), 0.5, false).unwrap();
        let mut generator = Generator::new(grid, true);
        let mut rounds = 0;
        while generator.advance() == Progress::InProgress {
            rounds += 1;
            assert!(rounds < 10_000);
        }
        assert!(generator.is_done());
        assert_eq!(generator.advance(), Progress::Done);
        assert_eq!(generator.rounds(), rounds + 1);
    }

    #[test]
    fn full_fill_carves_everything() {
        let g = generated("everything", 7, 5, 1.0, false);
        assert_eq!(g.carved().0, 35);
    }

    #[test]
    fn generation_is_deterministic() {
        fn p(seed: i32, depth: u8, width: u8, fill: u8) -> bool {
            let seed = seed.to_string();
            let depth = (depth % 14) as usize + 2;
            let width = (width % 14) as usize + 2;
            let fill = f32::from(fill % 10 + 1) / 10.0;
            let a = generated(&seed, depth, width, fill, false);
            let b = generated(&seed, depth, width, fill, false);
            a.spawn() == b.spawn() && a.iter().all(|p| a.tile_at(p) == b.tile_at(p))
        }
        quickcheck(p as fn(i32, u8, u8, u8) -> bool);
    }

    #[test]
    fn carving_is_reciprocal_and_meets_the_quota() {
        fn p(seed: String, depth: u8, width: u8, fill: u8, overfill: bool) -> bool {
            let depth = (depth % 14) as usize + 2;
            let width = (width % 14) as usize + 1;
            let fill = f32::from(fill % 10 + 1) / 10.0;
            let g = generated(&seed, depth, width, fill, overfill);
            let quota_met = if overfill {
                g.carved() >= g.quota()
            } else {
                g.carved() == g.quota() || (g.quota().0 == 1 && g.carved().0 == 2)
            };
            quota_met && is_reciprocal(&g)
        }
        quickcheck(p as fn(String, u8, u8, u8, bool) -> bool);
    }
}
