use log::{debug, info};

use crate::cells::Position;
use crate::errors::*;
use crate::generators::Progress;
use crate::grid::Grid;
use crate::pathing::{find_path, Distances, Walls};
use crate::utils;
use crate::utils::{FnvHashSet, MazeRng};
use crate::workers::Worker;

const WANDER_CHANCE: f32 = 0.35;

/// Carved tiles that cannot be reached from `spawn` through open passages, in row major
/// order.
pub fn orphans(grid: &Grid, spawn: Position) -> Vec<Position> {
    match Distances::new(grid, spawn) {
        Some(distances) => {
            grid.carved_positions().filter(|p| !distances.is_reachable(*p)).collect()
        }
        None => grid.carved_positions().collect(),
    }
}

/// Digs corridors until every carved tile is reachable from spawn.
///
/// Each `advance` is one pass: find the orphans, connect the one closest to spawn with a
/// corridor dug straight through the walls, and optionally let a few short lived workers
/// roughen the corridor up. Every pass joins at least the chosen orphan to spawn.
#[derive(Debug)]
pub struct IntegrityRepair {
    grid: Grid,
    rng: MazeRng,
    spawn: Position,
    wander: bool,
    orphan_counts: Vec<usize>,
    done: bool,
}

impl IntegrityRepair {
    pub fn new(grid: Grid, rng: MazeRng, wander: bool) -> IntegrityRepair {
        let spawn = grid.spawn();
        IntegrityRepair {
            grid,
            rng,
            spawn,
            wander,
            orphan_counts: vec![],
            done: false,
        }
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Orphans found at the start of every pass so far.
    pub fn orphan_counts(&self) -> &[usize] {
        &self.orphan_counts
    }

    pub fn advance(&mut self) -> Result<Progress> {
        if self.done {
            return Ok(Progress::Done);
        }

        let orphans = orphans(&self.grid, self.spawn);
        self.orphan_counts.push(orphans.len());

        let spawn = self.spawn;
        let target = match orphans.iter().cloned().min_by_key(|p| p.distance(spawn)) {
            Some(target) => target,
            None => {
                self.done = true;
                info!("Maze verified after {} repair passes", self.orphan_counts.len() - 1);
                return Ok(Progress::Done);
            }
        };

        let node = find_path(&self.grid, target, spawn, Walls::Ignore)
            .ok_or_else(|| Error::from(ErrorKind::UnreachableOrphan(target, spawn)))?;
        let corridor = node.route();
        for step in corridor.windows(2) {
            if let Some(dir) = step[0].direction_to(step[1]) {
                self.grid.dig(step[0], dir);
            }
        }
        debug!("Repair pass {}: {} orphans, dug {} tiles from {} to spawn",
               self.orphan_counts.len(),
               orphans.len(),
               corridor.len(),
               target);

        if self.wander {
            self.roughen(&corridor);
        }
        Ok(Progress::InProgress)
    }

    /// Drive every remaining pass.
    pub fn verify(&mut self) -> Result<()> {
        while self.advance()? == Progress::InProgress {}
        Ok(())
    }

    pub fn into_parts(self) -> (Grid, MazeRng) {
        (self.grid, self.rng)
    }

    // Longer corridors relative to the grid size get more wanderers. A wanderer stops
    // once it touches the corridor again or its lifespan runs out.
    fn roughen(&mut self, corridor: &[Position]) {
        let span = (self.grid.depth() + self.grid.width()) as f32;
        let chance = (corridor.len() as f32 / span).min(1.0) * WANDER_CHANCE;
        let mut touched: FnvHashSet<Position> = utils::fnv_hashset(corridor.len());
        touched.extend(corridor.iter().cloned());

        for start in corridor {
            if !self.rng.chance(chance) {
                continue;
            }
            let lifespan = Worker::random_lifespan(corridor.len(), &mut self.rng);
            let mut wanderer = Worker::new(lifespan, *start, true, &mut self.rng);
            while !wanderer.is_retired() {
                let shift = wanderer.work(&self.grid, &mut self.rng);
                if !shift.valid {
                    break;
                }
                self.grid.dig_shift(&shift);
                if touched.contains(&shift.to) {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::algo::connected_components;
    use quickcheck::quickcheck;

    use crate::cells::Direction;
    use crate::generators::Generator;
    use crate::units::{Depth, Width};

    fn blank(depth: usize, width: usize, spawn: Position) -> Grid {
        let mut g = Grid::new("integrity", Depth(depth), Width(width), 1.0, false).unwrap();
        g.set_spawn(spawn);
        g
    }

    fn repaired(grid: Grid, wander: bool) -> IntegrityRepair {
        let mut repair = IntegrityRepair::new(grid, MazeRng::new(9), wander);
        repair.verify().expect("repair succeeds");
        repair
    }

    fn fully_connected(grid: &Grid) -> bool {
        orphans(grid, grid.spawn()).is_empty() &&
        grid.carved_positions().all(|p| {
            find_path(grid, grid.spawn(), p, Walls::Respect).is_some()
        })
    }

    #[test]
    fn orphans_are_unreachable_carved_tiles() {
        let mut g = blank(3, 3, Position::new(0, 0));
        g.dig(Position::new(0, 0), Direction::EAST);
        g.dig(Position::new(2, 1), Direction::EAST);
        assert_eq!(orphans(&g, g.spawn()), vec![Position::new(2, 1), Position::new(2, 2)]);
    }

    #[test]
    fn closest_orphan_is_connected_first() {
        let mut g = blank(5, 5, Position::new(0, 0));
        g.dig(Position::new(0, 0), Direction::EAST);
        g.dig(Position::new(4, 3), Direction::EAST);
        g.dig(Position::new(1, 2), Direction::SOUTH);
        let mut repair = IntegrityRepair::new(g, MazeRng::new(1), false);
        assert_eq!(repair.advance().unwrap(), Progress::InProgress);
        assert_eq!(repair.orphan_counts(), &[4]);
        let left = orphans(repair.grid(), Position::new(0, 0));
        assert_eq!(left, vec![Position::new(4, 3), Position::new(4, 4)]);
    }

    #[test]
    fn connected_grids_need_no_repair() {
        let mut g = blank(1, 8, Position::new(0, 3));
        for y in 0..7 {
            g.dig(Position::new(0, y), Direction::EAST);
        }
        let before = g.clone();
        let repair = repaired(g, true);
        assert_eq!(repair.orphan_counts(), &[0]);
        let after = repair.grid();
        assert!(before.iter().all(|p| before.tile_at(p) == after.tile_at(p)));
    }

    #[test]
    fn width_one_corridor_stays_untouched() {
        let grid = Grid::new("corridor", Depth(12), Width(1), 0.75, false).unwrap();
        let mut generator = Generator::new(grid, true);
        generator.generate();
        let (grid, rng) = generator.into_parts();
        let before = grid.clone();
        let mut repair = IntegrityRepair::new(grid, rng, true);
        assert_eq!(repair.advance().unwrap(), Progress::Done);
        assert!(repair.is_done());
        assert_eq!(repair.advance().unwrap(), Progress::Done);
        assert_eq!(repair.orphan_counts(), &[0]);
        assert!(before.iter().all(|p| before.tile_at(p) == repair.grid().tile_at(p)));
    }

    #[test]
    fn islands_get_joined() {
        let mut g = blank(6, 6, Position::new(2, 2));
        g.dig(Position::new(2, 2), Direction::NORTH);
        g.dig(Position::new(0, 5), Direction::SOUTH);
        g.dig(Position::new(5, 0), Direction::EAST);
        g.dig(Position::new(5, 5), Direction::WEST);
        let repair = repaired(g, false);
        assert!(fully_connected(repair.grid()));
        assert_eq!(connected_components(&repair.grid().links_graph()), 1);
    }

    #[test]
    fn a_block_spawn_is_dug_out() {
        let mut g = blank(4, 4, Position::new(3, 3));
        g.dig(Position::new(0, 0), Direction::EAST);
        let repair = repaired(g, true);
        assert!(!repair.grid().tile_at(Position::new(3, 3)).is_block());
        assert!(fully_connected(repair.grid()));
    }

    #[test]
    fn repair_converges_strictly() {
        fn p(seed: i32, depth: u8, width: u8, digs: Vec<(u16, u8)>, wander: bool) -> bool {
            let depth = (depth % 10) as usize + 1;
            let width = (width % 10) as usize + 2;
            let mut g = blank(depth, width, Position::new(0, 0));
            for (cell, dir) in digs {
                let from = g.position_of(cell as usize % g.capacity());
                g.dig(from, crate::cells::CARDINALS[dir as usize % 4]);
            }
            let mut repair = IntegrityRepair::new(g, MazeRng::new(seed), wander);
            if repair.verify().is_err() {
                return false;
            }
            let counts = repair.orphan_counts();
            counts.last() == Some(&0) &&
            counts.windows(2).all(|w| w[1] < w[0]) &&
            fully_connected(repair.grid())
        }
        quickcheck(p as fn(i32, u8, u8, Vec<(u16, u8)>, bool) -> bool);
    }
}
