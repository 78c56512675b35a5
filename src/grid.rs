use itertools::iproduct;
use petgraph::graph::{NodeIndex, UnGraph};
use std::cmp;

use crate::cells::{Direction, DirectionSmallVec, Position, CARDINALS};
use crate::errors::*;
use crate::seeds;
use crate::tiles::Tile;
use crate::units::{Depth, TilesCount, Width};
use crate::utils::MazeRng;
use crate::workers::Shift;

pub const MIN_DIMENSION: usize = 1;
pub const MAX_DIMENSION: usize = 64;
/// Grids more lopsided than this get their short side stretched, long thin grids make
/// the connectivity search crawl.
pub const MAX_DIMENSION_DISCREPANCY: usize = 24;

/// The depth x width matrix of tiles a maze is carved into.
///
/// The shape never changes after construction. Tiles only gain openings, through `dig`,
/// which always writes both ends of a passage.
#[derive(Debug, Clone)]
pub struct Grid {
    seed: String,
    hash: i32,
    depth: usize,
    width: usize,
    fill_ratio: f32,
    allow_overfill: bool,
    tiles: Vec<Tile>,
    carved: usize,
    spawn: Position,
}

impl Grid {
    pub fn new(seed: &str,
               depth: Depth,
               width: Width,
               fill_ratio: f32,
               allow_overfill: bool)
               -> Result<Grid> {

        if !(fill_ratio > 0.0 && fill_ratio <= 1.0) {
            bail!(ErrorKind::InvalidConfiguration(
                format!("fill ratio {} is outside (0, 1]", fill_ratio)));
        }

        let (depth, width) = clamp_dimensions(depth.0, width.0);
        if depth * width < 2 {
            bail!(ErrorKind::InvalidConfiguration(
                format!("a {}x{} grid has no room to dig", depth, width)));
        }

        Ok(Grid {
            seed: seed.to_owned(),
            hash: seeds::compute_seed(seed, 1),
            depth,
            width,
            fill_ratio,
            allow_overfill,
            tiles: vec![Tile::BLOCK; depth * width],
            carved: 0,
            spawn: Position::default(),
        })
    }

    #[inline]
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// The integer the maze's random stream is seeded with.
    #[inline]
    pub fn hash(&self) -> i32 {
        self.hash
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn fill_ratio(&self) -> f32 {
        self.fill_ratio
    }

    #[inline]
    pub fn allow_overfill(&self) -> bool {
        self.allow_overfill
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.tiles.len()
    }

    /// The number of tiles generation has to carve: `round(depth * width * fill_ratio)`.
    pub fn quota(&self) -> TilesCount {
        let target = (self.capacity() as f64 * f64::from(self.fill_ratio)).round() as usize;
        TilesCount(cmp::min(cmp::max(target, 1), self.capacity()))
    }

    /// The number of tiles with at least one opening.
    #[inline]
    pub fn carved(&self) -> TilesCount {
        TilesCount(self.carved)
    }

    #[inline]
    pub fn is_filled(&self) -> bool {
        self.carved >= self.quota().0
    }

    #[inline]
    pub fn spawn(&self) -> Position {
        self.spawn
    }

    pub(crate) fn set_spawn(&mut self, spawn: Position) {
        debug_assert!(self.contains(spawn));
        self.spawn = spawn;
    }

    #[inline]
    pub fn contains(&self, position: Position) -> bool {
        (position.x as usize) < self.depth && (position.y as usize) < self.width
    }

    /// Row major index of a position, None outside the grid.
    #[inline]
    pub fn index_of(&self, position: Position) -> Option<usize> {
        if self.contains(position) {
            Some(position.x as usize * self.width + position.y as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn position_of(&self, index: usize) -> Position {
        Position::new((index / self.width) as u32, (index % self.width) as u32)
    }

    /// The tile at `position`. Positions outside the grid read as unexcavated blocks.
    #[inline]
    pub fn tile_at(&self, position: Position) -> Tile {
        self.index_of(position).map_or(Tile::BLOCK, |index| self.tiles[index])
    }

    /// Does a step in `direction` stay on the grid? Walls are not considered.
    pub fn is_move_legal(&self, direction: Direction, position: Position) -> bool {
        if !direction.is_cardinal() || !self.contains(position) {
            return false;
        }
        let (x, y) = (position.x as usize, position.y as usize);
        !((direction == Direction::NORTH && x == 0) ||
          (direction == Direction::SOUTH && x == self.depth - 1) ||
          (direction == Direction::WEST && y == 0) ||
          (direction == Direction::EAST && y == self.width - 1))
    }

    /// Is a step in `direction` both on the grid and through an opening of the tile?
    #[inline]
    pub fn is_open(&self, direction: Direction, position: Position) -> bool {
        self.is_move_legal(direction, position) && self.tile_at(position).is_open(direction)
    }

    /// The directions an actor standing at `position` can walk.
    pub fn legal_moves(&self, position: Position) -> DirectionSmallVec {
        CARDINALS
            .iter()
            .cloned()
            .filter(|dir| self.is_open(*dir, position))
            .collect()
    }

    /// Open a passage from `from` towards `heading`: `from` gains `heading` and the
    /// neighbour gains the opposite side. Returns how many blocks became carved tiles.
    pub fn dig(&mut self, from: Position, heading: Direction) -> usize {
        if !self.is_move_legal(heading, from) {
            return 0;
        }
        let to = from.moved(heading);
        self.open_side(from, heading) + self.open_side(to, heading.opposite())
    }

    pub fn dig_shift(&mut self, shift: &Shift) -> usize {
        if shift.valid {
            debug_assert_eq!(shift.from.moved(shift.heading), shift.to);
            self.dig(shift.from, shift.heading)
        } else {
            0
        }
    }

    fn open_side(&mut self, position: Position, side: Direction) -> usize {
        match self.index_of(position) {
            Some(index) => {
                let tile = &mut self.tiles[index];
                let was_block = tile.is_block();
                tile.create_opening(side);
                if was_block {
                    self.carved += 1;
                    1
                } else {
                    0
                }
            }
            None => 0,
        }
    }

    /// Every grid position in row major order.
    pub fn iter(&self) -> impl Iterator<Item = Position> {
        iproduct!(0..self.depth as u32, 0..self.width as u32).map(Position::from)
    }

    pub fn carved_positions<'a>(&'a self) -> impl Iterator<Item = Position> + 'a {
        self.iter().filter(move |p| !self.tile_at(*p).is_block())
    }

    pub fn random_cell(&self, rng: &mut MazeRng) -> Position {
        self.position_of(rng.range(0, self.capacity()))
    }

    /// Is `position` carved with at least one wall still facing a neighbour on the grid?
    pub fn is_unfilled(&self, position: Position) -> bool {
        let tile = self.tile_at(position);
        !tile.is_block() &&
        tile.walls().iter().any(|dir| self.is_move_legal(*dir, position))
    }

    /// A random carved cell that can still be dug out further, falling back to any
    /// carved cell and then to spawn once none is left.
    pub fn random_free_cell(&self, rng: &mut MazeRng) -> Position {
        let mut free = self.iter().filter(|p| self.is_unfilled(*p)).collect::<Vec<_>>();
        if free.is_empty() {
            free = self.carved_positions().collect();
        }
        if free.is_empty() {
            self.spawn
        } else {
            free[rng.range(0, free.len())]
        }
    }

    /// The carved tiles as an undirected graph, one edge per open passage.
    pub fn links_graph(&self) -> UnGraph<Position, ()> {
        let mut graph = UnGraph::with_capacity(self.carved, self.carved * 2);
        let mut nodes: Vec<Option<NodeIndex>> = vec![None; self.capacity()];
        for position in self.carved_positions() {
            if let Some(index) = self.index_of(position) {
                nodes[index] = Some(graph.add_node(position));
            }
        }
        for position in self.carved_positions() {
            for dir in &[Direction::SOUTH, Direction::EAST] {
                if !self.is_open(*dir, position) {
                    continue;
                }
                let a = self.index_of(position).and_then(|i| nodes[i]);
                let b = self.index_of(position.moved(*dir)).and_then(|i| nodes[i]);
                if let (Some(a), Some(b)) = (a, b) {
                    graph.add_edge(a, b, ());
                }
            }
        }
        graph
    }
}

fn clamp_dimensions(depth: usize, width: usize) -> (usize, usize) {
    let clamp = |n: usize| cmp::min(cmp::max(n, MIN_DIMENSION), MAX_DIMENSION);
    let (mut depth, mut width) = (clamp(depth), clamp(width));
    if depth + MAX_DIMENSION_DISCREPANCY < width {
        depth = width - MAX_DIMENSION_DISCREPANCY;
    } else if width + MAX_DIMENSION_DISCREPANCY < depth {
        width = depth - MAX_DIMENSION_DISCREPANCY;
    }
    (depth, width)
}
