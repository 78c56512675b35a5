use bit_set::BitSet;
use smallvec::SmallVec;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::rc::Rc;

use crate::cells::{Position, CARDINALS};
use crate::grid::Grid;
use crate::utils;
use crate::utils::FnvHashMap;

/// Flood fill step counts from a start cell through open passages only.
#[derive(Debug, Clone)]
pub struct Distances {
    start: Position,
    distances: FnvHashMap<Position, u32>,
    max_distance: u32,
}

impl Distances {
    /// None when `start` is not on the grid.
    pub fn new(grid: &Grid, start: Position) -> Option<Distances> {
        if !grid.contains(start) {
            return None;
        }

        let mut max = 0;
        let mut distances = utils::fnv_hashmap(grid.capacity());
        distances.insert(start, 0);

        // Every step costs one, so the first time a cell is reached is also its shortest
        // distance and the map doubles as the visited set.
        let mut frontier = vec![start];
        while !frontier.is_empty() {
            let mut new_frontier = vec![];
            for position in &frontier {
                let distance = distances.get(position).cloned().unwrap_or(0);
                if distance > max {
                    max = distance;
                }
                for dir in grid.legal_moves(*position).iter() {
                    let linked = position.moved(*dir);
                    if !distances.contains_key(&linked) {
                        distances.insert(linked, distance + 1);
                        new_frontier.push(linked);
                    }
                }
            }
            frontier = new_frontier;
        }

        Some(Distances {
            start,
            distances,
            max_distance: max,
        })
    }

    #[inline(always)]
    pub fn start(&self) -> Position {
        self.start
    }

    #[inline(always)]
    pub fn max(&self) -> u32 {
        self.max_distance
    }

    /// None for cells the flood never reached.
    #[inline(always)]
    pub fn distance_from_start_to(&self, position: Position) -> Option<u32> {
        self.distances.get(&position).cloned()
    }

    #[inline]
    pub fn is_reachable(&self, position: Position) -> bool {
        self.distances.contains_key(&position)
    }

    /// Number of cells reached, the start included.
    #[inline]
    pub fn reached(&self) -> usize {
        self.distances.len()
    }

    pub fn furthest_points_on_grid(&self) -> SmallVec<[Position; 8]> {
        let mut furthest = self
            .distances
            .iter()
            .filter(|&(_, distance)| *distance == self.max_distance)
            .map(|(position, _)| *position)
            .collect::<SmallVec<[Position; 8]>>();
        furthest.sort();
        furthest
    }
}

/// Whether a search may only walk through open passages or may pass through walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walls {
    Respect,
    Ignore,
}

/// One node of a `find_path` search, linked back to the node it was reached from.
#[derive(Debug)]
pub struct NavigationTile {
    position: Position,
    cost: u32,
    distance: u32,
    parent: Option<Rc<NavigationTile>>,
}

impl NavigationTile {
    fn new(position: Position, cost: u32, end: Position, parent: Option<Rc<NavigationTile>>)
           -> NavigationTile {
        NavigationTile {
            position,
            cost,
            distance: position.distance(end),
            parent,
        }
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Steps taken from the search start.
    #[inline]
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Manhattan distance left to the search end.
    #[inline]
    pub fn distance(&self) -> u32 {
        self.distance
    }

    #[inline]
    pub fn weight(&self) -> u32 {
        self.cost + self.distance
    }

    pub fn parent(&self) -> Option<&NavigationTile> {
        self.parent.as_ref().map(|p| &**p)
    }

    /// The positions from the search start up to and including this node.
    pub fn route(&self) -> Vec<Position> {
        let mut route = vec![self.position];
        let mut current = self.parent();
        while let Some(node) = current {
            route.push(node.position);
            current = node.parent();
        }
        route.reverse();
        route
    }
}

/// Weighted best first search from `start` to `end`, ordering the open set by
/// `cost + manhattan distance`. Equal weights are expanded in insertion order.
///
/// Returns the node for `end`, whose parents lead back to `start`, or None when the open
/// set runs dry first.
pub fn find_path(grid: &Grid, start: Position, end: Position, walls: Walls)
                 -> Option<Rc<NavigationTile>> {

    if !grid.contains(start) || !grid.contains(end) {
        return None;
    }

    let mut open: FnvHashMap<Position, Rc<NavigationTile>> = utils::fnv_hashmap(grid.capacity());
    let mut queue = BinaryHeap::new();
    let mut closed = BitSet::with_capacity(grid.capacity());
    let mut insertions: u64 = 0;

    let origin = Rc::new(NavigationTile::new(start, 0, end, None));
    queue.push(Reverse((origin.weight(), insertions, start)));
    open.insert(start, origin);

    while let Some(Reverse((_, _, position))) = queue.pop() {
        let node = match open.remove(&position) {
            Some(node) => node,
            None => continue, // stale queue entry for an already closed node
        };
        if position == end {
            return Some(node);
        }
        if let Some(index) = grid.index_of(position) {
            closed.insert(index);
        }

        let parent_position = node.parent().map(|p| p.position);
        for dir in &CARDINALS {
            let passable = match walls {
                Walls::Respect => grid.is_open(*dir, position),
                Walls::Ignore => grid.is_move_legal(*dir, position),
            };
            if !passable {
                continue;
            }
            let neighbour = position.moved(*dir);
            if Some(neighbour) == parent_position {
                continue;
            }
            if grid.index_of(neighbour).map_or(true, |index| closed.contains(index)) {
                continue;
            }

            let cost = node.cost + 1;
            let improves = open.get(&neighbour).map_or(true, |known| cost < known.cost);
            if improves {
                let candidate = Rc::new(NavigationTile::new(neighbour, cost, end, Some(node.clone())));
                insertions += 1;
                queue.push(Reverse((candidate.weight(), insertions, neighbour)));
                open.insert(neighbour, candidate);
            }
        }
    }

    None
}
