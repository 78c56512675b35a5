use lazy_static::lazy_static;
use log::{info, warn};
use std::ops::Add;

use crate::cells::{Direction, Position};
use crate::errors::*;
use crate::grid::Grid;
use crate::tiles::Tile;
use crate::utils;
use crate::utils::{FnvHashSet, MazeRng};

/// A point in grid space: `x` follows rows and `y` follows columns, a room's centre sits
/// on its integer position and its doors half a unit away.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Waypoint {
    pub x: f32,
    pub y: f32,
}

impl Waypoint {
    pub fn new(x: f32, y: f32) -> Waypoint {
        Waypoint { x, y }
    }

    /// The local offset of the door on the `side` of a room.
    pub fn door(side: Direction) -> Waypoint {
        if side == Direction::NORTH {
            Waypoint::new(-0.5, 0.0)
        } else if side == Direction::SOUTH {
            Waypoint::new(0.5, 0.0)
        } else if side == Direction::WEST {
            Waypoint::new(0.0, -0.5)
        } else if side == Direction::EAST {
            Waypoint::new(0.0, 0.5)
        } else {
            Waypoint::default()
        }
    }

    /// Linear interpolation, `t` clamped to `[0, 1]`.
    pub fn lerp(self, to: Waypoint, t: f32) -> Waypoint {
        let t = t.max(0.0).min(1.0);
        Waypoint::new(self.x + (to.x - self.x) * t, self.y + (to.y - self.y) * t)
    }
}

impl Add for Waypoint {
    type Output = Waypoint;

    fn add(self, other: Waypoint) -> Waypoint {
        Waypoint::new(self.x + other.x, self.y + other.y)
    }
}

impl From<Position> for Waypoint {
    fn from(position: Position) -> Waypoint {
        Waypoint::new(position.x as f32, position.y as f32)
    }
}

/// One route through a tunnel room. Offsets are relative to the room centre.
#[derive(Debug, Clone, PartialEq)]
pub struct Passage {
    /// The side an actor comes in through.
    pub entry: Direction,
    pub entry_offset: Waypoint,
    pub pivot_offset: Waypoint,
    /// The side the actor is pushed out of, and the direction it keeps travelling in.
    pub exit: Direction,
    pub exit_offset: Waypoint,
}

impl Passage {
    /// A passage from door to door bending around the room centre.
    pub fn between(entry: Direction, exit: Direction) -> Passage {
        Passage {
            entry,
            entry_offset: Waypoint::door(entry),
            pivot_offset: Waypoint::default(),
            exit,
            exit_offset: Waypoint::door(exit),
        }
    }
}

/// A room design for a tile shape. Blueprints with passages are tunnels.
#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    pub name: String,
    pub tile: Tile,
    pub passages: Vec<Passage>,
}

impl Blueprint {
    pub fn room(name: &str, tile: Tile) -> Blueprint {
        Blueprint {
            name: name.to_owned(),
            tile,
            passages: vec![],
        }
    }

    pub fn tunnel(name: &str, tile: Tile, passages: Vec<Passage>) -> Blueprint {
        Blueprint {
            name: name.to_owned(),
            tile,
            passages,
        }
    }

    #[inline]
    pub fn is_tunnel(&self) -> bool {
        !self.passages.is_empty()
    }
}

/// Shapes that may be laid out as tunnels: the four corners and the crossing.
pub const TUNNEL_SHAPES: [Direction; 5] = [
    Direction::NORTH.union(Direction::WEST),
    Direction::NORTH.union(Direction::EAST),
    Direction::SOUTH.union(Direction::WEST),
    Direction::SOUTH.union(Direction::EAST),
    Direction::all(),
];

#[inline]
pub fn is_tunnel_shape(tile: Tile) -> bool {
    TUNNEL_SHAPES.iter().any(|shape| *shape == tile.directions())
}

#[derive(Debug, Clone, Default)]
pub struct BlueprintCatalog {
    blueprints: Vec<Blueprint>,
}

lazy_static! {
    static ref DEFAULT_CATALOG: BlueprintCatalog = BlueprintCatalog::standard();
}

impl BlueprintCatalog {
    pub fn new(blueprints: Vec<Blueprint>) -> BlueprintCatalog {
        BlueprintCatalog { blueprints }
    }

    /// One room for every shape, corner tunnels leading from one side to the other and a
    /// crossing tunnel that goes straight through.
    pub fn default_catalog() -> &'static BlueprintCatalog {
        &DEFAULT_CATALOG
    }

    fn standard() -> BlueprintCatalog {
        let mut blueprints = Tile::shapes()
            .map(|tile| Blueprint::room(&format!("room-{}", tile.hex()), tile))
            .collect::<Vec<_>>();

        for shape in TUNNEL_SHAPES.iter().take(4) {
            let sides = shape.cardinals();
            let (a, b) = (sides[0], sides[1]);
            blueprints.push(Blueprint::tunnel(&format!("bend-{}", Tile::from(*shape).hex()),
                                              Tile::from(*shape),
                                              vec![Passage::between(a, b), Passage::between(b, a)]));
        }

        let crossing = crate::cells::CARDINALS
            .iter()
            .map(|side| Passage::between(*side, side.opposite()))
            .collect();
        blueprints.push(Blueprint::tunnel("crossing", Tile::COMPASS, crossing));

        BlueprintCatalog { blueprints }
    }

    pub fn blueprints(&self) -> &[Blueprint] {
        &self.blueprints
    }

    pub fn random_room(&self, tile: Tile, rng: &mut MazeRng) -> Option<&Blueprint> {
        self.random_matching(rng, |b| b.tile == tile && !b.is_tunnel())
    }

    pub fn random_tunnel(&self, tile: Tile, rng: &mut MazeRng) -> Option<&Blueprint> {
        self.random_matching(rng, |b| b.tile == tile && b.is_tunnel())
    }

    fn random_matching<F>(&self, rng: &mut MazeRng, matches: F) -> Option<&Blueprint>
        where F: Fn(&Blueprint) -> bool
    {
        let candidates = self.blueprints.iter().filter(|b| matches(b)).collect::<Vec<_>>();
        if candidates.is_empty() {
            None
        } else {
            Some(candidates[rng.range(0, candidates.len())])
        }
    }
}

/// A laid out carved tile.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub position: Position,
    pub tile: Tile,
    pub name: String,
    pub passages: Vec<Passage>,
    pub event: Option<String>,
}

impl Room {
    fn from_blueprint(position: Position, blueprint: &Blueprint) -> Room {
        Room {
            position,
            tile: blueprint.tile,
            name: blueprint.name.clone(),
            passages: blueprint.passages.clone(),
            event: None,
        }
    }

    #[inline]
    pub fn is_tunnel(&self) -> bool {
        !self.passages.is_empty()
    }

    pub fn center(&self) -> Waypoint {
        Waypoint::from(self.position)
    }

    /// The passage taken by an actor coming in through the `entry` side.
    pub fn passage_from(&self, entry: Direction) -> Option<&Passage> {
        self.passages.iter().find(|p| p.entry == entry)
    }

    pub fn can_be_tunnel(&self) -> bool {
        self.event.is_none() && is_tunnel_shape(self.tile)
    }

    pub fn can_host_event(&self) -> bool {
        !self.is_tunnel() && !self.tile.is_block()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub allow_tunnels: bool,
    pub tunnel_chance: f32,
}

impl Default for LayoutOptions {
    fn default() -> LayoutOptions {
        LayoutOptions {
            allow_tunnels: true,
            tunnel_chance: 0.25,
        }
    }
}

/// The frozen maze: the repaired grid plus a room for every carved tile.
#[derive(Debug, Clone)]
pub struct Layout {
    grid: Grid,
    rooms: Vec<Option<Room>>,
}

impl Layout {
    pub fn build(grid: Grid,
                 catalog: &BlueprintCatalog,
                 rng: &mut MazeRng,
                 options: LayoutOptions)
                 -> Result<Layout> {

        let mut rooms = vec![None; grid.capacity()];
        let spawn = grid.spawn();

        for (index, position) in grid.iter().enumerate() {
            let tile = grid.tile_at(position);
            if tile.is_block() {
                continue;
            }

            let mut blueprint = catalog
                .random_room(tile, rng)
                .ok_or_else(|| Error::from(ErrorKind::MissingBlueprint(tile)))?;

            if options.allow_tunnels && position != spawn && is_tunnel_shape(tile) {
                let chance = if tile == Tile::COMPASS {
                    options.tunnel_chance * 0.5
                } else {
                    options.tunnel_chance
                };
                if chance >= rng.value() {
                    blueprint = catalog
                        .random_tunnel(tile, rng)
                        .ok_or_else(|| Error::from(ErrorKind::MissingBlueprint(tile)))?;
                }
            }
            rooms[index] = Some(Room::from_blueprint(position, blueprint));
        }

        let mut layout = Layout { grid, rooms };
        layout.break_tunnel_loops(catalog, rng)?;
        info!("Laid out {} rooms, {} of them tunnels",
              layout.rooms().count(),
              layout.rooms().filter(|r| r.is_tunnel()).count());
        Ok(layout)
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn spawn(&self) -> Position {
        self.grid.spawn()
    }

    pub fn room_at(&self, position: Position) -> Option<&Room> {
        self.grid.index_of(position).and_then(|index| self.rooms[index].as_ref())
    }

    pub fn spawn_room(&self) -> Option<&Room> {
        self.room_at(self.spawn())
    }

    /// Every room in row major order.
    pub fn rooms<'a>(&'a self) -> impl Iterator<Item = &'a Room> + 'a {
        self.rooms.iter().filter_map(|room| room.as_ref())
    }

    pub fn is_tunnel(&self, position: Position) -> bool {
        self.room_at(position).map_or(false, |room| room.is_tunnel())
    }

    #[inline]
    pub fn is_move_legal(&self, direction: Direction, position: Position) -> bool {
        self.grid.is_open(direction, position)
    }

    pub fn has_event(&self, position: Position) -> bool {
        self.room_at(position).map_or(false, |room| room.event.is_some())
    }

    /// Attach an event tag to a room. Tunnels, blocks and spawn cannot host events.
    pub fn set_event(&mut self, position: Position, event: &str) -> bool {
        let spawn = self.spawn();
        match self.grid.index_of(position).and_then(|index| self.rooms[index].as_mut()) {
            Some(room) if room.can_host_event() && position != spawn => {
                room.event = Some(event.to_owned());
                true
            }
            _ => false,
        }
    }

    /// Rooms with events one open step away from `position`.
    pub fn events_in_proximity(&self, position: Position) -> Vec<&Room> {
        self.grid
            .legal_moves(position)
            .iter()
            .filter_map(|dir| self.room_at(position.moved(*dir)))
            .filter(|room| room.event.is_some())
            .collect()
    }

    /// A random room free for an event: no event yet, not a tunnel and not spawn.
    pub fn random_free_room(&self, rng: &mut MazeRng) -> Option<&Room> {
        let spawn = self.spawn();
        let free = self
            .rooms()
            .filter(|room| room.event.is_none() && room.can_host_event() && room.position != spawn)
            .collect::<Vec<_>>();
        if free.is_empty() {
            None
        } else {
            Some(free[rng.range(0, free.len())])
        }
    }

    /// The room where the tunnel chain starting in `position` through `entry` first
    /// repeats itself, None when the chain runs out into an ordinary room.
    fn find_loop(&self, position: Position, entry: Direction) -> Option<Position> {
        let mut seen: FnvHashSet<(Position, u8)> = utils::fnv_hashset(8);
        let (mut position, mut entry) = (position, entry);
        loop {
            if !seen.insert((position, entry.bits())) {
                return Some(position);
            }
            let exit = self.room_at(position)?.passage_from(entry)?.exit;
            if !self.grid.is_open(exit, position) {
                return None;
            }
            let next = position.moved(exit);
            if !self.is_tunnel(next) {
                return None;
            }
            position = next;
            entry = exit.opposite();
        }
    }

    // A closed chain of tunnels would carry an actor round forever, demote one of its
    // rooms until no chain closes.
    fn break_tunnel_loops(&mut self, catalog: &BlueprintCatalog, rng: &mut MazeRng) -> Result<()> {
        loop {
            let looping = self
                .rooms()
                .filter(|room| room.is_tunnel())
                .flat_map(|room| room.passages.iter().map(move |p| (room.position, p.entry)))
                .filter_map(|(position, entry)| self.find_loop(position, entry))
                .next();

            let position = match looping {
                Some(position) => position,
                None => return Ok(()),
            };
            let tile = self.grid.tile_at(position);
            let blueprint = catalog
                .random_room(tile, rng)
                .ok_or_else(|| Error::from(ErrorKind::MissingBlueprint(tile)))?;
            warn!("Tunnel loop through {}, laying it out as {}", position, blueprint.name);
            if let Some(index) = self.grid.index_of(position) {
                self.rooms[index] = Some(Room::from_blueprint(position, blueprint));
            }
        }
    }
}
