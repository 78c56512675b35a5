use crate::cells::{Direction, Position};
use crate::errors::*;
use crate::layout::{Layout, Waypoint};

/// The outcome of a single directional move.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationPath {
    /// Steps taken, zero when the first step was blocked.
    pub length: usize,
    /// Every room visited in order, the start included.
    pub tiles: Vec<Position>,
    /// Points to move through in order, starting at the start room centre.
    pub waypoints: Vec<Waypoint>,
    pub start: Position,
    pub end: Position,
}

fn push_unique(waypoints: &mut Vec<Waypoint>, waypoint: Waypoint) {
    if waypoints.last() != Some(&waypoint) {
        waypoints.push(waypoint);
    }
}

/// Walk from `start` towards `direction` until an ordinary room is entered.
///
/// Tunnels do not stop the walk: the passage matching the side the actor came in through
/// adds its entry, pivot and exit points and the walk carries on along the passage's exit
/// direction. A tunnel without a passage for that side is a `MissingPassage` error.
pub fn compute_path(layout: &Layout, start: Position, direction: Direction)
                    -> Result<NavigationPath> {

    let mut length = 0;
    let mut tiles = vec![start];
    let mut waypoints = vec![Waypoint::from(start)];
    let mut direction = direction;
    let mut current = start;

    while layout.is_move_legal(direction, current) {
        length += 1;
        current = current.moved(direction);
        tiles.push(current);

        let room = match layout.room_at(current) {
            Some(room) if room.is_tunnel() => room,
            _ => {
                waypoints.push(Waypoint::from(current));
                break;
            }
        };

        let entered_from = direction.opposite();
        let passage = room
            .passage_from(entered_from)
            .ok_or_else(|| Error::from(ErrorKind::MissingPassage(current, entered_from)))?;
        let center = room.center();
        push_unique(&mut waypoints, center + passage.entry_offset);
        push_unique(&mut waypoints, center + passage.pivot_offset);
        push_unique(&mut waypoints, center + passage.exit_offset);
        direction = passage.exit;
    }

    Ok(NavigationPath {
        length,
        tiles,
        waypoints,
        start,
        end: current,
    })
}

/// Hook for whatever should happen when an actor lands on a room.
pub trait ArrivalHandler {
    type Effect;

    fn on_arrival(&mut self, position: Position) -> Self::Effect;
}

impl<F, E> ArrivalHandler for F
    where F: FnMut(Position) -> E
{
    type Effect = E;

    fn on_arrival(&mut self, position: Position) -> E {
        self(position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorState {
    Idle,
    /// A path was accepted and the grid position already moved to its end.
    Committed,
    Traversing,
}

/// What one `Actor::advance` call did.
#[derive(Debug, Clone, PartialEq)]
pub enum Movement<E> {
    Idle,
    Moving(Waypoint),
    Arrived(Position, E),
}

const TUNNEL_SPEEDUP: f32 = 1.5;

/// Something that walks the maze one directional move at a time.
///
/// The grid position jumps to the end of a path as soon as it is accepted, the
/// interpolated `location` then catches up over repeated `advance` calls.
#[derive(Debug, Clone)]
pub struct Actor {
    position: Position,
    location: Waypoint,
    speed: f32,
    path: Option<NavigationPath>,
    step: usize,
    progress: f32,
}

impl Actor {
    /// `speed` is in waypoint segments per unit of time.
    pub fn new(position: Position, speed: f32) -> Actor {
        Actor {
            position,
            location: Waypoint::from(position),
            speed,
            path: None,
            step: 0,
            progress: 0.0,
        }
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    #[inline]
    pub fn location(&self) -> Waypoint {
        self.location
    }

    #[inline]
    pub fn is_busy(&self) -> bool {
        self.path.is_some()
    }

    pub fn path(&self) -> Option<&NavigationPath> {
        self.path.as_ref()
    }

    pub fn state(&self) -> ActorState {
        match self.path {
            None => ActorState::Idle,
            Some(_) if self.step == 1 && self.progress == 0.0 => ActorState::Committed,
            Some(_) => ActorState::Traversing,
        }
    }

    /// Compute and commit the move towards `direction`. Returns false, leaving the actor
    /// untouched, when it is busy or the move goes nowhere.
    pub fn request_move(&mut self, layout: &Layout, direction: Direction) -> Result<bool> {
        if self.is_busy() {
            return Ok(false);
        }
        let path = compute_path(layout, self.position, direction)?;
        Ok(self.commit(path))
    }

    /// Commit an already computed path, same rules as `request_move`.
    pub fn commit(&mut self, path: NavigationPath) -> bool {
        if self.is_busy() || path.length == 0 || path.waypoints.len() < 2 {
            return false;
        }
        self.position = path.end;
        self.location = path.waypoints[0];
        self.step = 1;
        self.progress = 0.0;
        self.path = Some(path);
        true
    }

    /// Move along the current segment by `speed * delta`, faster when the path chains
    /// through tunnels. Reaching the last waypoint calls the handler once and frees the actor.
    pub fn advance<H>(&mut self, delta: f32, handler: &mut H) -> Movement<H::Effect>
        where H: ArrivalHandler
    {
        let (from, to, last_step, speedup) = match self.path {
            Some(ref path) => {
                let speedup = if path.length > 1 { TUNNEL_SPEEDUP } else { 1.0 };
                (path.waypoints[self.step - 1],
                 path.waypoints[self.step],
                 self.step + 1 == path.waypoints.len(),
                 speedup)
            }
            None => return Movement::Idle,
        };

        self.progress = (self.progress + self.speed * delta * speedup).min(1.0);
        self.location = from.lerp(to, self.progress);

        if self.progress < 1.0 {
            return Movement::Moving(self.location);
        }
        if !last_step {
            self.step += 1;
            self.progress = 0.0;
            return Movement::Moving(self.location);
        }

        self.path = None;
        self.step = 0;
        self.progress = 0.0;
        Movement::Arrived(self.position, handler.on_arrival(self.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::layout::{Blueprint, BlueprintCatalog, LayoutOptions, Passage};
    use crate::tiles::Tile;
    use crate::units::{Depth, Width};
    use crate::utils::MazeRng;

    const TUNNELS: LayoutOptions = LayoutOptions {
        allow_tunnels: true,
        tunnel_chance: 1.0,
    };

    // Spawn (2,0) leads north into a south-east bend at (1,0), which turns east into a
    // straight corridor (1,1)-(1,2).
    fn bent_grid() -> Grid {
        let mut g = Grid::new("navigation", Depth(3), Width(3), 1.0, false).unwrap();
        g.dig(Position::new(2, 0), Direction::NORTH);
        g.dig(Position::new(1, 0), Direction::EAST);
        g.dig(Position::new(1, 1), Direction::EAST);
        g.set_spawn(Position::new(2, 0));
        g
    }

    fn bent_layout() -> Layout {
        let mut rng = MazeRng::new(0);
        Layout::build(bent_grid(), BlueprintCatalog::default_catalog(), &mut rng, TUNNELS).unwrap()
    }

    #[test]
    fn blocked_first_step_goes_nowhere() {
        let layout = bent_layout();
        let path = compute_path(&layout, Position::new(2, 0), Direction::EAST).unwrap();
        assert_eq!(path.length, 0);
        assert_eq!(path.end, path.start);
        assert_eq!(path.tiles, vec![Position::new(2, 0)]);
        assert_eq!(path.waypoints.len(), 1);
    }

    #[test]
    fn ordinary_step_stops_in_the_next_room() {
        let layout = bent_layout();
        let path = compute_path(&layout, Position::new(1, 2), Direction::WEST).unwrap();
        assert_eq!(path.length, 1);
        assert_eq!(path.end, Position::new(1, 1));
        assert_eq!(path.waypoints, vec![Waypoint::new(1.0, 2.0), Waypoint::new(1.0, 1.0)]);
    }

    #[test]
    fn tunnels_redirect_travel() {
        let layout = bent_layout();
        assert!(layout.is_tunnel(Position::new(1, 0)));

        let path = compute_path(&layout, Position::new(2, 0), Direction::NORTH).unwrap();
        assert_eq!(path.length, 2);
        assert_eq!(path.end, Position::new(1, 1));
        assert_eq!(path.tiles,
                   vec![Position::new(2, 0), Position::new(1, 0), Position::new(1, 1)]);
        assert_eq!(path.waypoints,
                   vec![Waypoint::new(2.0, 0.0),
                        Waypoint::new(1.5, 0.0),
                        Waypoint::new(1.0, 0.0),
                        Waypoint::new(1.0, 0.5),
                        Waypoint::new(1.0, 1.0)]);
    }

    #[test]
    fn tunnel_without_matching_passage_is_an_error() {
        let south_east = Tile::from(Direction::SOUTH | Direction::EAST);
        let catalog = BlueprintCatalog::new(vec![
            Blueprint::room("n", Tile::from(Direction::NORTH)),
            Blueprint::room("w", Tile::from(Direction::WEST)),
            Blueprint::room("we", Tile::from(Direction::WEST | Direction::EAST)),
            Blueprint::room("se", south_east),
            Blueprint::tunnel("one-way", south_east,
                              vec![Passage::between(Direction::EAST, Direction::SOUTH)]),
        ]);
        let mut rng = MazeRng::new(0);
        let layout = Layout::build(bent_grid(), &catalog, &mut rng, TUNNELS).unwrap();

        match compute_path(&layout, Position::new(2, 0), Direction::NORTH) {
            Err(Error(ErrorKind::MissingPassage(position, entry), _)) => {
                assert_eq!(position, Position::new(1, 0));
                assert_eq!(entry, Direction::SOUTH);
            }
            other => panic!("expected a missing passage, got {:?}", other),
        }
        let back = compute_path(&layout, Position::new(1, 1), Direction::WEST).unwrap();
        assert_eq!(back.end, Position::new(2, 0));
    }

    #[test]
    fn actor_walks_through_the_tunnel() {
        let layout = bent_layout();
        let mut actor = Actor::new(layout.spawn(), 1.0);
        let mut arrivals = vec![];
        let mut record = |p: Position| {
            arrivals.push(p);
            p.x + p.y
        };

        assert_eq!(actor.state(), ActorState::Idle);
        assert_eq!(actor.advance(1.0, &mut record), Movement::Idle);

        assert!(actor.request_move(&layout, Direction::NORTH).unwrap());
        assert_eq!(actor.state(), ActorState::Committed);
        assert_eq!(actor.position(), Position::new(1, 1));
        assert!(!actor.request_move(&layout, Direction::SOUTH).unwrap());

        // Four segments, each finished in one call at the tunnel speed up.
        for _ in 0..3 {
            match actor.advance(1.0, &mut record) {
                Movement::Moving(_) => {}
                other => panic!("expected to be moving, got {:?}", other),
            }
            assert_eq!(actor.state(), ActorState::Traversing);
        }
        assert_eq!(actor.advance(1.0, &mut record), Movement::Arrived(Position::new(1, 1), 2));
        assert_eq!(actor.state(), ActorState::Idle);
        assert_eq!(actor.location(), Waypoint::new(1.0, 1.0));
        assert_eq!(actor.advance(1.0, &mut record), Movement::Idle);
        drop(record);
        assert_eq!(arrivals, vec![Position::new(1, 1)]);
    }

    #[test]
    fn actor_interpolates_single_steps() {
        let layout = bent_layout();
        let mut actor = Actor::new(Position::new(1, 2), 0.25);
        let mut handler = |_: Position| ();
        assert!(actor.request_move(&layout, Direction::WEST).unwrap());
        assert_eq!(actor.advance(1.0, &mut handler), Movement::Moving(Waypoint::new(1.0, 1.75)));
        assert_eq!(actor.advance(2.0, &mut handler), Movement::Moving(Waypoint::new(1.0, 1.25)));
        assert_eq!(actor.advance(1.0, &mut handler), Movement::Arrived(Position::new(1, 1), ()));
    }

    #[test]
    fn zero_length_moves_are_rejected() {
        let layout = bent_layout();
        let mut actor = Actor::new(layout.spawn(), 1.0);
        assert!(!actor.request_move(&layout, Direction::WEST).unwrap());
        assert_eq!(actor.state(), ActorState::Idle);
        assert_eq!(actor.position(), layout.spawn());
    }
}
