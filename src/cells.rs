use bitflags::bitflags;
use smallvec::SmallVec;
use std::fmt;

bitflags! {
    /// Compass directions as bit flags so that tile shapes can be expressed as
    /// combinations, e.g. `Direction::NORTH | Direction::WEST` is a corner.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Direction: u8 {
        const NORTH = 1 << 0;
        const SOUTH = 1 << 1;
        const WEST = 1 << 2;
        const EAST = 1 << 3;
    }
}

pub type DirectionSmallVec = SmallVec<[Direction; 4]>;

/// The four primary directions in the order every scan of a tile uses.
pub const CARDINALS: [Direction; 4] =
    [Direction::NORTH, Direction::SOUTH, Direction::WEST, Direction::EAST];

impl Direction {
    /// Flip every set bit: North <-> South, West <-> East.
    /// Works on combinations, `(NORTH | WEST).opposite() == SOUTH | EAST`.
    pub fn opposite(self) -> Direction {
        let mut flipped = Direction::empty();
        if self.contains(Direction::NORTH) {
            flipped |= Direction::SOUTH;
        }
        if self.contains(Direction::SOUTH) {
            flipped |= Direction::NORTH;
        }
        if self.contains(Direction::WEST) {
            flipped |= Direction::EAST;
        }
        if self.contains(Direction::EAST) {
            flipped |= Direction::WEST;
        }
        flipped
    }

    /// Is this exactly one of the four primary directions?
    #[inline]
    pub fn is_cardinal(self) -> bool {
        self.bits().count_ones() == 1
    }

    /// The primary directions contained in this combination, in `CARDINALS` order.
    pub fn cardinals(self) -> DirectionSmallVec {
        CARDINALS.iter().cloned().filter(|dir| self.contains(*dir)).collect()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "None");
        }
        let names = self
            .cardinals()
            .iter()
            .map(|&dir| {
                if dir == Direction::NORTH {
                    "North"
                } else if dir == Direction::SOUTH {
                    "South"
                } else if dir == Direction::WEST {
                    "West"
                } else {
                    "East"
                }
            })
            .collect::<Vec<_>>();
        write!(f, "{}", names.join("|"))
    }
}

/// A cell on the maze grid.
///
/// `x` is the row along the depth axis (North is `x - 1`), `y` is the column along
/// the width axis (West is `y - 1`).
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd, Default)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    pub fn new(x: u32, y: u32) -> Position {
        Position { x, y }
    }

    /// The adjacent position one step in `direction`.
    ///
    /// No legality check is done here: stepping off the north or west edge wraps to
    /// a coordinate no grid contains, and non-cardinal directions do not move at all.
    pub fn moved(self, direction: Direction) -> Position {
        let (x, y) = (self.x, self.y);
        if direction == Direction::NORTH {
            Position::new(x.wrapping_sub(1), y)
        } else if direction == Direction::SOUTH {
            Position::new(x.wrapping_add(1), y)
        } else if direction == Direction::WEST {
            Position::new(x, y.wrapping_sub(1))
        } else if direction == Direction::EAST {
            Position::new(x, y.wrapping_add(1))
        } else {
            self
        }
    }

    /// Manhattan distance.
    #[inline]
    pub fn distance(self, other: Position) -> u32 {
        abs_diff(self.x, other.x) + abs_diff(self.y, other.y)
    }

    /// The primary direction leading from `self` to an adjacent `other`.
    pub fn direction_to(self, other: Position) -> Option<Direction> {
        CARDINALS.iter().cloned().find(|dir| self.moved(*dir) == other)
    }
}

impl From<(u32, u32)> for Position {
    fn from(x_y_pair: (u32, u32)) -> Position {
        Position::new(x_y_pair.0, x_y_pair.1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

#[inline]
fn abs_diff(a: u32, b: u32) -> u32 {
    if a > b {
        a - b
    } else {
        b - a
    }
}
