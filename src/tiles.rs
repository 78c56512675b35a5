use crate::cells::{Direction, DirectionSmallVec, CARDINALS};
use std::fmt;

/// The carved state of one grid cell: the set of directions already opened.
///
/// A tile with no openings is an unexcavated block and not part of the maze.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug)]
pub struct Tile {
    entrances: Direction,
}

impl Tile {
    pub const BLOCK: Tile = Tile { entrances: Direction::empty() };
    pub const COMPASS: Tile = Tile { entrances: Direction::all() };

    pub fn new(entrances: Direction) -> Tile {
        Tile { entrances }
    }

    /// Every possible tile shape with at least one opening, in bit order.
    pub fn shapes() -> impl Iterator<Item = Tile> {
        (1..16u8).map(|bits| Tile::new(Direction::from_bits_truncate(bits)))
    }

    #[inline]
    pub fn value(&self) -> u8 {
        self.entrances.bits()
    }

    #[inline]
    pub fn directions(&self) -> Direction {
        self.entrances
    }

    #[inline]
    pub fn is_block(&self) -> bool {
        self.entrances.is_empty()
    }

    #[inline]
    pub fn is_open(&self, direction: Direction) -> bool {
        self.entrances.intersects(direction)
    }

    /// Number of open sides.
    #[inline]
    pub fn openings(&self) -> usize {
        self.entrances.bits().count_ones() as usize
    }

    pub fn entrances(&self) -> DirectionSmallVec {
        self.entrances.cardinals()
    }

    pub fn walls(&self) -> DirectionSmallVec {
        CARDINALS
            .iter()
            .cloned()
            .filter(|dir| !self.entrances.contains(*dir))
            .collect()
    }

    #[inline]
    pub fn create_opening(&mut self, direction: Direction) {
        self.entrances |= direction;
    }

    /// Box drawing glyph for the shape, a shade block for an unexcavated tile.
    pub fn glyph(&self) -> char {
        match self.value() {
            0b0001 => '\u{2568}', // N
            0b0010 => '\u{2565}', // S
            0b0100 => '\u{2561}', // W
            0b1000 => '\u{255E}', // E
            0b0101 => '\u{255D}', // NW
            0b1001 => '\u{255A}', // NE
            0b0011 => '\u{2551}', // NS
            0b0110 => '\u{2557}', // SW
            0b1010 => '\u{2554}', // SE
            0b1100 => '\u{2550}', // WE
            0b1101 => '\u{2569}', // NWE
            0b1110 => '\u{2566}', // SWE
            0b0111 => '\u{2563}', // NSW
            0b1011 => '\u{2560}', // NSE
            0b1111 => '\u{256C}',
            _ => '\u{2592}',
        }
    }

    /// Hexadecimal shape code, handy for logs and seeds comparisons.
    pub fn hex(&self) -> String {
        format!("{:X}", self.value())
    }
}

impl Default for Tile {
    fn default() -> Tile {
        Tile::BLOCK
    }
}

impl From<Direction> for Tile {
    fn from(direction: Direction) -> Tile {
        Tile::new(direction)
    }
}

impl From<Tile> for Direction {
    fn from(tile: Tile) -> Direction {
        tile.entrances
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_has_no_openings() {
        let t = Tile::BLOCK;
        assert!(t.is_block());
        assert_eq!(t.openings(), 0);
        assert!(t.entrances().is_empty());
        assert_eq!(&*t.walls(), &CARDINALS);
    }

    #[test]
    fn openings_entrances_and_walls() {
        let mut t = Tile::default();
        t.create_opening(Direction::EAST);
        t.create_opening(Direction::NORTH);
        assert_eq!(t.openings(), 2);
        assert_eq!(&*t.entrances(), &[Direction::NORTH, Direction::EAST]);
        assert_eq!(&*t.walls(), &[Direction::SOUTH, Direction::WEST]);
        assert!(t.is_open(Direction::NORTH));
        assert!(!t.is_open(Direction::SOUTH));
    }

    #[test]
    fn opening_twice_is_idempotent() {
        let mut t = Tile::default();
        t.create_opening(Direction::WEST);
        t.create_opening(Direction::WEST);
        assert_eq!(t, Tile::from(Direction::WEST));
        assert_eq!(t.value(), 4);
    }

    #[test]
    fn fifteen_shapes() {
        let shapes = Tile::shapes().collect::<Vec<_>>();
        assert_eq!(shapes.len(), 15);
        assert!(shapes.iter().all(|t| !t.is_block()));
        assert_eq!(shapes.last(), Some(&Tile::COMPASS));
    }

    #[test]
    fn glyphs() {
        assert_eq!(Tile::COMPASS.glyph(), '╬');
        assert_eq!(Tile::from(Direction::NORTH | Direction::SOUTH).glyph(), '║');
        assert_eq!(Tile::from(Direction::SOUTH | Direction::EAST).glyph(), '╔');
        assert_eq!(Tile::BLOCK.glyph(), '▒');
        assert_eq!(Tile::COMPASS.hex(), "F");
    }
}
