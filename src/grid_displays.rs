use std::fmt;

use crate::cells::{Direction, Position};
use crate::grid::Grid;
use crate::integrity;
use crate::pathing::Distances;
use crate::utils::FnvHashSet;

/// Renders the three character wide body of a cell.
pub trait GridDisplay {
    fn render_cell_body(&self, position: Position) -> String;
}

/// The box drawing glyph of each tile's shape.
#[derive(Debug)]
pub struct TileDisplay<'a> {
    grid: &'a Grid,
}

impl<'a> TileDisplay<'a> {
    pub fn new(grid: &'a Grid) -> TileDisplay<'a> {
        TileDisplay { grid }
    }
}

impl<'a> GridDisplay for TileDisplay<'a> {
    fn render_cell_body(&self, position: Position) -> String {
        format!(" {} ", self.grid.tile_at(position).glyph())
    }
}

/// Spawn as `@`, orphans as `!`, unexcavated blocks shaded.
#[derive(Debug)]
pub struct IntegrityDisplay {
    spawn: Position,
    orphans: FnvHashSet<Position>,
    blocks: FnvHashSet<Position>,
}

impl IntegrityDisplay {
    pub fn new(grid: &Grid) -> IntegrityDisplay {
        IntegrityDisplay {
            spawn: grid.spawn(),
            orphans: integrity::orphans(grid, grid.spawn()).into_iter().collect(),
            blocks: grid.iter().filter(|p| grid.tile_at(*p).is_block()).collect(),
        }
    }
}

impl GridDisplay for IntegrityDisplay {
    fn render_cell_body(&self, position: Position) -> String {
        if position == self.spawn {
            String::from(" @ ")
        } else if self.orphans.contains(&position) {
            String::from(" ! ")
        } else if self.blocks.contains(&position) {
            String::from(" ▒ ")
        } else {
            String::from("   ")
        }
    }
}

impl GridDisplay for Distances {
    fn render_cell_body(&self, position: Position) -> String {
        match self.distance_from_start_to(position) {
            // centre align, padding 3, base 36
            Some(d) => format!("{:^3}", base36(d)),
            None => String::from("   "),
        }
    }
}

/// Marks the cells of a route with a dot.
#[derive(Debug)]
pub struct PathDisplay {
    on_path: FnvHashSet<Position>,
}

impl PathDisplay {
    pub fn new(path: &[Position]) -> Self {
        PathDisplay { on_path: path.iter().cloned().collect() }
    }
}

impl GridDisplay for PathDisplay {
    fn render_cell_body(&self, position: Position) -> String {
        if self.on_path.contains(&position) {
            String::from(" . ")
        } else {
            String::from("   ")
        }
    }
}

fn base36(mut n: u32) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut digits = vec![];
    loop {
        digits.push(DIGITS[(n % 36) as usize] as char);
        n /= 36;
        if n == 0 {
            break;
        }
    }
    digits.iter().rev().collect()
}

/// One glyph per tile, one line per row.
pub fn render_tiles(grid: &Grid) -> String {
    let mut output = String::with_capacity(grid.capacity() * 4);
    for x in 0..grid.depth() as u32 {
        for y in 0..grid.width() as u32 {
            output.push(grid.tile_at(Position::new(x, y)).glyph());
        }
        output.push('\n');
    }
    output
}

/// Seed, size and how much of the grid is carved.
pub fn grid_summary(grid: &Grid) -> String {
    let carved = grid.carved().0;
    format!("Seed: {}\nGrid is {} deep and {} wide, with {} tiles.\nLaid {} ({:.2}%) tiles, \
             spawn at {}.\n",
            grid.seed(),
            grid.depth(),
            grid.width(),
            grid.capacity(),
            carved,
            carved as f32 * 100.0 / grid.capacity() as f32,
            grid.spawn())
}

/// Walls drawn with box drawing lines, cell bodies from `display` or left blank.
pub fn render_grid(grid: &Grid, display: Option<&dyn GridDisplay>) -> String {
    const WALL_L: &str = "╴";
    const WALL_R: &str = "╶";
    const WALL_U: &str = "╵";
    const WALL_D: &str = "╷";
    const WALL_LR_3: &str = "───";
    const WALL_LR: &str = "─";
    const WALL_UD: &str = "│";
    const WALL_LD: &str = "┐";
    const WALL_RU: &str = "└";
    const WALL_LU: &str = "┘";
    const WALL_RD: &str = "┌";
    const WALL_LRU: &str = "┴";
    const WALL_LRD: &str = "┬";
    const WALL_LRUD: &str = "┼";
    const WALL_RUD: &str = "├";
    const WALL_LUD: &str = "┤";
    const EMPTY_BODY: &str = "   ";

    let (depth, width) = (grid.depth() as u32, grid.width() as u32);
    let open = |position: Position, direction| grid.is_open(direction, position);

    // The north boundary is special cased, every row below draws its own south wall.
    let mut output = String::from(WALL_RD);
    for y in 0..width {
        output.push_str(WALL_LR_3);
        if open(Position::new(0, y), Direction::EAST) {
            output.push_str(WALL_LR);
        } else if y == width - 1 {
            output.push_str(WALL_LD);
        } else {
            output.push_str(WALL_LRD);
        }
    }
    output.push('\n');

    for x in 0..depth {
        let is_last_row = x == depth - 1;
        let mut middle = String::from(WALL_UD);
        let mut bottom = String::new();

        for y in 0..width {
            let position = Position::new(x, y);
            let is_last_column = y == width - 1;
            let east_open = open(position, Direction::EAST);
            let south_open = open(position, Direction::SOUTH);

            match display {
                Some(displayer) => middle.push_str(&displayer.render_cell_body(position)),
                None => middle.push_str(EMPTY_BODY),
            }
            middle.push_str(if east_open { " " } else { WALL_UD });

            if y == 0 {
                bottom.push_str(if is_last_row {
                    WALL_RU
                } else if south_open {
                    WALL_UD
                } else {
                    WALL_RUD
                });
            }
            bottom.push_str(if south_open { EMPTY_BODY } else { WALL_LR_3 });

            let corner = match (is_last_row, is_last_column) {
                (true, true) => WALL_LU,
                (true, false) => if east_open { WALL_LR } else { WALL_LRU },
                (false, true) => if south_open { WALL_UD } else { WALL_LUD },
                (false, false) => {
                    let access_se_from_east = open(position.moved(Direction::EAST), Direction::SOUTH);
                    let access_se_from_south = open(position.moved(Direction::SOUTH), Direction::EAST);
                    match (!south_open, !access_se_from_east, !east_open, !access_se_from_south) {
                        (true, true, true, true) => WALL_LRUD,
                        (true, true, true, false) => WALL_LRU,
                        (true, true, false, true) => WALL_LRD,
                        (true, false, true, true) => WALL_LUD,
                        (false, true, true, true) => WALL_RUD,
                        (true, true, false, false) => WALL_LR,
                        (false, false, true, true) => WALL_UD,
                        (false, true, true, false) => WALL_RU,
                        (true, false, false, true) => WALL_LD,
                        (true, false, true, false) => WALL_LU,
                        (false, true, false, true) => WALL_RD,
                        (true, false, false, false) => WALL_L,
                        (false, true, false, false) => WALL_R,
                        (false, false, true, false) => WALL_U,
                        (false, false, false, true) => WALL_D,
                        _ => " ",
                    }
                }
            };
            bottom.push_str(corner);
        }

        output.push_str(&middle);
        output.push('\n');
        output.push_str(&bottom);
        output.push('\n');
    }
    output
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", render_grid(self, Some(&TileDisplay::new(self))))
    }
}
