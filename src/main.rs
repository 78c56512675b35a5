use docopt::Docopt;
use log::info;
use maze_carver::{
    cells::{Direction, Position},
    grid::Grid,
    grid_displays::{self, GridDisplay, IntegrityDisplay, PathDisplay, TileDisplay},
    navigation::{Actor, Movement},
    pathing::Distances,
    MazeBuilder, MazeConfig,
};
use petgraph::visit::EdgeRef;
use serde_derive::Deserialize;
use std::{fs, fs::File, io::prelude::*};

const USAGE: &str = "Maze Carver

Usage:
    maze_driver -h | --help
    maze_driver [--config=<path>] [--seed=<s>] [--depth=<d>] [--width=<w>] [--fill=<f>] [--overfill] [--no-tunnels] [--show-distances | --show-integrity | --glyphs] [--walk=<dirs>] [--text-out=<path>] [--save-edges=<path>]

Options:
    -h --help              Show this screen.
    --config=<path>        JSON maze configuration, the other options override it.
    --seed=<s>             Seed text, numbers are used as is. A random name when empty.
    --depth=<d>            Number of rows [config default: 20].
    --width=<w>            Number of columns [config default: 20].
    --fill=<f>             Fraction of the grid to carve, in (0, 1] [config default: 0.5].
    --overfill             Let the last carving round finish after the quota is met.
    --no-tunnels           Lay out every room as an ordinary room.
    --show-distances       Show the distance from spawn to every room, base 36.
    --show-integrity       Mark spawn (@), orphans (!) and unexcavated blocks.
    --glyphs               Print one tile glyph per cell instead of drawing walls.
    --walk=<dirs>          Walk an actor from spawn, e.g. NNEWS, and print every path.
    --text-out=<path>      Write the textual rendering to a file instead of stdout.
    --save-edges=<path>    Serialize the maze to a text file: each line is a pair of numbers. Line 1: n(#vertices) m(#edges). Line 2+ edge between vertices. Uses 1-based vertex indices.
";
#[derive(Debug, Deserialize)]
struct MazeArgs {
    flag_config: Option<String>,
    flag_seed: Option<String>,
    flag_depth: Option<usize>,
    flag_width: Option<usize>,
    flag_fill: Option<f32>,
    flag_overfill: bool,
    flag_no_tunnels: bool,
    flag_show_distances: bool,
    flag_show_integrity: bool,
    flag_glyphs: bool,
    flag_walk: Option<String>,
    flag_text_out: Option<String>,
    flag_save_edges: Option<String>,
}

// Errors for the driver: the library's own chain plus the command line and file IO.
mod errors {
    use error_chain::*;
    error_chain! {

        links {
            Maze(::maze_carver::Error, ::maze_carver::ErrorKind);
        }

        foreign_links {
            DocOptFailure(::docopt::Error);
            Io(::std::io::Error);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: MazeArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;
    let config = maze_config(&args)?;

    let maze = MazeBuilder::build(config)?;
    let grid = maze.grid();
    info!("Built maze {}", grid.seed());

    if let Some(ref path) = args.flag_save_edges {
        save_maze_graph(grid, path)?;
    }

    let mut text = grid_displays::grid_summary(grid);
    text.push('\n');
    text.push_str(&render(grid, &args)?);

    if let Some(ref moves) = args.flag_walk {
        text.push('\n');
        text.push_str(&walk(&maze, moves)?);
    }

    match args.flag_text_out {
        Some(ref path) => write_text_to_file(&text, path)
            .chain_err(|| format!("Failed to write maze to text file {}", path))?,
        None => println!("{}", text),
    }

    Ok(())
}

fn maze_config(args: &MazeArgs) -> Result<MazeConfig> {
    let mut config = match args.flag_config {
        Some(ref path) => {
            let json = fs::read_to_string(path)
                .chain_err(|| format!("Failed to read configuration {}", path))?;
            MazeConfig::from_json_str(&json)?
        }
        None => MazeConfig::default(),
    };

    if let Some(ref seed) = args.flag_seed {
        config.seed = seed.clone();
    }
    if let Some(depth) = args.flag_depth {
        config.depth = depth;
    }
    if let Some(width) = args.flag_width {
        config.width = width;
    }
    if let Some(fill) = args.flag_fill {
        config.fill_ratio = fill;
    }
    config.allow_overfill |= args.flag_overfill;
    config.allow_tunnels &= !args.flag_no_tunnels;
    config.validate()?;
    Ok(config)
}

fn render(grid: &Grid, args: &MazeArgs) -> Result<String> {
    if args.flag_glyphs {
        return Ok(grid_displays::render_tiles(grid));
    }

    if args.flag_show_distances {
        let distances = Distances::new(grid, grid.spawn())
            .ok_or("Spawn is outside the grid, cannot show distances.")?;
        let furthest = distances
            .furthest_points_on_grid()
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let mut text = grid_displays::render_grid(grid, Some(&distances));
        text.push_str(&format!("Furthest from spawn, {} steps: {}\n", distances.max(), furthest));
        return Ok(text);
    }

    let display: Box<dyn GridDisplay> = if args.flag_show_integrity {
        Box::new(IntegrityDisplay::new(grid))
    } else {
        Box::new(TileDisplay::new(grid))
    };
    Ok(grid_displays::render_grid(grid, Some(&*display)))
}

fn parse_direction(c: char) -> Option<Direction> {
    match c.to_ascii_uppercase() {
        'N' => Some(Direction::NORTH),
        'S' => Some(Direction::SOUTH),
        'W' => Some(Direction::WEST),
        'E' => Some(Direction::EAST),
        _ => None,
    }
}

/// Move an actor from spawn once per letter, reporting each composed path and drawing
/// every room it went through.
fn walk(maze: &maze_carver::Maze, moves: &str) -> Result<String> {
    let layout = &maze.layout;
    let mut actor = Actor::new(layout.spawn(), 4.0);
    let mut report = format!("Walking from spawn {}\n", layout.spawn());
    let mut visited = vec![layout.spawn()];
    let mut arrive = |position: Position| {
        layout.events_in_proximity(position).len()
    };

    for c in moves.chars().filter(|c| !c.is_whitespace() && *c != ',') {
        let direction = parse_direction(c)
            .ok_or_else(|| format!("Unknown direction '{}', use N, S, W or E", c))?;
        let from = actor.position();
        if !actor.request_move(layout, direction)? {
            report.push_str(&format!("{:>5}: blocked at {}\n", direction.to_string(), from));
            continue;
        }

        let path = actor.path().cloned().ok_or("Accepted move without a path")?;
        loop {
            if let Movement::Arrived(at, events) = actor.advance(0.1, &mut arrive) {
                if events > 0 {
                    report.push_str(&format!("       {} events near {}\n", events, at));
                }
                break;
            }
        }
        visited.extend(path.tiles.iter().skip(1).cloned());
        let via = path.tiles.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(" ");
        report.push_str(&format!("{:>5}: {} -> {} in {} steps, {} waypoints, through {}\n",
                                 direction.to_string(),
                                 path.start,
                                 path.end,
                                 path.length,
                                 path.waypoints.len(),
                                 via));
    }
    report.push('\n');
    report.push_str(&grid_displays::render_grid(maze.grid(), Some(&PathDisplay::new(&visited))));
    Ok(report)
}

fn write_text_to_file(data: &str, file_name: &str) -> std::io::Result<()> {
    let mut f = File::create(file_name)?;
    f.write_all(data.as_bytes())?;
    Ok(())
}

fn save_maze_graph(grid: &Grid, file_path: &str) -> Result<()> {
    let graph = grid.links_graph();

    let mut graph_data = String::new();
    graph_data.push_str(&grid.capacity().to_string());
    graph_data.push(' ');
    graph_data.push_str(&graph.edge_count().to_string());
    graph_data.push('\n');

    for edge in graph.edge_references() {
        let src = grid.index_of(graph[edge.source()])
            .ok_or("Links graph should only hold grid positions")?;
        let dst = grid.index_of(graph[edge.target()])
            .ok_or("Links graph should only hold grid positions")?;
        graph_data.push_str(&(src + 1).to_string());
        graph_data.push(' ');
        graph_data.push_str(&(dst + 1).to_string());
        graph_data.push('\n');
    }

    write_text_to_file(&graph_data, file_path)
        .chain_err(|| format!("Failed to write maze graph to text file {}", file_path))?;

    Ok(())
}
