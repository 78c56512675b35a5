use crate::cells::{Direction, DirectionSmallVec, Position, CARDINALS};
use crate::grid::Grid;
use crate::utils::MazeRng;

const BIAS_FACTOR: f32 = 0.215;
const INDECISIVENESS_FACTOR: f32 = 0.45;
const ADVENTUROUS_FACTOR: f32 = 1.55;
const ADVENTUROUS_FLOOR: f32 = 0.025;
const SECOND_WIND_CHANCE: f32 = 0.25;

/// The outcome of one `Worker::work` call.
///
/// An invalid shift means the worker had nowhere left to go and has retired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    pub valid: bool,
    pub from: Position,
    pub to: Position,
    pub heading: Direction,
}

impl Shift {
    fn retired(at: Position) -> Shift {
        Shift {
            valid: false,
            from: at,
            to: at,
            heading: Direction::empty(),
        }
    }
}

/// A randomised digger that proposes one passage per shift.
///
/// Personality is rolled once at hire time: `bias` prunes disliked directions from the
/// choice set, `indecisiveness` makes the worker re-roll its pick, and `adventurousness`
/// scales how willing it is to break into tiles that are already busy.
#[derive(Debug, Clone)]
pub struct Worker {
    position: Position,
    lifespan: usize,
    bias: f32,
    indecisiveness: f32,
    adventurousness: f32,
    choices: DirectionSmallVec,
    smart_digging: bool,
}

impl Worker {
    pub fn new(lifespan: usize,
               deployment: Position,
               smart_digging: bool,
               rng: &mut MazeRng)
               -> Worker {

        let bias = rng.value() * BIAS_FACTOR;
        let indecisiveness = rng.value() * INDECISIVENESS_FACTOR;
        let adventurousness = rng.value() * ADVENTUROUS_FACTOR + ADVENTUROUS_FLOOR;

        let mut choices = CARDINALS.iter().cloned().collect::<DirectionSmallVec>();
        while rng.value() < bias {
            if choices.len() > 1 {
                choices.remove(rng.range(0, choices.len()));
            } else {
                break;
            }
        }

        Worker {
            position: deployment,
            lifespan,
            bias,
            indecisiveness,
            adventurousness,
            choices,
            smart_digging,
        }
    }

    /// A lifespan between half and all of `size` inclusive, `size` being the mean grid side.
    pub fn random_lifespan(size: usize, rng: &mut MazeRng) -> usize {
        rng.range(size / 2, size + 1).max(1)
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    #[inline]
    pub fn lifespan(&self) -> usize {
        self.lifespan
    }

    #[inline]
    pub fn is_retired(&self) -> bool {
        self.lifespan == 0
    }

    #[inline]
    pub fn bias(&self) -> f32 {
        self.bias
    }

    pub fn choices(&self) -> &[Direction] {
        &self.choices
    }

    pub fn retire(&mut self) {
        self.lifespan = 0;
    }

    /// Pick a direction and step the worker one cell along it.
    ///
    /// Candidates rejected by the density check are only dropped for this shift, the
    /// worker's own choice set is left untouched. Each rejection shrinks the candidates,
    /// so a shift makes at most four density rolls before it digs or retires.
    pub fn work(&mut self, grid: &Grid, rng: &mut MazeRng) -> Shift {
        let start = self.position;
        let mut candidates = self
            .choices
            .iter()
            .cloned()
            .filter(|dir| grid.is_move_legal(*dir, start))
            .collect::<DirectionSmallVec>();

        let heading = loop {
            if candidates.is_empty() {
                self.retire();
                return Shift::retired(start);
            }

            let mut direction = candidates[rng.range(0, candidates.len())];
            while rng.value() < self.indecisiveness {
                direction = candidates[rng.range(0, candidates.len())];
            }

            if !self.smart_digging || self.accepts(grid, start.moved(direction), rng) {
                break direction;
            }
            candidates.retain(|dir| *dir != direction);
        };

        self.position = start.moved(heading);
        if rng.value() > SECOND_WIND_CHANCE {
            self.lifespan = self.lifespan.saturating_sub(1);
        }

        Shift {
            valid: true,
            from: start,
            to: self.position,
            heading,
        }
    }

    // Untouched and fully open tiles are always entered, busy ones less often the more
    // openings they already have.
    fn accepts(&self, grid: &Grid, next: Position, rng: &mut MazeRng) -> bool {
        let holes = grid.tile_at(next).openings();
        if holes == 0 || holes == CARDINALS.len() {
            return true;
        }
        let advance_chance = 1.0 / (holes as f32 * self.adventurousness);
        rng.value() < advance_chance
    }
}
