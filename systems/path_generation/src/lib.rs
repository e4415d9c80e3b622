#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that carves a randomized enemy route across the board.
//!
//! The route is a weighted random walk over a coarse grid that favours moving
//! right, never revisits a cell, and stays clear of the top and bottom rows.
//! Corners are softened by inserting interpolated points around each turn.

use aegis_defence_core::{BoardConfig, Path};
use glam::Vec2;
use rand::Rng;
use tracing::debug;

/// Side length of a walk cell in board units.
pub const CELL_SIZE: f32 = 40.0;

/// Distance between the board edge and the walk grid.
pub const MARGIN: f32 = 80.0;

/// Horizontal distance between the right board edge and the base anchor.
pub const BASE_INSET: f32 = 75.0;

const SMOOTHING_FRACTION: f32 = 0.3;

/// First row the walk may use; the same number of rows is kept clear at the bottom.
const INTERIOR_FIRST_ROW: u32 = 2;

/// Weighted moves available to the walk.
const MOVES: [(Step, f32); 3] = [(Step::Right, 0.7), (Step::Up, 0.15), (Step::Down, 0.15)];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Right,
    Up,
    Down,
}

impl Step {
    fn apply(self, cell: GridCell) -> Option<GridCell> {
        match self {
            Self::Right => Some(GridCell::new(cell.column + 1, cell.row)),
            Self::Up => cell
                .row
                .checked_sub(1)
                .map(|row| GridCell::new(cell.column, row)),
            Self::Down => Some(GridCell::new(cell.column, cell.row + 1)),
        }
    }
}

/// Cell of the coarse grid the walk moves over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell {
    /// Zero-based column index.
    pub column: u32,
    /// Zero-based row index.
    pub row: u32,
}

impl GridCell {
    /// Creates a grid cell at the provided column and row.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }
}

/// Outcome of a path generation run.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedPath {
    /// Smoothed route handed to the world.
    pub path: Path,
    /// Walk cells in visiting order, before smoothing.
    pub cells: Vec<GridCell>,
    /// Row the walk starts on.
    pub start_row: u32,
    /// Row the base anchor sits on.
    pub end_row: u32,
}

struct Grid {
    columns: u32,
    rows: u32,
    visited: Vec<bool>,
}

impl Grid {
    fn new(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            visited: vec![false; columns as usize * rows as usize],
        }
    }

    fn index(&self, cell: GridCell) -> Option<usize> {
        (cell.column < self.columns && cell.row < self.rows)
            .then(|| cell.row as usize * self.columns as usize + cell.column as usize)
    }

    fn visit(&mut self, cell: GridCell) {
        if let Some(index) = self.index(cell) {
            self.visited[index] = true;
        }
    }

    fn is_open(&self, cell: GridCell) -> bool {
        self.index(cell).is_some_and(|index| !self.visited[index])
            && cell.row >= INTERIOR_FIRST_ROW
            && cell.row + INTERIOR_FIRST_ROW < self.rows
    }

    fn interior_row<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        let band = self.rows.saturating_sub(2 * INTERIOR_FIRST_ROW);
        if band == 0 {
            return self.rows / 2;
        }
        rng.gen_range(0..band) + INTERIOR_FIRST_ROW
    }
}

fn cell_point(cell: GridCell) -> Vec2 {
    Vec2::new(
        MARGIN + cell.column as f32 * CELL_SIZE,
        MARGIN + cell.row as f32 * CELL_SIZE,
    )
}

fn grid_dimension(extent: f32) -> u32 {
    ((extent - 2.0 * MARGIN) / CELL_SIZE).floor().max(0.0) as u32
}

/// Generates a fresh route for the provided board.
///
/// Never fails: a walk that runs out of moves stops early and the route is
/// completed with a straight run to the last column.
pub fn generate<R: Rng + ?Sized>(board: &BoardConfig, rng: &mut R) -> GeneratedPath {
    let columns = grid_dimension(board.width);
    let rows = grid_dimension(board.height);
    let mut grid = Grid::new(columns, rows);

    let start_row = grid.interior_row(rng);
    let end_row = grid.interior_row(rng);

    let mut current = GridCell::new(0, start_row);
    grid.visit(current);
    let mut cells = vec![current];
    let mut waypoints = vec![Vec2::new(0.0, MARGIN + start_row as f32 * CELL_SIZE)];

    while current.column + 2 < columns {
        let Some(next) = choose_step(&grid, current, rng) else {
            debug!(column = current.column, row = current.row, "path walk hit a dead end");
            break;
        };
        current = next;
        grid.visit(current);
        cells.push(current);
        waypoints.push(cell_point(current));
    }

    while current.column + 1 < columns {
        current = GridCell::new(current.column + 1, current.row);
        grid.visit(current);
        cells.push(current);
        waypoints.push(cell_point(current));
    }

    let anchor = Vec2::new(
        board.width - BASE_INSET,
        MARGIN + end_row as f32 * CELL_SIZE,
    );
    if let Some(last) = waypoints.last() {
        if (last.y - anchor.y).abs() > CELL_SIZE {
            waypoints.push(Vec2::new(anchor.x - 2.0 * CELL_SIZE, anchor.y));
        }
    }
    waypoints.push(anchor);

    let points = smooth(&waypoints);
    debug!(
        columns,
        rows,
        start_row,
        end_row,
        points = points.len(),
        "generated enemy path"
    );

    GeneratedPath {
        path: Path::new(points),
        cells,
        start_row,
        end_row,
    }
}

fn choose_step<R: Rng + ?Sized>(grid: &Grid, current: GridCell, rng: &mut R) -> Option<GridCell> {
    let mut candidates: Vec<(GridCell, f32)> = Vec::with_capacity(MOVES.len());
    for (step, weight) in MOVES {
        if let Some(cell) = step.apply(current) {
            if grid.is_open(cell) {
                candidates.push((cell, weight));
            }
        }
    }

    let total: f32 = candidates.iter().map(|(_, weight)| weight).sum();
    if candidates.is_empty() || total <= 0.0 {
        return None;
    }

    let roll: f32 = rng.gen();
    let mut cumulative = 0.0;
    for (cell, weight) in &candidates {
        cumulative += weight / total;
        if roll <= cumulative {
            return Some(*cell);
        }
    }
    candidates.last().map(|(cell, _)| *cell)
}

/// Inserts softening points around every direction change.
///
/// Each turning vertex is replaced by the point 70% along the incoming
/// segment, the vertex itself, and the point 30% along the outgoing segment.
fn smooth(waypoints: &[Vec2]) -> Vec<Vec2> {
    if waypoints.len() <= 2 {
        return waypoints.to_vec();
    }

    let mut smoothed = Vec::with_capacity(waypoints.len() * 3);
    smoothed.push(waypoints[0]);
    for window in waypoints.windows(3) {
        let (previous, current, next) = (window[0], window[1], window[2]);
        let incoming = current - previous;
        let outgoing = next - current;
        if turns(incoming, outgoing) {
            smoothed.push(current - incoming * SMOOTHING_FRACTION);
            smoothed.push(current);
            smoothed.push(current + outgoing * SMOOTHING_FRACTION);
        } else {
            smoothed.push(current);
        }
    }
    if let Some(last) = waypoints.last() {
        smoothed.push(*last);
    }
    smoothed
}

fn turns(incoming: Vec2, outgoing: Vec2) -> bool {
    match (incoming.try_normalize(), outgoing.try_normalize()) {
        (Some(a), Some(b)) => !a.abs_diff_eq(b, 1e-4),
        _ => false,
    }
}
