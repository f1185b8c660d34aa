use anyhow::{bail, Context, Result};

use crate::grid::{Direction, Grid, Pos};
use crate::walker::{breadth_first, Flow, StateSpace};

fn opens(tile: u8, direction: Direction) -> bool {
    use Direction::*;
    match tile {
        b'|' => matches!(direction, North | South),
        b'-' => matches!(direction, East | West),
        b'L' => matches!(direction, North | East),
        b'J' => matches!(direction, North | West),
        b'7' => matches!(direction, South | West),
        b'F' => matches!(direction, South | East),
        _ => false,
    }
}

struct Pipes<'a> {
    grid: &'a Grid,
    start: Pos,
    /// Directions the start tile opens towards; every direction while its shape is unknown.
    start_shape: Vec<Direction>,
}

impl<'a> Pipes<'a> {
    fn new(grid: &'a Grid, start: Pos) -> Result<Self> {
        let mut pipes = Self {
            grid,
            start,
            start_shape: Direction::ALL.to_vec(),
        };
        let shape: Vec<_> = Direction::ALL
            .into_iter()
            .filter(|&direction| pipes.returns_to_start(direction))
            .collect();
        if shape.len() != 2 {
            bail!("start tile closes {} pipe ends, expected 2", shape.len());
        }
        pipes.start_shape = shape;
        Ok(pipes)
    }

    fn opens(&self, pos: Pos, direction: Direction) -> bool {
        if pos == self.start {
            self.start_shape.contains(&direction)
        } else {
            opens(self.grid[pos], direction)
        }
    }

    fn connected(&self, pos: Pos, direction: Direction) -> Option<Pos> {
        let next = self.grid.neighbor(pos, direction)?;
        (self.opens(pos, direction) && self.opens(next, direction.opposite())).then_some(next)
    }

    /// Follows the pipe leaving the start tile towards `first` and checks that it leads back.
    fn returns_to_start(&self, first: Direction) -> bool {
        let mut heading = first;
        let Some(mut pos) = self.connected(self.start, heading) else {
            return false;
        };
        for _ in 0..self.grid.len() {
            if pos == self.start {
                return true;
            }
            let Some(exit) = Direction::ALL
                .into_iter()
                .find(|&d| d != heading.opposite() && self.opens(pos, d))
            else {
                return false;
            };
            let Some(next) = self.connected(pos, exit) else {
                return false;
            };
            heading = exit;
            pos = next;
        }
        false
    }
}

impl StateSpace for Pipes<'_> {
    type State = Pos;
    type Key = Pos;

    fn key(&self, state: &Pos) -> Pos {
        *state
    }

    fn successors(&self, &pos: &Pos, next: &mut Vec<Pos>) {
        next.extend(
            Direction::ALL
                .into_iter()
                .filter_map(|direction| self.connected(pos, direction)),
        );
    }
}

#[tracing::instrument(skip_all)]
pub fn day10(input: &str) -> Result<(u64, u64)> {
    let grid = Grid::parse(input)?;
    let start = grid.find(&b'S').context("no start tile")?;
    let pipes = Pipes::new(&grid, start)?;

    let mut on_loop = grid.map(|_| false);
    let mut farthest = 0;
    breadth_first(&pipes, [start], |&pos, steps| {
        on_loop[pos] = true;
        farthest = farthest.max(steps);
        Flow::Continue
    });

    // Crossing a tile that opens north flips between outside and inside.
    let mut enclosed = 0;
    for y in 0..grid.height() {
        let mut inside = false;
        for x in 0..grid.width() {
            let pos = (x, y);
            if on_loop[pos] {
                if pipes.opens(pos, Direction::North) {
                    inside = !inside;
                }
            } else if inside {
                enclosed += 1;
            }
        }
    }

    Ok((farthest as u64, enclosed))
}
