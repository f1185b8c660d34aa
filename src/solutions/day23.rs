use anyhow::{Context, Result};
use petgraph::Undirected;

use crate::corridor::CorridorGraph;
use crate::grid::{Direction, Grid, Pos};
use crate::walker::{longest_path, StateSpace};

fn slope(tile: u8) -> Option<Direction> {
    match tile {
        b'^' => Some(Direction::North),
        b'>' => Some(Direction::East),
        b'v' => Some(Direction::South),
        b'<' => Some(Direction::West),
        _ => None,
    }
}

/// Cell by cell walk where leaving a slope has to follow it.
struct Trails<'a>(&'a Grid);

impl StateSpace for Trails<'_> {
    type State = Pos;
    type Key = Pos;

    fn key(&self, state: &Pos) -> Pos {
        *state
    }

    fn successors(&self, &pos: &Pos, next: &mut Vec<Pos>) {
        let forced = slope(self.0[pos]);
        next.extend(
            self.0
                .neighbors(pos)
                .filter(|&(d, p)| forced.map_or(true, |f| f == d) && self.0[p] != b'#')
                .map(|(_, p)| p),
        );
    }
}

fn gap(grid: &Grid, y: usize) -> Option<Pos> {
    (0..grid.width()).map(|x| (x, y)).find(|&p| grid[p] == b'.')
}

#[tracing::instrument(skip_all)]
pub fn day23(input: &str) -> Result<(u64, u64)> {
    let grid = Grid::parse(input)?;
    let start = gap(&grid, 0).context("no gap in the top row")?;
    let end = gap(&grid, grid.height() - 1).context("no gap in the bottom row")?;

    let part1 = longest_path(
        &Trails(&grid),
        start,
        grid.len(),
        |&p| grid.index_of(p),
        |&p| p == end,
    )
    .context("end is unreachable")?;

    let graph =
        CorridorGraph::<Undirected>::build(&grid, start, end, |&c| c != b'#', |_, _| true);
    let part2 = graph.longest_route().context("end is unreachable")?;

    Ok((part1 as u64, part2 as u64))
}
