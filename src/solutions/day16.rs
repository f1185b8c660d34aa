use anyhow::{bail, Result};
use rayon::prelude::*;

use crate::grid::{Direction, Grid, Pos};
use crate::walker::{coverage, StateSpace};

type Beam = (Pos, Direction);

struct Contraption<'a>(&'a Grid);

impl StateSpace for Contraption<'_> {
    type State = Beam;
    type Key = Beam;

    fn key(&self, state: &Beam) -> Beam {
        *state
    }

    fn successors(&self, &(pos, heading): &Beam, next: &mut Vec<Beam>) {
        use Direction::*;
        let mut turn = |direction: Direction| {
            if let Some(p) = self.0.neighbor(pos, direction) {
                next.push((p, direction));
            }
        };
        match (self.0[pos], heading) {
            (b'/', East) => turn(North),
            (b'/', North) => turn(East),
            (b'/', West) => turn(South),
            (b'/', South) => turn(West),
            (b'\\', East) => turn(South),
            (b'\\', South) => turn(East),
            (b'\\', West) => turn(North),
            (b'\\', North) => turn(West),
            (b'|', East | West) => {
                turn(North);
                turn(South);
            }
            (b'-', North | South) => {
                turn(East);
                turn(West);
            }
            _ => turn(heading),
        }
    }
}

fn energized(grid: &Grid, entry: Beam) -> usize {
    coverage(&Contraption(grid), [entry], |&(pos, _)| pos)
}

#[tracing::instrument(skip_all)]
pub fn day16(input: &str) -> Result<(u64, u64)> {
    let grid = Grid::parse(input)?;
    if let Some(&c) = grid.cells().iter().find(|&&c| !b"./\\|-".contains(&c)) {
        bail!("unexpected tile {:?}", c as char);
    }

    let part1 = energized(&grid, ((0, 0), Direction::East));

    let (width, height) = (grid.width(), grid.height());
    let mut entries = Vec::with_capacity(2 * (width + height));
    for x in 0..width {
        entries.push(((x, 0), Direction::South));
        entries.push(((x, height - 1), Direction::North));
    }
    for y in 0..height {
        entries.push(((0, y), Direction::East));
        entries.push(((width - 1, y), Direction::West));
    }
    let part2 = entries
        .into_par_iter()
        .map(|entry| energized(&grid, entry))
        .max()
        .unwrap_or_default();

    Ok((part1 as u64, part2 as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    use indoc::indoc;

    #[test]
    fn test_day16() -> Result<()> {
        let example = indoc! {r"
            .|...\....
            |.-.\.....
            .....|-...
            ........|.
            ..........
            .........\
            ..../.\\..
            .-.-/..|..
            .|....-|.\
            ..//.|....
        "};
        assert_eq!(day16(example)?, (46, 51));
        Ok(())
    }

    #[test]
    fn splitter_sends_beams_both_ways() -> Result<()> {
        let grid = Grid::parse("..|..\n.....\n")?;
        // the beam is split at the splitter and runs down one column and off the top
        assert_eq!(energized(&grid, ((0, 0), Direction::East)), 4);
        Ok(())
    }
}
