use anyhow::{bail, Result};

use crate::cycle::run_until;
use crate::grid::{Direction, Grid, Pos};

const SPIN_CYCLES: usize = 1_000_000_000;

/// Position of the `i`th cell of `lane`, counted from the edge the rocks roll towards.
fn lane_cell(grid: &Grid, direction: Direction, lane: usize, i: usize) -> Pos {
    match direction {
        Direction::North => (lane, i),
        Direction::South => (lane, grid.height() - 1 - i),
        Direction::West => (i, lane),
        Direction::East => (grid.width() - 1 - i, lane),
    }
}

fn tilt(grid: &mut Grid, direction: Direction) {
    let (lanes, len) = if direction.is_horizontal() {
        (grid.height(), grid.width())
    } else {
        (grid.width(), grid.height())
    };
    for lane in 0..lanes {
        let mut free = 0;
        for i in 0..len {
            let pos = lane_cell(grid, direction, lane, i);
            match grid[pos] {
                b'#' => free = i + 1,
                b'O' => {
                    if free != i {
                        let target = lane_cell(grid, direction, lane, free);
                        grid[target] = b'O';
                        grid[pos] = b'.';
                    }
                    free += 1;
                }
                _ => {}
            }
        }
    }
}

fn spin(grid: &mut Grid) {
    for direction in [
        Direction::North,
        Direction::West,
        Direction::South,
        Direction::East,
    ] {
        tilt(grid, direction);
    }
}

fn north_load(grid: &Grid) -> u64 {
    grid.positions()
        .filter(|&pos| grid[pos] == b'O')
        .map(|(_, y)| (grid.height() - y) as u64)
        .sum()
}

#[tracing::instrument(skip_all)]
pub fn day14(input: &str) -> Result<(u64, u64)> {
    let platform = Grid::parse(input)?;
    if let Some(&c) = platform.cells().iter().find(|&&c| !b".#O".contains(&c)) {
        bail!("unexpected tile {:?}", c as char);
    }

    let mut tilted = platform.clone();
    tilt(&mut tilted, Direction::North);
    let part1 = north_load(&tilted);

    let mut spun = platform;
    run_until(&mut spun, SPIN_CYCLES, spin, Grid::clone);
    let part2 = north_load(&spun);

    Ok((part1, part2))
}

#[cfg(test)]
mod tests {
    use super::*;

    use indoc::indoc;

    const EXAMPLE: &str = indoc! {"
        O....#....
        O.OO#....#
        .....##...
        OO.#O....O
        .O.....O#.
        O.#..O.#.#
        ..O..#O..O
        .......O..
        #....###..
        #OO..#....
    "};

    #[test]
    fn test_day14() -> Result<()> {
        assert_eq!(day14(EXAMPLE)?, (136, 64));
        Ok(())
    }

    #[test]
    fn one_spin_cycle() -> Result<()> {
        let mut grid = Grid::parse(EXAMPLE)?;
        spin(&mut grid);
        let expected = indoc! {"
            .....#....
            ....#...O#
            ...OO##...
            .OO#......
            .....OOO#.
            .O#...O#.#
            ....O#....
            ......OOOO
            #...O###..
            #..OO#....
        "};
        assert_eq!(grid.to_text(), expected.trim_end());
        Ok(())
    }
}
