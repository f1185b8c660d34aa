use anyhow::{bail, Context, Result};

use crate::grid::{Grid, Pos};
use crate::walker::{breadth_first, Flow, StateSpace};

const STEPS: usize = 64;
const TILED_STEPS: usize = 26_501_365;

struct Garden<'a> {
    map: &'a Grid,
    tiled: bool,
}

impl StateSpace for Garden<'_> {
    type State = (i64, i64);
    type Key = (i64, i64);

    fn key(&self, state: &(i64, i64)) -> (i64, i64) {
        *state
    }

    fn successors(&self, &(x, y): &(i64, i64), next: &mut Vec<(i64, i64)>) {
        for (nx, ny) in [(x, y - 1), (x + 1, y), (x, y + 1), (x - 1, y)] {
            let tile = if self.tiled {
                Some(self.map.get_wrapped(nx, ny))
            } else {
                self.map.get(nx as isize, ny as isize)
            };
            if tile.is_some_and(|&t| t != b'#') {
                next.push((nx, ny));
            }
        }
    }
}

/// Number of plots that can be the final position after exactly `steps` steps.
///
/// Walking back and forth is allowed, so these are the plots reached within `steps` whose distance
/// has the same parity.
pub fn reachable(map: &Grid, start: Pos, steps: usize, tiled: bool) -> u64 {
    let garden = Garden { map, tiled };
    let mut count = 0;
    breadth_first(&garden, [(start.0 as i64, start.1 as i64)], |_, d| {
        if d % 2 == steps % 2 {
            count += 1;
        }
        if d == steps {
            Flow::Prune
        } else {
            Flow::Continue
        }
    });
    count
}

/// Reachable plots on the tiled map for large step counts.
///
/// Once the frontier has left the first tile the count grows quadratically in the number of
/// whole map widths walked, so three samples one width apart pin down the polynomial.
pub fn tiled_reachable(map: &Grid, start: Pos, steps: usize) -> Result<u64> {
    let width = map.width();
    if width != map.height() {
        bail!("tiled extrapolation needs a square map, got {}x{}", width, map.height());
    }
    let rest = steps % width;
    let periods = (steps / width) as i64;
    if periods < 3 {
        return Ok(reachable(map, start, steps, true));
    }

    let [a0, a1, a2] =
        [0, 1, 2].map(|i| reachable(map, start, rest + i * width, true) as i64);
    let first = a1 - a0;
    let second = a2 - 2 * a1 + a0;
    let total = a0 + periods * first + periods * (periods - 1) / 2 * second;
    tracing::debug!(a0, a1, a2, periods, total, "extrapolated tiled garden");
    total
        .try_into()
        .with_context(|| format!("negative plot count {}", total))
}

#[tracing::instrument(skip_all)]
pub fn day21(input: &str) -> Result<(u64, u64)> {
    let map = Grid::parse(input)?;
    let start = map.find(&b'S').context("no start tile")?;

    let part1 = reachable(&map, start, STEPS, false);
    let part2 = tiled_reachable(&map, start, TILED_STEPS)?;

    Ok((part1, part2))
}

#[cfg(test)]
mod tests {
    use super::*;

    use indoc::indoc;

    const EXAMPLE: &str = indoc! {"
        ...........
        .....###.#.
        .###.##..#.
        ..#.#...#..
        ....#.#....
        .##..S####.
        .##..#...#.
        .......##..
        .##.#.####.
        .##..##.##.
        ...........
    "};

    const OPEN: &str = indoc! {"
        .....
        .....
        ..S..
        .....
        .....
    "};

    #[test]
    fn bounded_garden() -> Result<()> {
        let map = Grid::parse(EXAMPLE)?;
        let start = map.find(&b'S').context("no start")?;
        assert_eq!(reachable(&map, start, 6, false), 16);
        Ok(())
    }

    #[test]
    fn tiled_garden() -> Result<()> {
        let map = Grid::parse(EXAMPLE)?;
        let start = map.find(&b'S').context("no start")?;
        assert_eq!(reachable(&map, start, 10, true), 50);
        assert_eq!(reachable(&map, start, 50, true), 1594);
        assert_eq!(reachable(&map, start, 100, true), 6536);
        Ok(())
    }

    #[test]
    fn extrapolation_on_an_open_map() -> Result<()> {
        let map = Grid::parse(OPEN)?;
        assert_eq!(tiled_reachable(&map, (2, 2), 1000)?, 1001 * 1001);
        assert_eq!(tiled_reachable(&map, (2, 2), 12)?, 13 * 13);
        assert_eq!(day21(OPEN)?, (13, 702322399865956));
        Ok(())
    }

    #[test]
    fn non_square_map_is_rejected() -> Result<()> {
        let map = Grid::parse("..S..\n.....\n")?;
        assert!(tiled_reachable(&map, (2, 0), 1000).is_err());
        Ok(())
    }
}
