use anyhow::{bail, Result};

use crate::grid::{Direction, Grid, Pos};
use crate::walker::{cheapest, WeightedStateSpace};

/// Movement limits of a crucible: every leg is between `min_run` and `max_run` tiles long and
/// ends with a 90° turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crucible {
    pub min_run: usize,
    pub max_run: usize,
}

impl Crucible {
    pub const REGULAR: Crucible = Crucible {
        min_run: 1,
        max_run: 3,
    };
    pub const ULTRA: Crucible = Crucible {
        min_run: 4,
        max_run: 10,
    };
}

/// Position plus whether the next leg has to be horizontal.
type Leg = (Pos, bool);

struct City<'a> {
    heat_loss: &'a Grid<u8>,
    crucible: Crucible,
}

impl WeightedStateSpace for City<'_> {
    type State = Leg;
    type Key = Leg;

    fn key(&self, state: &Leg) -> Leg {
        *state
    }

    fn successors(&self, &(start, horizontal): &Leg, next: &mut Vec<(Leg, usize)>) {
        for direction in Direction::ALL {
            if direction.is_horizontal() != horizontal {
                continue;
            }
            let mut pos = start;
            let mut cost = 0;
            for run in 1..=self.crucible.max_run {
                let Some(p) = self.heat_loss.neighbor(pos, direction) else {
                    break;
                };
                pos = p;
                cost += self.heat_loss[pos] as usize;
                if run >= self.crucible.min_run {
                    next.push(((pos, !horizontal), cost));
                }
            }
        }
    }
}

pub fn least_heat_loss(heat_loss: &Grid<u8>, crucible: Crucible) -> Option<usize> {
    let city = City {
        heat_loss,
        crucible,
    };
    let end = (heat_loss.width() - 1, heat_loss.height() - 1);
    let start = (0, 0);
    cheapest(&city, [(start, true), (start, false)], |&(pos, _)| pos == end)
}

#[tracing::instrument(skip_all)]
pub fn day17(input: &str) -> Result<(u64, u64)> {
    let grid = Grid::parse(input)?;
    if let Some(&c) = grid.cells().iter().find(|&&c| !(b'1'..=b'9').contains(&c)) {
        bail!("unexpected heat loss {:?}", c as char);
    }
    let heat_loss = grid.map(|&c| c - b'0');

    let mut answers = [0; 2];
    for (answer, crucible) in answers.iter_mut().zip([Crucible::REGULAR, Crucible::ULTRA]) {
        let Some(loss) = least_heat_loss(&heat_loss, crucible) else {
            bail!("no route for {:?}", crucible);
        };
        *answer = loss as u64;
    }

    Ok((answers[0], answers[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    use indoc::indoc;

    #[test]
    fn test_day17() -> Result<()> {
        let example = indoc! {"
            111111111111
            999999999991
            999999999991
            999999999991
            999999999991
        "};
        assert_eq!(day17(example)?, (59, 71));
        Ok(())
    }

    #[test]
    fn regular_crucible_on_a_small_city() -> Result<()> {
        let heat_loss = Grid::parse("19413\n11111\n91919\n")?.map(|&c| c - b'0');
        assert_eq!(least_heat_loss(&heat_loss, Crucible::REGULAR), Some(14));
        Ok(())
    }

    #[test]
    fn ultra_crucible_cannot_stop_early() -> Result<()> {
        // a 3x3 city leaves no room for legs of at least four tiles
        let heat_loss = Grid::parse("111\n111\n111\n")?.map(|&c| c - b'0');
        assert_eq!(least_heat_loss(&heat_loss, Crucible::ULTRA), None);
        assert!(day17("111\n111\n111\n").is_err());
        Ok(())
    }
}
