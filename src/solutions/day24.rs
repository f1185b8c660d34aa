use anyhow::{bail, Context, Result};
use num::{BigInt, Signed, ToPrimitive, Zero};
use regex::Regex;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::equations::{EquationSystem, Outcome, Rational};

const TEST_AREA: (i64, i64) = (200_000_000_000_000, 400_000_000_000_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hailstone {
    pub position: [i64; 3],
    pub velocity: [i64; 3],
}

fn parse(input: &str) -> Result<Vec<Hailstone>> {
    // `\d` would need the unicode tables
    let number = Regex::new(r"-?[0-9]+")?;
    input
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let numbers = number
                .find_iter(line)
                .map(|m| m.as_str().parse::<i64>())
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("invalid number in {:?}", line))?;
            let &[px, py, pz, vx, vy, vz] = numbers.as_slice() else {
                bail!("expected six numbers in {:?}", line);
            };
            Ok(Hailstone {
                position: [px, py, pz],
                velocity: [vx, vy, vz],
            })
        })
        .collect()
}

/// Where the XY paths of `a` and `b` cross, ignoring crossings in the past of either stone.
fn crossing(a: &Hailstone, b: &Hailstone) -> Option<(Rational, Rational)> {
    let [ax, ay, _] = a.position.map(BigInt::from);
    let [avx, avy, _] = a.velocity.map(BigInt::from);
    let [bx, by, _] = b.position.map(BigInt::from);
    let [bvx, bvy, _] = b.velocity.map(BigInt::from);

    let det = &bvx * &avy - &avx * &bvy;
    if det.is_zero() {
        return None;
    }
    let dx = bx - &ax;
    let dy = by - &ay;
    let t = Rational::new(&bvx * &dy - &dx * &bvy, det.clone());
    let s = Rational::new(&avx * &dy - &avy * &dx, det);
    if t.is_negative() || s.is_negative() {
        return None;
    }

    let x = Rational::from_integer(ax) + &t * Rational::from_integer(avx);
    let y = Rational::from_integer(ay) + &t * Rational::from_integer(avy);
    Some((x, y))
}

/// Number of pairs whose future XY paths cross inside `[min, max]²`.
pub fn count_crossings(stones: &[Hailstone], min: i64, max: i64) -> usize {
    let min = Rational::from_integer(min.into());
    let max = Rational::from_integer(max.into());
    let inside = |v: &Rational| *v >= min && *v <= max;

    let mut count = 0;
    for (i, a) in stones.iter().enumerate() {
        for b in &stones[i + 1..] {
            if let Some((x, y)) = crossing(a, b) {
                if inside(&x) && inside(&y) {
                    count += 1;
                }
            }
        }
    }
    count
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Unknown {
    X0,
    Y0,
    Z0,
    Vz0,
    /// Time at which the rock hits the stone with this index.
    Time(usize),
}

/// Search for a rock thrown from an integer position with an integer velocity that hits every
/// hailstone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RockSearch {
    /// Candidate X and Y velocities are taken from `-velocity_bound..=velocity_bound`.
    pub velocity_bound: i64,
}

impl Default for RockSearch {
    fn default() -> Self {
        Self {
            velocity_bound: 500,
        }
    }
}

impl RockSearch {
    /// Rock velocities along `axis` that are compatible with every pair of stones sharing a
    /// velocity on that axis.
    ///
    /// Two stones moving with the same `v` keep their distance, so the rock (moving with `v0`)
    /// can only hit both if the distance is a multiple of `v - v0`.
    fn candidates(&self, stones: &[Hailstone], axis: usize) -> Vec<i64> {
        let mut by_velocity: FxHashMap<i64, Vec<i64>> = FxHashMap::default();
        for stone in stones {
            by_velocity
                .entry(stone.velocity[axis])
                .or_default()
                .push(stone.position[axis]);
        }

        (-self.velocity_bound..=self.velocity_bound)
            .filter(|&v0| {
                by_velocity.iter().all(|(&v, positions)| {
                    let first = positions[0];
                    positions[1..].iter().all(|&p| {
                        if v == v0 {
                            p == first
                        } else {
                            (p - first) % (v - v0) == 0
                        }
                    })
                })
            })
            .collect()
    }

    /// Starting position of the rock.
    pub fn find_rock(&self, stones: &[Hailstone]) -> Option<[BigInt; 3]> {
        let xs = self.candidates(stones, 0);
        let ys = self.candidates(stones, 1);
        debug!(x = xs.len(), y = ys.len(), "velocity candidates");

        for &vx0 in &xs {
            for &vy0 in &ys {
                if let Some(position) = Self::try_velocity(stones, vx0, vy0) {
                    debug!(vx0, vy0, "rock found");
                    return Some(position);
                }
            }
        }
        None
    }

    fn try_velocity(stones: &[Hailstone], vx0: i64, vy0: i64) -> Option<[BigInt; 3]> {
        let mut system = EquationSystem::new(|var: &Unknown, value: &Rational| {
            value.is_integer() && (!matches!(var, Unknown::Time(_)) || !value.is_negative())
        });

        // x0 - x_i + (vx0 - vx_i) * t_i = 0, same for y
        for (i, stone) in stones.iter().enumerate() {
            let t = Unknown::Time(i);
            system.add_equation(
                [(Unknown::X0, 1), (t, vx0 - stone.velocity[0])],
                -stone.position[0],
            );
            system.add_equation(
                [(Unknown::Y0, 1), (t, vy0 - stone.velocity[1])],
                -stone.position[1],
            );
            if system.solve() == Outcome::Impossible {
                return None;
            }
        }
        if system.solve() != Outcome::Solved {
            return None;
        }
        let x0 = system.integer(&Unknown::X0)?;
        let y0 = system.integer(&Unknown::Y0)?;

        // z0 + t_i * vz0 - z_i - t_i * vz_i = 0 for every stone whose time is known. A stone
        // that moves with the rock in XY from the same XY position leaves its time open.
        let mut open_times = Vec::new();
        for (i, stone) in stones.iter().enumerate() {
            let Some(t) = system.integer(&Unknown::Time(i)) else {
                open_times.push((i, stone));
                continue;
            };
            let constant = -(BigInt::from(stone.position[2]) + &t * stone.velocity[2]);
            system.add_equation([(Unknown::Z0, BigInt::from(1)), (Unknown::Vz0, t)], constant);
        }
        if system.solve() != Outcome::Solved {
            return None;
        }
        let z0 = system.integer(&Unknown::Z0)?;
        let vz0 = system.integer(&Unknown::Vz0)?;

        // (vz0 - vz_i) * t_i + z0 - z_i = 0
        for (i, stone) in open_times {
            system.add_equation(
                [(Unknown::Time(i), &vz0 - stone.velocity[2])],
                &z0 - stone.position[2],
            );
        }
        if system.solve() != Outcome::Solved {
            return None;
        }

        Some([x0, y0, z0])
    }
}

#[tracing::instrument(skip_all)]
pub fn day24(input: &str) -> Result<(u64, u64)> {
    let stones = parse(input)?;
    if stones.is_empty() {
        bail!("no hailstones");
    }

    let part1 = count_crossings(&stones, TEST_AREA.0, TEST_AREA.1);

    let [x0, y0, z0] = RockSearch::default()
        .find_rock(&stones)
        .context("no rock hits every hailstone")?;
    let sum = x0 + y0 + z0;
    let part2 = sum
        .to_u64()
        .with_context(|| format!("coordinate sum {} does not fit", sum))?;

    Ok((part1 as u64, part2))
}

#[cfg(test)]
mod tests {
    use super::*;

    use indoc::indoc;

    const EXAMPLE: &str = indoc! {"
        19, 13, 30 @ -2,  1, -2
        18, 19, 22 @ -1, -1, -2
        20, 25, 34 @ -2, -2, -4
        12, 31, 28 @ -1, -2, -1
        20, 19, 15 @  1, -5, -3
    "};

    #[test]
    fn test_day24() -> Result<()> {
        assert_eq!(day24(EXAMPLE)?, (0, 47));
        Ok(())
    }

    #[test]
    fn crossings_in_the_small_area() -> Result<()> {
        let stones = parse(EXAMPLE)?;
        assert_eq!(count_crossings(&stones, 7, 27), 2);
        // the first two stones meet at (14 1/3, 15 1/3)
        let (x, y) = crossing(&stones[0], &stones[1]).context("paths cross")?;
        assert_eq!(x, Rational::new(43.into(), 3.into()));
        assert_eq!(y, Rational::new(46.into(), 3.into()));
        // parallel paths
        assert_eq!(crossing(&stones[1], &stones[2]), None);
        Ok(())
    }

    #[test]
    fn rock_position() -> Result<()> {
        let stones = parse(EXAMPLE)?;
        let rock = RockSearch::default().find_rock(&stones);
        assert_eq!(rock, Some([24.into(), 13.into(), 10.into()]));
        let narrow = RockSearch { velocity_bound: 2 };
        assert_eq!(narrow.find_rock(&stones), None);
        Ok(())
    }

    #[test]
    fn stone_moving_along_with_the_rock_in_xy() -> Result<()> {
        // hit at t = 5, but only the Z axis tells when
        let stones = parse(&format!("{}24, 13, 20 @ -3, 1, 0\n", EXAMPLE))?;
        let rock = RockSearch::default().find_rock(&stones);
        assert_eq!(rock, Some([24.into(), 13.into(), 10.into()]));

        // same XY path but the Z axis never meets the rock
        let stones = parse(&format!("{}24, 13, 21 @ -3, 1, 2\n", EXAMPLE))?;
        assert_eq!(RockSearch::default().find_rock(&stones), None);
        Ok(())
    }

    #[test]
    fn malformed_hailstone() {
        assert!(parse("19, 13, 30 @ -2, 1\n").is_err());
        assert!(day24("").is_err());
    }
}
