//! Fast-forwarding deterministic simulations through cycle detection.

use std::hash::Hash;

use rustc_hash::FxHashMap;
use tracing::debug;

/// Remembers at which step every fingerprint was first seen.
///
/// A repeated fingerprint yields a candidate period; the period is only trusted once the next
/// repetition reports the same distance, so a fingerprint that does not capture the whole state
/// cannot fool it with a single coincidence.
#[derive(Debug)]
pub struct CycleDetector<K> {
    seen: FxHashMap<K, usize>,
    candidate: Option<usize>,
}

impl<K: Hash + Eq> Default for CycleDetector<K> {
    fn default() -> Self {
        Self {
            seen: FxHashMap::default(),
            candidate: None,
        }
    }
}

impl<K: Hash + Eq> CycleDetector<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `fingerprint` for `step` and returns the period once it is confirmed.
    pub fn observe(&mut self, fingerprint: K, step: usize) -> Option<usize> {
        let first = self.seen.insert(fingerprint, step)?;
        let period = step - first;
        if self.candidate == Some(period) {
            return Some(period);
        }
        self.candidate = Some(period);
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extrapolation {
    /// Number of times the step function actually ran.
    pub simulated: usize,
    /// Confirmed period, if the target was not reached by plain simulation first.
    pub period: Option<usize>,
}

/// Advances `state` to what it would be after `target` applications of `step`.
///
/// Once a period is confirmed at step `n`, only `(target - n) % period` further steps are run.
pub fn run_until<S, K, F, G>(state: &mut S, target: usize, mut step: F, fingerprint: G) -> Extrapolation
where
    K: Hash + Eq,
    F: FnMut(&mut S),
    G: Fn(&S) -> K,
{
    let mut detector = CycleDetector::new();
    let mut current = 0;
    while current < target {
        step(state);
        current += 1;

        if let Some(period) = detector.observe(fingerprint(state), current) {
            let remaining = (target - current) % period;
            debug!(current, period, remaining, "cycle confirmed");
            for _ in 0..remaining {
                step(state);
            }
            return Extrapolation {
                simulated: current + remaining,
                period: Some(period),
            };
        }
    }

    Extrapolation {
        simulated: current,
        period: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    /// Counts up to `warm_up`, then loops through `period` values.
    fn lasso(warm_up: usize, period: usize) -> impl Fn(&mut usize) {
        move |n| {
            *n = if *n < warm_up {
                *n + 1
            } else {
                warm_up + (*n - warm_up + 1) % period
            }
        }
    }

    fn simulate(warm_up: usize, period: usize, target: usize) -> usize {
        let step = lasso(warm_up, period);
        let mut n = 0;
        for _ in 0..target {
            step(&mut n);
        }
        n
    }

    #[test]
    fn skips_most_of_the_work() {
        let mut n = 0;
        let target = 13 + 100_000_000 * 9 + 7;
        let run = run_until(&mut n, target, lasso(13, 9), |&n| n);
        assert_eq!(n, simulate(13, 9, 13 + 7));
        assert_eq!(run.period, Some(9));
        assert!(run.simulated < 100);
    }

    #[test]
    fn short_targets_are_simulated_plainly() {
        let mut n = 0;
        let run = run_until(&mut n, 5, lasso(13, 9), |&n| n);
        assert_eq!(n, 5);
        assert_eq!(
            run,
            Extrapolation {
                simulated: 5,
                period: None
            }
        );
    }

    #[test]
    fn fixed_point() {
        let mut n = 0;
        let run = run_until(&mut n, 1000, |n: &mut u32| *n = (*n + 1).min(3), |&n| n);
        assert_eq!(n, 3);
        assert_eq!(run.period, Some(1));
    }

    #[test]
    fn coincidental_repeat_is_not_trusted() {
        let mut detector = CycleDetector::new();
        // a weak fingerprint: the value 5 shows up again after 2 steps by chance
        let fingerprints = [1, 5, 2, 5, 7, 8, 9, 7, 8, 9];
        let confirmed: Vec<_> = fingerprints
            .into_iter()
            .enumerate()
            .map(|(i, fp)| detector.observe(fp, i + 1))
            .collect();
        assert_eq!(
            confirmed,
            vec![None, None, None, None, None, None, None, None, Some(3), Some(3)]
        );
    }

    proptest! {
        #[test]
        fn matches_plain_simulation(warm_up in 0usize..30, period in 1usize..20, offset in 0usize..20) {
            let target = warm_up + 1000 * period + offset;
            let mut n = 0;
            run_until(&mut n, target, lasso(warm_up, period), |&n| n);
            prop_assert_eq!(n, simulate(warm_up, period, warm_up + offset));
        }
    }
}
