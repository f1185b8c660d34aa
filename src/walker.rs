//! Frontier based search over implicitly defined state spaces.
//!
//! A puzzle describes its graph through [`StateSpace`] (unit steps) or [`WeightedStateSpace`]
//! (weighted steps). Successor generation is responsible for dropping moves that leave the map, so
//! the searches never see out-of-bounds states. All bookkeeping (frontier, visited set) is local to
//! one call.

use std::collections::VecDeque;
use std::hash::Hash;

use bitvec::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

pub trait StateSpace {
    type State: Clone;
    type Key: Hash + Eq;

    /// Two states with equal keys are considered the same node of the search.
    fn key(&self, state: &Self::State) -> Self::Key;

    fn successors(&self, state: &Self::State, next: &mut Vec<Self::State>);
}

pub trait WeightedStateSpace {
    type State: Clone;
    type Key: Hash + Eq;

    fn key(&self, state: &Self::State) -> Self::Key;

    /// Pushes `(successor, cost of the move)` pairs.
    fn successors(&self, state: &Self::State, next: &mut Vec<(Self::State, usize)>);
}

/// What to do after visiting a state in [`breadth_first`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Expand the state's successors.
    Continue,
    /// Keep the state but do not expand it.
    Prune,
    /// Abort the whole search.
    Stop,
}

/// Visits every state reachable from `starts` once, in non-decreasing step order.
///
/// `visit` receives each state together with its step count when it is dequeued.
pub fn breadth_first<S, I, F>(space: &S, starts: I, mut visit: F)
where
    S: StateSpace,
    I: IntoIterator<Item = S::State>,
    F: FnMut(&S::State, usize) -> Flow,
{
    let mut visited = FxHashSet::default();
    let mut frontier = VecDeque::new();
    for start in starts {
        if visited.insert(space.key(&start)) {
            frontier.push_back((start, 0));
        }
    }

    let mut next = Vec::new();
    while let Some((state, steps)) = frontier.pop_front() {
        match visit(&state, steps) {
            Flow::Continue => {}
            Flow::Prune => continue,
            Flow::Stop => return,
        }

        space.successors(&state, &mut next);
        for successor in next.drain(..) {
            if visited.insert(space.key(&successor)) {
                frontier.push_back((successor, steps + 1));
            }
        }
    }
}

/// Number of distinct positions touched by any reachable state.
///
/// States are deduplicated by [`StateSpace::key`]; `position` projects a state onto what is
/// counted. For a beam the key includes the heading while the position does not.
pub fn coverage<S, I, P, F>(space: &S, starts: I, position: F) -> usize
where
    S: StateSpace,
    I: IntoIterator<Item = S::State>,
    P: Hash + Eq,
    F: Fn(&S::State) -> P,
{
    let mut touched = FxHashSet::default();
    breadth_first(space, starts, |state, _| {
        touched.insert(position(state));
        Flow::Continue
    });
    touched.len()
}

/// Step count of the first terminal state found by a breadth-first search.
pub fn shortest<S, I, F>(space: &S, starts: I, is_terminal: F) -> Option<usize>
where
    S: StateSpace,
    I: IntoIterator<Item = S::State>,
    F: Fn(&S::State) -> bool,
{
    let mut found = None;
    breadth_first(space, starts, |state, steps| {
        if is_terminal(state) {
            found = Some(steps);
            Flow::Stop
        } else {
            Flow::Continue
        }
    });
    found
}

/// Lowest total cost of reaching a terminal state.
///
/// Costs are small integers, so the frontier is a bucket queue indexed by cost instead of a heap.
pub fn cheapest<S, I, F>(space: &S, starts: I, is_terminal: F) -> Option<usize>
where
    S: WeightedStateSpace,
    I: IntoIterator<Item = S::State>,
    F: Fn(&S::State) -> bool,
{
    let mut best: FxHashMap<S::Key, usize> = FxHashMap::default();
    let mut buckets: Vec<Vec<S::State>> = vec![Vec::new()];
    for start in starts {
        best.insert(space.key(&start), 0);
        buckets[0].push(start);
    }

    let mut next = Vec::new();
    let mut cost = 0;
    while cost < buckets.len() {
        let Some(state) = buckets[cost].pop() else {
            cost += 1;
            continue;
        };
        // Stale entry, a cheaper way to this state was queued later.
        if best.get(&space.key(&state)).is_some_and(|&c| c < cost) {
            continue;
        }
        if is_terminal(&state) {
            return Some(cost);
        }

        space.successors(&state, &mut next);
        for (successor, weight) in next.drain(..) {
            let total = cost + weight;
            let key = space.key(&successor);
            if best.get(&key).is_some_and(|&c| c <= total) {
                continue;
            }
            best.insert(key, total);
            if buckets.len() <= total {
                buckets.resize_with(total + 1, Vec::new);
            }
            buckets[total].push(successor);
        }
    }
    None
}

/// Longest simple path (in steps) from `start` to a terminal state.
///
/// Depth-first with a visited bitset per path: a position may be used again by a different path,
/// so the set is cloned whenever the path branches. Straight stretches with a single way forward
/// are walked in place without cloning. `index` maps a state to its bit in `0..bits`.
pub fn longest_path<S, I, F>(
    space: &S,
    start: S::State,
    bits: usize,
    index: I,
    is_terminal: F,
) -> Option<usize>
where
    S: StateSpace,
    I: Fn(&S::State) -> usize,
    F: Fn(&S::State) -> bool,
{
    let mut visited = bitvec![0; bits];
    visited.set(index(&start), true);
    let mut stack = vec![(start, 0, visited)];

    let mut best = None;
    let mut next = Vec::new();
    let mut open = Vec::new();
    while let Some((mut state, mut steps, mut visited)) = stack.pop() {
        loop {
            if is_terminal(&state) {
                best = best.max(Some(steps));
                break;
            }

            space.successors(&state, &mut next);
            open.clear();
            open.extend(next.drain(..).filter(|s| !visited[index(s)]));
            match open.len() {
                0 => break,
                1 => {
                    state = open.swap_remove(0);
                    visited.set(index(&state), true);
                    steps += 1;
                }
                _ => {
                    for successor in open.drain(..) {
                        let mut branch = visited.clone();
                        branch.set(index(&successor), true);
                        stack.push((successor, steps + 1, branch));
                    }
                    break;
                }
            }
        }
    }
    best
}
