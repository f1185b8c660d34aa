pub mod arrangements;
pub mod corridor;
pub mod cycle;
pub mod equations;
pub mod grid;
pub mod solutions;
pub mod walker;

use std::path::Path;

use anyhow::{Context, Result};

pub use solutions::*;

/// Every day computes both parts in one go.
pub type Solution = fn(&str) -> Result<(u64, u64)>;

pub const ALL_SOLUTIONS: [(usize, Solution); 8] = [
    (10, day10),
    (12, day12),
    (14, day14),
    (16, day16),
    (17, day17),
    (21, day21),
    (23, day23),
    (24, day24),
];

/// Result is only correct if bytes represents a valid positive number without any additional
/// characters!
pub fn parse_usize_from_bytes(bytes: &[u8]) -> usize {
    let mut ret = 0;
    for b in bytes {
        ret = ret * 10 + (b - b'0') as usize;
    }
    ret
}

pub fn load_input(dir: impl AsRef<Path>, day: usize) -> Result<String> {
    let path = dir.as_ref().join(format!("{}.txt", day));
    std::fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))
}

pub fn default_input(day: usize) -> Result<String> {
    load_input("inputs", day)
}
