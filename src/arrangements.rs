//! Counting the arrangements of damaged springs that agree with a run-length record.

use anyhow::{anyhow, bail, Context, Result};

use crate::parse_usize_from_bytes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Spring {
    Operational,
    Damaged,
    Unknown,
}

impl TryFrom<u8> for Spring {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            b'.' => Ok(Spring::Operational),
            b'#' => Ok(Spring::Damaged),
            b'?' => Ok(Spring::Unknown),
            _ => Err(anyhow!("invalid spring {:?}", value as char)),
        }
    }
}

/// A masked row of springs plus the required lengths of its damaged runs, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub mask: Vec<Spring>,
    pub runs: Vec<usize>,
}

impl Record {
    /// Parses `???.### 1,1,3`.
    pub fn parse(line: &str) -> Result<Self> {
        let (mask, runs) = line
            .split_once(' ')
            .with_context(|| format!("missing run list in {:?}", line))?;
        let mask = mask
            .bytes()
            .map(Spring::try_from)
            .collect::<Result<Vec<_>>>()?;
        let runs = runs
            .split(',')
            .map(|run| {
                if run.is_empty() || !run.bytes().all(|b| b.is_ascii_digit()) {
                    bail!("invalid run length {:?}", run);
                }
                Ok(parse_usize_from_bytes(run.as_bytes()))
            })
            .collect::<Result<Vec<_>>>()?;
        if runs.contains(&0) {
            bail!("run lengths must be positive in {:?}", line);
        }
        Ok(Self { mask, runs })
    }

    /// Repeats the mask `copies` times joined by unknown springs, and the run list `copies` times.
    pub fn unfold(&self, copies: usize) -> Record {
        let mut mask = Vec::with_capacity((self.mask.len() + 1) * copies);
        for i in 0..copies {
            if i > 0 {
                mask.push(Spring::Unknown);
            }
            mask.extend_from_slice(&self.mask);
        }
        Record {
            mask,
            runs: self.runs.repeat(copies),
        }
    }
}

/// Memoized arrangement counter.
///
/// The memo table and the scratch mask are owned by the counter and reused between records to
/// avoid reallocation; both are reset at the start of every [`ArrangementCounter::count`].
#[derive(Debug, Default)]
pub struct ArrangementCounter {
    mask: Vec<Spring>,
    memo: Vec<Option<u64>>,
}

impl ArrangementCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&mut self, record: &Record) -> u64 {
        self.mask.clear();
        self.mask.extend_from_slice(&record.mask);
        // A trailing operational spring means a run can always be closed by the symbol after it.
        if self.mask.last() != Some(&Spring::Operational) {
            self.mask.push(Spring::Operational);
        }

        self.memo.clear();
        self.memo
            .resize((self.mask.len() + 1) * (record.runs.len() + 1), None);

        let mut search = Search {
            mask: &self.mask,
            runs: &record.runs,
            memo: &mut self.memo,
        };
        search.count(0, 0)
    }
}

struct Search<'a> {
    mask: &'a [Spring],
    runs: &'a [usize],
    memo: &'a mut [Option<u64>],
}

impl Search<'_> {
    /// Arrangements of `mask[i..]` matching `runs[j..]`.
    ///
    /// Each step places a whole run, so `(i, j)` identifies the subproblem; there is no partially
    /// consumed run to remember.
    fn count(&mut self, mut i: usize, j: usize) -> u64 {
        while self.mask.get(i) == Some(&Spring::Operational) {
            i += 1;
        }

        let Some(&len) = self.runs.get(j) else {
            let rest = self.mask.get(i..).unwrap_or_default();
            return (!rest.contains(&Spring::Damaged)).into();
        };
        if i + len >= self.mask.len() {
            return 0;
        }

        let key = i * (self.runs.len() + 1) + j;
        if let Some(total) = self.memo[key] {
            return total;
        }

        let mut total = 0;
        if self.mask[i] == Spring::Unknown {
            total += self.count(i + 1, j);
        }
        let window = &self.mask[i..i + len];
        if !window.contains(&Spring::Operational) && self.mask[i + len] != Spring::Damaged {
            total += self.count(i + len + 1, j + 1);
        }

        self.memo[key] = Some(total);
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    fn count(line: &str) -> u64 {
        let record = Record::parse(line).unwrap();
        ArrangementCounter::new().count(&record)
    }

    fn count_unfolded(line: &str) -> u64 {
        let record = Record::parse(line).unwrap().unfold(5);
        ArrangementCounter::new().count(&record)
    }

    #[test]
    fn reference_rows() {
        assert_eq!(count("???.### 1,1,3"), 1);
        assert_eq!(count(".??..??...?##. 1,1,3"), 4);
        assert_eq!(count("?#?#?#?#?#?#?#? 1,3,1,6"), 1);
        assert_eq!(count("????.#...#... 4,1,1"), 1);
        assert_eq!(count("????.######..#####. 1,6,5"), 4);
        assert_eq!(count("?###???????? 3,2,1"), 10);
    }

    #[test]
    fn unfolded_rows() {
        assert_eq!(count_unfolded("???.### 1,1,3"), 1);
        assert_eq!(count_unfolded(".??..??...?##. 1,1,3"), 16384);
        assert_eq!(count_unfolded("????.######..#####. 1,6,5"), 2500);
        assert_eq!(count_unfolded("?###???????? 3,2,1"), 506250);
    }

    #[test]
    fn edge_cases() {
        assert_eq!(count("### 3"), 1);
        assert_eq!(count("### 2"), 0);
        assert_eq!(count("#.# 1"), 0);
        assert_eq!(count("??? 4"), 0);
        assert_eq!(count("??? 1"), 3);
    }

    #[test]
    fn reused_counter_gives_the_same_answers() {
        let rows = [".??..??...?##. 1,1,3", "?###???????? 3,2,1", "???.### 1,1,3"];
        let mut counter = ArrangementCounter::new();
        let first: Vec<_> = rows
            .iter()
            .map(|row| counter.count(&Record::parse(row).unwrap()))
            .collect();
        let second: Vec<_> = rows
            .iter()
            .rev()
            .map(|row| counter.count(&Record::parse(row).unwrap()))
            .collect();
        assert_eq!(first, vec![4, 10, 1]);
        assert_eq!(second, vec![1, 10, 4]);
    }

    #[test]
    fn malformed_records() {
        assert!(Record::parse("???.###").is_err());
        assert!(Record::parse("??x 1").is_err());
        assert!(Record::parse("??? 1,,2").is_err());
        assert!(Record::parse("??? 0").is_err());
    }

    fn brute_force(record: &Record) -> u64 {
        let unknown: Vec<usize> = (0..record.mask.len())
            .filter(|&i| record.mask[i] == Spring::Unknown)
            .collect();
        let mut total = 0;
        for bits in 0u32..1 << unknown.len() {
            let mut springs = record.mask.clone();
            for (n, &i) in unknown.iter().enumerate() {
                springs[i] = if bits & (1 << n) != 0 {
                    Spring::Damaged
                } else {
                    Spring::Operational
                };
            }
            let runs: Vec<usize> = springs
                .split(|&s| s == Spring::Operational)
                .map(|run| run.len())
                .filter(|&len| len > 0)
                .collect();
            if runs == record.runs {
                total += 1;
            }
        }
        total
    }

    fn spring() -> impl Strategy<Value = Spring> {
        prop_oneof![
            Just(Spring::Operational),
            Just(Spring::Damaged),
            Just(Spring::Unknown)
        ]
    }

    proptest! {
        #[test]
        fn agrees_with_brute_force(
            mask in prop::collection::vec(spring(), 1..12),
            runs in prop::collection::vec(1usize..4, 1..4),
        ) {
            let record = Record { mask, runs };
            prop_assert_eq!(ArrangementCounter::new().count(&record), brute_force(&record));
        }
    }
}
