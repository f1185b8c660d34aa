use anyhow::Result;
use rayon::prelude::*;

use crate::arrangements::{ArrangementCounter, Record};

const UNFOLD: usize = 5;

#[tracing::instrument(skip_all)]
pub fn day12(input: &str) -> Result<(u64, u64)> {
    let records = input
        .lines()
        .map(Record::parse)
        .collect::<Result<Vec<_>>>()?;

    // Rows are independent; every worker reuses one counter for all of its rows.
    let (part1, part2) = records
        .par_iter()
        .map_init(ArrangementCounter::new, |counter, record| {
            (counter.count(record), counter.count(&record.unfold(UNFOLD)))
        })
        .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1));

    Ok((part1, part2))
}

#[cfg(test)]
mod tests {
    use super::*;

    use indoc::indoc;

    #[test]
    fn test_day12() -> Result<()> {
        let example = indoc! {"
            ???.### 1,1,3
            .??..??...?##. 1,1,3
            ?#?#?#?#?#?#?#? 1,3,1,6
            ????.#...#... 4,1,1
            ????.######..#####. 1,6,5
            ?###???????? 3,2,1
        "};
        assert_eq!(day12(example)?, (21, 525152));
        Ok(())
    }

    #[test]
    fn malformed_row_aborts() {
        assert!(day12("???.### 1,1,3\n???.###\n").is_err());
    }
}
