use std::{
    fmt::Display,
    path::PathBuf,
    time::{Duration, Instant},
};

use advent2023::{load_input, ALL_SOLUTIONS};
use anyhow::{bail, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(about = "Advent of Code 2023 solutions")]
struct Args {
    /// Directory containing one `<day>.txt` per puzzle.
    #[arg(long, default_value = "inputs")]
    input_dir: PathBuf,

    /// Only run these days; may be repeated.
    #[arg(long = "day", value_name = "N")]
    days: Vec<usize>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    if let Some(day) = args
        .days
        .iter()
        .find(|day| !ALL_SOLUTIONS.iter().any(|(n, _)| n == *day))
    {
        bail!("no solution for day {}", day);
    }

    let mut total = Duration::default();
    for (n, day) in ALL_SOLUTIONS {
        if !args.days.is_empty() && !args.days.contains(&n) {
            continue;
        }
        let input = load_input(&args.input_dir, n)?;
        total += execute_day(n, day, &input)?;
    }
    println!("Total processing time: {}", format_duration(total));
    Ok(())
}

fn format_duration(dur: Duration) -> String {
    if dur.as_millis() != 0 {
        format!("{} ms", dur.as_millis())
    } else {
        format!("{} us", dur.as_micros())
    }
}

fn execute_day<S: Display, T: Display>(
    n: usize,
    f: fn(&str) -> Result<(S, T)>,
    input: &str,
) -> Result<Duration> {
    println!("Day {}:", n);

    let start = Instant::now();
    let (part1, part2) = f(input)?;
    let elapsed = start.elapsed();

    println!("  Part 1: {}", part1);
    println!("  Part 2: {}", part2);
    println!("  Finished in {}", format_duration(elapsed));
    println!("---------------------");
    Ok(elapsed)
}
