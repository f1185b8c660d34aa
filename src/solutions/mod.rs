mod day10;
mod day12;
mod day14;
mod day16;
mod day17;
mod day21;
mod day23;
mod day24;

pub use day10::day10;
pub use day12::day12;
pub use day14::day14;
pub use day16::day16;
pub use day17::day17;
pub use day21::day21;
pub use day23::day23;
pub use day24::{day24, RockSearch};
