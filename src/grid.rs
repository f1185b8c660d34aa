use std::ops::{Index, IndexMut};

use anyhow::{bail, Result};

pub type Pos = (usize, usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::East | Direction::West)
    }
}

/// Immutable-by-convention 2D array addressed by `(x, y)`.
///
/// Lookups through [`Grid::get`] and [`Grid::neighbor`] return `None` for coordinates outside the
/// grid instead of panicking, since walks probe past the border all the time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid<T = u8> {
    cells: Vec<T>,
    width: usize,
    height: usize,
}

fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

impl Grid<u8> {
    /// Parses a rectangular block of ASCII lines. A trailing newline is optional and CRLF line
    /// endings are accepted.
    pub fn parse(input: &str) -> Result<Self> {
        let bytes = input.trim_end().as_bytes();
        let first = memchr::memchr(b'\n', bytes).unwrap_or(bytes.len());
        let width = strip_cr(&bytes[..first]).len();
        if width == 0 {
            bail!("empty grid");
        }

        let mut cells = Vec::with_capacity(bytes.len());
        let mut height = 0;
        for (y, line) in bytes.split(|&b| b == b'\n').enumerate() {
            let line = strip_cr(line);
            if line.len() != width {
                bail!("row {} has width {}, expected {}", y, line.len(), width);
            }
            cells.extend_from_slice(line);
            height += 1;
        }

        Ok(Self {
            cells,
            width,
            height,
        })
    }

    /// Renders the grid back into text; handy for debugging and fingerprints.
    pub fn to_text(&self) -> String {
        self.cells
            .chunks(self.width)
            .map(|row| String::from_utf8_lossy(row).into_owned())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<T> Grid<T> {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn index_of(&self, (x, y): Pos) -> usize {
        y * self.width + x
    }

    pub fn pos_of(&self, index: usize) -> Pos {
        (index % self.width, index / self.width)
    }

    pub fn get(&self, x: isize, y: isize) -> Option<&T> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(&self.cells[y as usize * self.width + x as usize])
    }

    /// Lookup on the infinite plane formed by tiling the grid.
    pub fn get_wrapped(&self, x: i64, y: i64) -> &T {
        let x = x.rem_euclid(self.width as i64) as usize;
        let y = y.rem_euclid(self.height as i64) as usize;
        &self.cells[y * self.width + x]
    }

    pub fn neighbor(&self, (x, y): Pos, direction: Direction) -> Option<Pos> {
        let (dx, dy) = direction.offset();
        let nx = x.checked_add_signed(dx)?;
        let ny = y.checked_add_signed(dy)?;
        (nx < self.width && ny < self.height).then_some((nx, ny))
    }

    pub fn neighbors(&self, pos: Pos) -> impl Iterator<Item = (Direction, Pos)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |d| self.neighbor(pos, d).map(|p| (d, p)))
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> {
        let width = self.width;
        (0..self.cells.len()).map(move |i| (i % width, i / width))
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            cells: self.cells.iter().map(f).collect(),
            width: self.width,
            height: self.height,
        }
    }
}

impl<T: PartialEq> Grid<T> {
    pub fn find(&self, needle: &T) -> Option<Pos> {
        self.cells
            .iter()
            .position(|c| c == needle)
            .map(|i| self.pos_of(i))
    }
}

impl<T> Index<Pos> for Grid<T> {
    type Output = T;

    fn index(&self, (x, y): Pos) -> &T {
        &self.cells[y * self.width + x]
    }
}

impl<T> IndexMut<Pos> for Grid<T> {
    fn index_mut(&mut self, (x, y): Pos) -> &mut T {
        &mut self.cells[y * self.width + x]
    }
}
