// Height grids and their plain-text file format.
// File format: one row per line, cells separated by whitespace, e.g.
//
//     0 0 0
//     0 2 0
//
// The loader and the writer are exact inverses for integer grids.
use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Why a height-map text could not be turned into a grid.
/// Line numbers are 1-based and count blank lines too.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("line {line}: `{token}` is not a number")]
    BadToken { line: usize, token: String },

    #[error("line {line}: expected {expected} values, found {found}")]
    Ragged {
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// Rectangular grid of elevations, stored row-major.
/// `height` is the row count, `width` the column count of every row.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightGrid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>, // length = width * height
}

impl<T: Copy> HeightGrid<T> {
    /// A grid with no rows at all.
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            cells: Vec::new(),
        }
    }

    /// Build a `width x height` grid by evaluating `f(x, y)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell at column `x`, row `y`. Panics when out of range, like slice indexing.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        assert!(x < self.width && y < self.height, "cell ({x}, {y}) outside grid");
        self.cells[y * self.width + x]
    }

    /// Iterate over rows in order, each as a slice of `width` cells.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.cells.chunks(self.width.max(1))
    }

    /// New grid of the same shape with `f` applied to every cell.
    pub fn map<U: Copy>(&self, f: impl FnMut(T) -> U) -> HeightGrid<U> {
        HeightGrid {
            width: self.width,
            height: self.height,
            cells: self.cells.iter().copied().map(f).collect(),
        }
    }
}

#[cfg(test)]
impl<T: Copy> HeightGrid<T> {
    /// Build from nested rows; every row must match the first one's length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> std::result::Result<Self, GridError> {
        let width = rows.first().map_or(0, Vec::len);
        let height = rows.len();
        let mut cells = Vec::with_capacity(width * height);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(GridError::Ragged {
                    line: i + 1,
                    expected: width,
                    found: row.len(),
                });
            }
            cells.extend(row);
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }
}

impl<T: Copy + From<u8>> HeightGrid<T> {
    /// Built-in 5x5 grid shown when no height map could be loaded:
    /// a small peak in the middle with four bumps around it.
    pub fn default_pattern() -> Self {
        const PATTERN: [[u8; 5]; 5] = [
            [0, 0, 0, 0, 0],
            [0, 1, 0, 1, 0],
            [0, 0, 2, 0, 0],
            [0, 1, 0, 1, 0],
            [0, 0, 0, 0, 0],
        ];
        Self::from_fn(5, 5, |x, y| T::from(PATTERN[y][x]))
    }
}

/// Parse the whitespace text format. Blank lines are skipped; any bad token
/// or ragged row rejects the whole text.
pub fn parse_height_map<T: Copy + FromStr>(text: &str) -> std::result::Result<HeightGrid<T>, GridError> {
    let mut width = None;
    let mut height = 0;
    let mut cells = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        let before = cells.len();
        for token in line.split_whitespace() {
            let value = token.parse::<T>().map_err(|_| GridError::BadToken {
                line: line_no,
                token: token.to_string(),
            })?;
            cells.push(value);
        }

        let found = cells.len() - before;
        let expected = *width.get_or_insert(found);
        if found != expected {
            return Err(GridError::Ragged {
                line: line_no,
                expected,
                found,
            });
        }
        height += 1;
    }

    Ok(HeightGrid {
        width: width.unwrap_or(0),
        height,
        cells,
    })
}

/// Load a height map file. `T` picks integer or floating-point cells.
pub fn load_height_map<T: Copy + FromStr>(path: &Path) -> Result<HeightGrid<T>> {
    let text = fs::read_to_string(path).map_err(|source| Error::MissingResource {
        path: path.to_path_buf(),
        source,
    })?;
    let grid = parse_height_map(&text).map_err(|source| Error::MalformedGrid {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), rows = grid.height(), cols = grid.width(), "height map loaded");
    Ok(grid)
}

/// Best-effort load: a missing or malformed file is reported and comes back
/// as an empty grid, so the caller can substitute its own default.
pub fn load_height_map_or_empty<T: Copy + FromStr>(path: &Path) -> Result<HeightGrid<T>> {
    match load_height_map(path) {
        Err(err) if err.is_recoverable() => {
            warn!(path = %path.display(), error = %err, "height map unavailable");
            Ok(HeightGrid::empty())
        }
        other => other,
    }
}

/// Render a grid in the text format: one line per row, single spaces between cells.
pub fn format_height_map<T: Copy + Display>(grid: &HeightGrid<T>) -> String {
    let mut out = String::new();
    if grid.is_empty() {
        return out;
    }
    for row in grid.rows() {
        let line: Vec<String> = row.iter().map(ToString::to_string).collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out
}

pub fn write_height_map<T: Copy + Display>(path: &Path, grid: &HeightGrid<T>) -> Result<()> {
    fs::write(path, format_height_map(grid)).map_err(|source| Error::WriteGrid {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), rows = grid.height(), cols = grid.width(), "height map written");
    Ok(())
}
