//! Plate geometry and the well-label codec
//!
//! Labels are one uppercase row letter followed by exactly two column digits,
//! with the column 1-based in the label and 0-based internally:
//! row 0 / col 0 is `"A01"`, row 7 / col 11 is `"H12"`.

use serde::{Deserialize, Serialize};

/// Most rows a one-letter label can address (A-Z)
pub const MAX_ROWS: usize = 26;

/// Most columns a two-digit label can address (01-99)
pub const MAX_COLS: usize = 99;

/// Position codec errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    /// Coordinate outside the plate grid
    #[error("well ({row}, {col}) is outside the {rows}x{cols} plate")]
    OutOfRange {
        /// Requested row
        row: usize,
        /// Requested column
        col: usize,
        /// Plate rows
        rows: usize,
        /// Plate columns
        cols: usize,
    },

    /// Label does not have the `<letter><2 digits>` shape
    #[error("malformed well label: '{0}'")]
    Malformed(String),

    /// Label is well-formed but addresses a well the plate does not have
    #[error("well '{label}' is outside the {rows}x{cols} plate")]
    LabelOutOfRange {
        /// Offending label
        label: String,
        /// Plate rows
        rows: usize,
        /// Plate columns
        cols: usize,
    },

    /// Geometry cannot be addressed with one-letter, two-digit labels
    #[error("unsupported plate geometry {rows}x{cols}")]
    UnsupportedGeometry {
        /// Requested rows
        rows: usize,
        /// Requested columns
        cols: usize,
    },

    /// No standard geometry has this many wells
    #[error("no standard plate holds {0} wells")]
    UnknownCapacity(usize),
}

impl PositionError {
    /// Whether the label could not be read at all
    #[inline]
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }
}

/// 0-based grid coordinate of one well
///
/// Ordering is row-major, so sorted positions walk the plate A01, A02, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WellPosition {
    /// 0-based row (A = 0)
    pub row: usize,
    /// 0-based column (01 = 0)
    pub col: usize,
}

impl WellPosition {
    /// Create new position
    #[inline]
    #[must_use]
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Row/column extent of a multi-well container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PlateGeometry {
    rows: usize,
    cols: usize,
}

impl PlateGeometry {
    /// 24-well plate (A-D x 01-06)
    pub const WELLS_24: Self = Self { rows: 4, cols: 6 };

    /// 48-well plate (A-F x 01-08)
    pub const WELLS_48: Self = Self { rows: 6, cols: 8 };

    /// Standard 96-well plate (A-H x 01-12)
    pub const STANDARD_96: Self = Self { rows: 8, cols: 12 };

    /// 384-well plate (A-P x 01-24)
    pub const WELLS_384: Self = Self { rows: 16, cols: 24 };

    /// Create geometry
    ///
    /// # Errors
    /// `PositionError::UnsupportedGeometry` when the grid is empty or
    /// cannot be labelled with one letter and two digits.
    pub fn new(rows: usize, cols: usize) -> Result<Self, PositionError> {
        if rows == 0 || cols == 0 || rows > MAX_ROWS || cols > MAX_COLS {
            return Err(PositionError::UnsupportedGeometry { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    /// Standard geometry for a container capacity
    ///
    /// # Errors
    /// `PositionError::UnknownCapacity` for non-standard well counts.
    pub fn from_capacity(capacity: usize) -> Result<Self, PositionError> {
        match capacity {
            24 => Ok(Self::WELLS_24),
            48 => Ok(Self::WELLS_48),
            96 => Ok(Self::STANDARD_96),
            384 => Ok(Self::WELLS_384),
            other => Err(PositionError::UnknownCapacity(other)),
        }
    }

    /// Number of rows
    #[inline]
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    #[inline]
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of wells
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.rows * self.cols
    }

    /// Whether the coordinate lies on this plate
    #[inline]
    #[must_use]
    pub fn contains(&self, position: WellPosition) -> bool {
        position.row < self.rows && position.col < self.cols
    }

    /// Encode a coordinate as a label
    ///
    /// # Errors
    /// `PositionError::OutOfRange` when the coordinate is not on this plate.
    pub fn encode(&self, row: usize, col: usize) -> Result<String, PositionError> {
        if !self.contains(WellPosition::new(row, col)) {
            return Err(PositionError::OutOfRange {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(format!("{}{:02}", row_letter(row), col + 1))
    }

    /// Encode a position as a label
    ///
    /// # Errors
    /// `PositionError::OutOfRange` when the position is not on this plate.
    #[inline]
    pub fn label(&self, position: WellPosition) -> Result<String, PositionError> {
        self.encode(position.row, position.col)
    }

    /// Decode a label, telling unreadable labels apart from off-plate ones
    ///
    /// # Errors
    /// - `PositionError::Malformed` unless the label is one uppercase letter
    ///   followed by exactly two ASCII digits
    /// - `PositionError::LabelOutOfRange` when it addresses a well this plate
    ///   does not have (including column `00`)
    pub fn parse(&self, label: &str) -> Result<WellPosition, PositionError> {
        let &[letter, tens, ones] = label.as_bytes() else {
            return Err(PositionError::Malformed(label.to_string()));
        };
        if !letter.is_ascii_uppercase() || !tens.is_ascii_digit() || !ones.is_ascii_digit() {
            return Err(PositionError::Malformed(label.to_string()));
        }

        let row = usize::from(letter - b'A');
        let column_number = usize::from(tens - b'0') * 10 + usize::from(ones - b'0');

        match column_number.checked_sub(1) {
            Some(col) if self.contains(WellPosition::new(row, col)) => {
                Ok(WellPosition::new(row, col))
            }
            _ => Err(PositionError::LabelOutOfRange {
                label: label.to_string(),
                rows: self.rows,
                cols: self.cols,
            }),
        }
    }

    /// Decode a label; `None` for anything unreadable or off the plate
    #[inline]
    #[must_use]
    pub fn decode(&self, label: &str) -> Option<WellPosition> {
        self.parse(label).ok()
    }

    /// Every well in row-major order
    pub fn wells(&self) -> impl Iterator<Item = WellPosition> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |row| (0..cols).map(move |col| WellPosition::new(row, col)))
    }
}

impl Default for PlateGeometry {
    fn default() -> Self {
        Self::STANDARD_96
    }
}

impl std::fmt::Display for PlateGeometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Row letter for a row index already known to be < `MAX_ROWS`
fn row_letter(row: usize) -> char {
    debug_assert!(row < MAX_ROWS);
    char::from(b'A' + (row % MAX_ROWS) as u8)
}
