//! Well occupancy for one container
//!
//! Tracks which sample sits in which well so that allocation can reject
//! occupied, off-plate or unreadable positions before a request is sent.

use crate::geometry::{PlateGeometry, PositionError, WellPosition};
use std::collections::BTreeMap;

/// Occupancy of one well
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WellState {
    /// Nothing allocated
    Empty,
    /// Holds a sample
    Used {
        /// Occupying sample
        sample_id: String,
    },
    /// Holds a sample flagged as abnormal
    Exception {
        /// Occupying sample
        sample_id: String,
        /// Why it was flagged
        note: String,
    },
}

impl WellState {
    /// Occupying sample, if any
    #[inline]
    #[must_use]
    pub fn sample_id(&self) -> Option<&str> {
        match self {
            Self::Empty => None,
            Self::Used { sample_id } | Self::Exception { sample_id, .. } => Some(sample_id),
        }
    }

    fn glyph(&self) -> char {
        match self {
            Self::Empty => '.',
            Self::Used { .. } => '#',
            Self::Exception { .. } => '!',
        }
    }
}

/// Occupancy errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// Label could not be resolved to a well on this plate
    #[error(transparent)]
    Position(#[from] PositionError),

    /// Well already holds a sample
    #[error("well {label} is occupied by {occupant}")]
    Occupied {
        /// Well label
        label: String,
        /// Current occupant
        occupant: String,
    },

    /// Well holds nothing
    #[error("well {0} is empty")]
    Vacant(String),
}

/// Occupancy map of one plate
#[derive(Debug, Clone)]
pub struct PlateLayout {
    geometry: PlateGeometry,
    wells: BTreeMap<WellPosition, WellState>,
}

impl PlateLayout {
    /// Create empty layout
    #[inline]
    #[must_use]
    pub fn new(geometry: PlateGeometry) -> Self {
        Self {
            geometry,
            wells: BTreeMap::new(),
        }
    }

    /// Plate geometry
    #[inline]
    #[must_use]
    pub fn geometry(&self) -> PlateGeometry {
        self.geometry
    }

    /// Occupancy of the well at `label`
    ///
    /// # Errors
    /// `LayoutError::Position` when the label is unreadable or off-plate.
    pub fn state(&self, label: &str) -> Result<&WellState, LayoutError> {
        let position = self.geometry.parse(label)?;
        Ok(self.wells.get(&position).unwrap_or(&WellState::Empty))
    }

    /// Place a sample into an empty well
    ///
    /// # Errors
    /// - `LayoutError::Position` for unreadable or off-plate labels
    /// - `LayoutError::Occupied` when the well already holds a sample
    pub fn allocate(
        &mut self,
        label: &str,
        sample_id: impl Into<String>,
    ) -> Result<WellPosition, LayoutError> {
        let position = self.geometry.parse(label)?;
        if let Some(occupant) = self.wells.get(&position).and_then(WellState::sample_id) {
            return Err(LayoutError::Occupied {
                label: label.to_string(),
                occupant: occupant.to_string(),
            });
        }

        let sample_id = sample_id.into();
        tracing::debug!(well = label, sample = %sample_id, "allocated well");
        self.wells.insert(position, WellState::Used { sample_id });
        Ok(position)
    }

    /// Empty a well, returning the sample that was in it
    ///
    /// # Errors
    /// - `LayoutError::Position` for unreadable or off-plate labels
    /// - `LayoutError::Vacant` when the well holds nothing
    pub fn release(&mut self, label: &str) -> Result<String, LayoutError> {
        let position = self.geometry.parse(label)?;
        match self.wells.remove(&position) {
            Some(WellState::Used { sample_id } | WellState::Exception { sample_id, .. }) => {
                tracing::debug!(well = label, sample = %sample_id, "released well");
                Ok(sample_id)
            }
            Some(WellState::Empty) | None => Err(LayoutError::Vacant(label.to_string())),
        }
    }

    /// Flag the sample in a well as abnormal
    ///
    /// # Errors
    /// - `LayoutError::Position` for unreadable or off-plate labels
    /// - `LayoutError::Vacant` when the well holds nothing
    pub fn mark_exception(&mut self, label: &str, note: impl Into<String>) -> Result<(), LayoutError> {
        let position = self.geometry.parse(label)?;
        let sample_id = self
            .wells
            .get(&position)
            .and_then(WellState::sample_id)
            .map(str::to_string)
            .ok_or_else(|| LayoutError::Vacant(label.to_string()))?;

        self.wells.insert(
            position,
            WellState::Exception {
                sample_id,
                note: note.into(),
            },
        );
        Ok(())
    }

    /// First empty well in row-major order
    #[must_use]
    pub fn next_free(&self) -> Option<WellPosition> {
        self.geometry
            .wells()
            .find(|position| !self.wells.contains_key(position))
    }

    /// Number of occupied wells
    #[inline]
    #[must_use]
    pub fn used_count(&self) -> usize {
        self.wells.len()
    }

    /// Number of empty wells
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.geometry.capacity() - self.wells.len()
    }

    /// Occupied wells in row-major order
    pub fn occupied(&self) -> impl Iterator<Item = (WellPosition, &WellState)> {
        self.wells.iter().map(|(position, state)| (*position, state))
    }

    /// Text grid: `.` empty, `#` used, `!` exception
    #[must_use]
    pub fn render_grid(&self) -> String {
        let mut out = String::from("  ");
        for col in 1..=self.geometry.cols() {
            out.push_str(&format!(" {col:02}"));
        }
        out.push('\n');

        for row in 0..self.geometry.rows() {
            out.push(char::from(b'A' + row as u8));
            out.push(' ');
            for col in 0..self.geometry.cols() {
                let glyph = self
                    .wells
                    .get(&WellPosition::new(row, col))
                    .map_or('.', WellState::glyph);
                out.push_str("  ");
                out.push(glyph);
            }
            out.push('\n');
        }
        out
    }
}

impl Default for PlateLayout {
    fn default() -> Self {
        Self::new(PlateGeometry::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn allocate_and_release() {
        let mut layout = PlateLayout::default();

        let position = layout.allocate("B03", "s-1").unwrap();
        assert_eq!(position, WellPosition::new(1, 2));
        assert_eq!(layout.used_count(), 1);
        assert_eq!(layout.free_count(), 95);
        assert_eq!(layout.state("B03").unwrap().sample_id(), Some("s-1"));

        assert_eq!(layout.release("B03").unwrap(), "s-1");
        assert_eq!(layout.state("B03").unwrap(), &WellState::Empty);
        assert_eq!(layout.release("B03"), Err(LayoutError::Vacant("B03".to_string())));
    }

    #[test]
    fn allocate_rejects_occupied_and_bad_labels() {
        let mut layout = PlateLayout::default();
        layout.allocate("A01", "s-1").unwrap();

        assert_eq!(
            layout.allocate("A01", "s-2"),
            Err(LayoutError::Occupied {
                label: "A01".to_string(),
                occupant: "s-1".to_string()
            })
        );
        assert!(matches!(
            layout.allocate("a01", "s-2"),
            Err(LayoutError::Position(PositionError::Malformed(_)))
        ));
        assert!(matches!(
            layout.allocate("J01", "s-2"),
            Err(LayoutError::Position(PositionError::LabelOutOfRange { .. }))
        ));
        assert_eq!(layout.used_count(), 1);
    }

    #[test]
    fn next_free_walks_row_major() {
        let mut layout = PlateLayout::new(PlateGeometry::WELLS_24);
        assert_eq!(layout.next_free(), Some(WellPosition::new(0, 0)));

        for label in ["A01", "A02", "A03"] {
            layout.allocate(label, label).unwrap();
        }
        assert_eq!(layout.next_free(), Some(WellPosition::new(0, 3)));

        for position in PlateGeometry::WELLS_24.wells() {
            let label = PlateGeometry::WELLS_24.label(position).unwrap();
            let _ = layout.allocate(&label, "filler");
        }
        assert_eq!(layout.next_free(), None);
        assert_eq!(layout.free_count(), 0);
    }

    #[test]
    fn exception_keeps_occupant() {
        let mut layout = PlateLayout::default();
        layout.allocate("C07", "s-9").unwrap();
        layout.mark_exception("C07", "hemolysed").unwrap();

        assert!(matches!(
            layout.state("C07").unwrap(),
            WellState::Exception { sample_id, note } if sample_id == "s-9" && note == "hemolysed"
        ));
        assert_eq!(layout.release("C07").unwrap(), "s-9");
        assert!(layout.mark_exception("C07", "x").is_err());
    }

    #[test]
    fn grid_marks_occupancy() {
        let mut layout = PlateLayout::new(PlateGeometry::WELLS_24);
        layout.allocate("A01", "s-1").unwrap();
        layout.allocate("B02", "s-2").unwrap();
        layout.mark_exception("B02", "bubble").unwrap();

        let grid = layout.render_grid();
        let lines: Vec<&str> = grid.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "   01 02 03 04 05 06");
        assert_eq!(lines[1], "A   #  .  .  .  .  .");
        assert_eq!(lines[2], "B   .  !  .  .  .  .");
    }
}
