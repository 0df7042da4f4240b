//! LIMS Plate
//!
//! Well addressing for multi-well containers.
//!
//! # Overview
//!
//! - **PlateGeometry**: row/column extent of a container (96-well by default)
//! - **WellPosition**: 0-based grid coordinate, encoded as labels like `"A01"`
//! - **PlateLayout**: which sample occupies which well
//!
//! Decoding distinguishes a label that cannot be read at all from one that
//! reads fine but falls outside the plate; both are rejected before use.
//!
//! # Example
//!
//! ```rust
//! use lims_plate::{PlateGeometry, WellPosition};
//!
//! let plate = PlateGeometry::STANDARD_96;
//!
//! let label = plate.encode(1, 2).unwrap();
//! assert_eq!(label, "B03");
//! assert_eq!(plate.decode("B03"), Some(WellPosition::new(1, 2)));
//!
//! // Readable but outside the 8x12 grid
//! assert_eq!(plate.decode("I01"), None);
//! ```

#![warn(missing_docs)]

pub mod geometry;
pub mod layout;

// Re-exports
pub use geometry::{PlateGeometry, PositionError, WellPosition};
pub use layout::{LayoutError, PlateLayout, WellState};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
