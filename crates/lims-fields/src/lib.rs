//! LIMS Fields
//!
//! Validation of values entered against node-template field specs.
//!
//! # Overview
//!
//! - [`validate_field_value`]: type and rule check for one value; empty
//!   values pass, number range is checked before pattern, first violation wins
//! - [`check_required`] / [`validate_spec_value`]: the presence, option and
//!   date checks the entry form layers on top
//! - [`validate_form`]: every field of one measurement row
//! - [`compute_derived_fields`]: formula fields through the
//!   [`lims_formula::FormulaSandbox`]
//!
//! Nothing here panics or holds state.
//!
//! # Example
//!
//! ```rust
//! use lims_fields::validate_field_value;
//! use lims_model::{FieldType, ValidationRule};
//! use serde_json::json;
//!
//! let rule = ValidationRule::new().with_min(0.0).with_max(10.0);
//!
//! let outcome = validate_field_value(Some(&json!(50)), FieldType::Number, Some(&rule));
//! assert!(!outcome.valid);
//! assert!(outcome.message.unwrap().contains("10"));
//!
//! assert!(validate_field_value(Some(&json!("")), FieldType::Number, Some(&rule)).valid);
//! ```

#![warn(missing_docs)]

pub mod derived;
pub mod form;
pub mod value;

// Re-exports
pub use derived::compute_derived_fields;
pub use form::{validate_form, FieldError, FormReport};
pub use value::{
    as_number, check_required, is_empty, validate_field_value, validate_spec_value,
    ValidationOutcome, FORMAT_INVALID,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
