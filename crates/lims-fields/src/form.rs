//! Whole-form validation

use crate::value::validate_spec_value;
use lims_model::FieldSpec;
use serde::Serialize;
use serde_json::{Map, Value};

/// One rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    /// Field key
    pub field_name: String,
    /// Label shown to the user
    pub field_label: String,
    /// First violation
    pub message: String,
}

/// Per-field errors of one form, in display order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormReport {
    errors: Vec<FieldError>,
}

impl FormReport {
    /// Whether every field passed
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors in display order
    #[inline]
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Error for one field
    #[must_use]
    pub fn error_for(&self, field_name: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field_name == field_name)
            .map(|e| e.message.as_str())
    }
}

/// Validate every field of a form
///
/// Fields are visited in `display_order` (ties keep declaration order).
#[must_use]
pub fn validate_form(specs: &[FieldSpec], values: &Map<String, Value>) -> FormReport {
    let mut ordered: Vec<&FieldSpec> = specs.iter().collect();
    ordered.sort_by_key(|spec| spec.display_order);

    let errors: Vec<FieldError> = ordered
        .into_iter()
        .filter_map(|spec| {
            let outcome = validate_spec_value(spec, values.get(&spec.field_name));
            outcome.message.filter(|_| !outcome.valid).map(|message| FieldError {
                field_name: spec.field_name.clone(),
                field_label: spec.field_label.clone(),
                message,
            })
        })
        .collect();

    if !errors.is_empty() {
        tracing::debug!(errors = errors.len(), "form has invalid fields");
    }
    FormReport { errors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lims_model::{FieldType, ValidationRule};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn errors_follow_display_order() {
        let specs = vec![
            FieldSpec::new("b", FieldType::Number).required().at_order(2),
            FieldSpec::new("a", FieldType::Number)
                .with_rule(ValidationRule::new().with_max(10.0))
                .at_order(1),
            FieldSpec::new("c", FieldType::Text).at_order(0),
        ];
        let values = json!({"a": 50, "c": "free text"});
        let report = validate_form(&specs, values.as_object().unwrap());

        assert!(!report.is_valid());
        let names: Vec<&str> = report.errors().iter().map(|e| e.field_name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(report.error_for("b"), Some("b is required"));
        assert_eq!(report.error_for("c"), None);
    }

    #[test]
    fn clean_form_is_valid() {
        let specs = vec![FieldSpec::new("volume", FieldType::Number).required()];
        let values = json!({"volume": "20"});
        assert!(validate_form(&specs, values.as_object().unwrap()).is_valid());
    }
}
