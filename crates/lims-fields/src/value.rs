//! Single-value validation

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use lims_model::{FieldSpec, FieldType, ValidationRule};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

/// Message for a pattern mismatch without a rule-supplied message
pub const FORMAT_INVALID: &str = "format invalid";

/// Result of validating one value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    /// Whether the value is acceptable
    pub valid: bool,
    /// First violation, when invalid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationOutcome {
    /// Accepted value
    #[inline]
    #[must_use]
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    /// Rejected value
    #[inline]
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
        }
    }

    /// Whether the value is acceptable
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// `None`, JSON null, or the empty string
#[must_use]
pub fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Finite number from a JSON number or a numeric string
#[must_use]
pub fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// String form used for pattern and option matching
///
/// Whole-number floats lose their fraction, so `5.0` reads as `5`.
#[must_use]
pub fn display_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{f:.0}")
            }
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Validate one value against its field type and rule
///
/// Empty values always pass; presence is checked separately by
/// [`check_required`]. Number range is checked before pattern and only the
/// first violation is reported.
#[must_use]
pub fn validate_field_value(
    value: Option<&Value>,
    field_type: FieldType,
    rule: Option<&ValidationRule>,
) -> ValidationOutcome {
    let Some(value) = value.filter(|v| !is_empty(Some(*v))) else {
        return ValidationOutcome::ok();
    };

    if field_type == FieldType::Number {
        let Some(number) = as_number(value) else {
            return ValidationOutcome::invalid("must be a valid number");
        };
        if let Some(min) = rule.and_then(|r| r.min) {
            if number < min {
                return ValidationOutcome::invalid(format!("must not be less than {min}"));
            }
        }
        if let Some(max) = rule.and_then(|r| r.max) {
            if number > max {
                return ValidationOutcome::invalid(format!("must not be greater than {max}"));
            }
        }
    }

    if let Some(rule) = rule {
        if let Some(pattern) = rule.pattern.as_deref() {
            return check_pattern(&display_form(value), pattern, rule.message.as_deref());
        }
    }

    ValidationOutcome::ok()
}

fn check_pattern(text: &str, pattern: &str, message: Option<&str>) -> ValidationOutcome {
    let anchored = match Regex::new(&format!("^(?:{pattern})$")) {
        Ok(regex) => regex,
        Err(e) => {
            tracing::warn!(pattern, error = %e, "invalid validation pattern");
            return ValidationOutcome::invalid(message.unwrap_or("validation pattern is invalid"));
        }
    };

    if anchored.is_match(text) {
        ValidationOutcome::ok()
    } else {
        ValidationOutcome::invalid(message.unwrap_or(FORMAT_INVALID))
    }
}

/// Presence check for required fields
#[must_use]
pub fn check_required(spec: &FieldSpec, value: Option<&Value>) -> ValidationOutcome {
    if spec.required && is_empty(value) {
        ValidationOutcome::invalid(format!("{} is required", spec.field_label))
    } else {
        ValidationOutcome::ok()
    }
}

/// Full check of one value against its spec
///
/// Order: required, select membership, date shape, then
/// [`validate_field_value`].
#[must_use]
pub fn validate_spec_value(spec: &FieldSpec, value: Option<&Value>) -> ValidationOutcome {
    let required = check_required(spec, value);
    if !required.valid {
        return required;
    }
    let Some(present) = value.filter(|v| !is_empty(Some(*v))) else {
        return ValidationOutcome::ok();
    };

    match spec.field_type {
        FieldType::Select if !spec.options.is_empty() => {
            let text = display_form(present);
            if !spec.options.iter().any(|option| option.value == text) {
                return ValidationOutcome::invalid(format!("'{text}' is not one of the options"));
            }
        }
        FieldType::Date => {
            if NaiveDate::parse_from_str(&display_form(present), "%Y-%m-%d").is_err() {
                return ValidationOutcome::invalid("must be a date (YYYY-MM-DD)");
            }
        }
        FieldType::Datetime => {
            let text = display_form(present);
            let parses = NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S").is_ok()
                || DateTime::parse_from_rfc3339(&text).is_ok();
            if !parses {
                return ValidationOutcome::invalid("must be a date and time (YYYY-MM-DD HH:MM:SS)");
            }
        }
        _ => {}
    }

    validate_field_value(Some(present), spec.field_type, spec.validation_rule.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn number(value: Value, rule: &ValidationRule) -> ValidationOutcome {
        validate_field_value(Some(&value), FieldType::Number, Some(rule))
    }

    #[test]
    fn empty_is_always_valid() {
        let rule = ValidationRule::new().with_min(0.0).with_pattern("x+", None);
        assert!(validate_field_value(None, FieldType::Number, Some(&rule)).valid);
        assert!(validate_field_value(Some(&Value::Null), FieldType::Number, Some(&rule)).valid);
        assert!(validate_field_value(Some(&json!("")), FieldType::Number, Some(&rule)).valid);
    }

    #[test]
    fn number_must_parse() {
        let rule = ValidationRule::new();
        assert_eq!(number(json!("abc"), &rule), ValidationOutcome::invalid("must be a valid number"));
        assert!(!number(json!("NaN"), &rule).valid);
        assert!(!number(json!("inf"), &rule).valid);
        assert!(!number(json!(true), &rule).valid);
        assert!(number(json!(" 12.5 "), &rule).valid);
        assert!(number(json!(-3), &rule).valid);
    }

    #[test]
    fn range_message_names_the_bound() {
        let rule = ValidationRule::new().with_min(0.0).with_max(10.0);
        let outcome = number(json!(50), &rule);
        assert!(!outcome.valid);
        assert_eq!(outcome.message.as_deref(), Some("must not be greater than 10"));

        let outcome = number(json!(-0.5), &rule);
        assert_eq!(outcome.message.as_deref(), Some("must not be less than 0"));

        assert!(number(json!(0), &rule).valid);
        assert!(number(json!("10"), &rule).valid);
    }

    #[test]
    fn range_is_checked_before_pattern() {
        let rule = ValidationRule::new()
            .with_max(10.0)
            .with_pattern(r"\d", Some("one digit"));
        assert_eq!(number(json!(50), &rule).message.as_deref(), Some("must not be greater than 10"));
        assert_eq!(number(json!(5.5), &rule).message.as_deref(), Some("one digit"));
        assert!(number(json!(5), &rule).valid);
    }

    #[test]
    fn pattern_must_match_fully() {
        let rule = ValidationRule::new().with_pattern("[A-Z]{2}[0-9]+", None);
        let check = |v: Value| validate_field_value(Some(&v), FieldType::Text, Some(&rule));

        assert!(check(json!("AB123")).valid);
        assert_eq!(check(json!("xAB123")).message.as_deref(), Some(FORMAT_INVALID));
        assert!(!check(json!("AB123x")).valid);

        let alternation = ValidationRule::new().with_pattern("a|b", None);
        assert!(!validate_field_value(Some(&json!("ab")), FieldType::Text, Some(&alternation)).valid);
    }

    #[test]
    fn invalid_pattern_fails_without_panicking() {
        let rule = ValidationRule::new().with_pattern("([unclosed", Some("custom"));
        let outcome = validate_field_value(Some(&json!("x")), FieldType::Text, Some(&rule));
        assert_eq!(outcome, ValidationOutcome::invalid("custom"));

        let rule = ValidationRule::new().with_pattern("([unclosed", None);
        let outcome = validate_field_value(Some(&json!("x")), FieldType::Text, Some(&rule));
        assert_eq!(outcome, ValidationOutcome::invalid("validation pattern is invalid"));
    }

    #[test]
    fn whole_number_floats_match_digit_patterns() {
        assert_eq!(display_form(&json!(5.0)), "5");
        assert_eq!(display_form(&json!(-12.0)), "-12");
        assert_eq!(display_form(&json!(5.5)), "5.5");
        assert_eq!(display_form(&json!(42)), "42");

        let rule = ValidationRule::new().with_pattern(r"\d+", None);
        assert!(number(json!(5.0), &rule).valid);
        assert!(!number(json!(5.5), &rule).valid);
    }

    #[test]
    fn spec_checks_required_options_and_dates() {
        let required = FieldSpec::new("volume", FieldType::Number).required();
        assert_eq!(
            validate_spec_value(&required, Some(&json!(""))).message.as_deref(),
            Some("volume is required")
        );

        let select = FieldSpec::new("grade", FieldType::Select)
            .with_option("Pass", "pass")
            .with_option("Fail", "fail");
        assert!(validate_spec_value(&select, Some(&json!("pass"))).valid);
        assert!(!validate_spec_value(&select, Some(&json!("Pass"))).valid);
        assert!(validate_spec_value(&select, None).valid);

        let date = FieldSpec::new("sampled_on", FieldType::Date);
        assert!(validate_spec_value(&date, Some(&json!("2026-02-25"))).valid);
        assert!(!validate_spec_value(&date, Some(&json!("2026-02-30"))).valid);

        let datetime = FieldSpec::new("measured_at", FieldType::Datetime);
        assert!(validate_spec_value(&datetime, Some(&json!("2026-02-25 08:30:00"))).valid);
        assert!(validate_spec_value(&datetime, Some(&json!("2026-02-25T08:30:00+08:00"))).valid);
        assert!(!validate_spec_value(&datetime, Some(&json!("2026-02-25"))).valid);
    }
}
