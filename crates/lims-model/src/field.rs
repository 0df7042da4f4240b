//! Field definitions declared by workflow-node templates

use serde::{Deserialize, Serialize};

/// Declared type of a node field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Single-line text
    Text,
    /// Numeric measurement
    Number,
    /// Calendar date
    Date,
    /// Date and time
    Datetime,
    /// One of a fixed option list
    Select,
    /// Multi-line text
    Textarea,
    /// Derived from other fields through a formula
    Formula,
}

impl FieldType {
    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::Select => "select",
            Self::Textarea => "textarea",
            Self::Formula => "formula",
        }
    }

    /// Whether values are computed rather than entered
    #[inline]
    #[must_use]
    pub fn is_derived(&self) -> bool {
        matches!(self, Self::Formula)
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "number" => Ok(Self::Number),
            "date" => Ok(Self::Date),
            "datetime" => Ok(Self::Datetime),
            "select" => Ok(Self::Select),
            "textarea" => Ok(Self::Textarea),
            "formula" => Ok(Self::Formula),
            other => Err(format!("unknown field type: {other}")),
        }
    }
}

/// Constraint set attached to a field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    /// Inclusive lower bound (number fields)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Inclusive upper bound (number fields)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Regex the whole string form must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Message shown when the pattern does not match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationRule {
    /// Empty rule
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With inclusive lower bound
    #[inline]
    #[must_use]
    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// With inclusive upper bound
    #[inline]
    #[must_use]
    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// With pattern and optional custom message
    #[inline]
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>, message: Option<&str>) -> Self {
        self.pattern = Some(pattern.into());
        self.message = message.map(str::to_string);
        self
    }
}

/// One selectable option of a `select` field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    /// Display label
    pub label: String,
    /// Stored value
    pub value: String,
}

/// Definition of one field of a workflow node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    /// Machine name, also the variable name formulas refer to
    pub field_name: String,
    /// Display label
    #[serde(default)]
    pub field_label: String,
    /// Declared type
    pub field_type: FieldType,
    /// Measurement unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Whether a value must be entered
    #[serde(default)]
    pub required: bool,
    /// Pre-filled value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Constraints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_rule: Option<ValidationRule>,
    /// Expression for `formula` fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    /// Options for `select` fields
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    /// Position in the entry form
    #[serde(default)]
    pub display_order: i32,
}

impl FieldSpec {
    /// Create new field spec
    #[inline]
    #[must_use]
    pub fn new(field_name: impl Into<String>, field_type: FieldType) -> Self {
        let field_name = field_name.into();
        Self {
            field_label: field_name.clone(),
            field_name,
            field_type,
            unit: None,
            required: false,
            default_value: None,
            validation_rule: None,
            formula: None,
            options: Vec::new(),
            display_order: 0,
        }
    }

    /// Mark as required
    #[inline]
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// With validation rule
    #[inline]
    #[must_use]
    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.validation_rule = Some(rule);
        self
    }

    /// With formula expression
    #[inline]
    #[must_use]
    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = Some(formula.into());
        self
    }

    /// With select option
    #[inline]
    #[must_use]
    pub fn with_option(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push(FieldOption {
            label: label.into(),
            value: value.into(),
        });
        self
    }

    /// With display order
    #[inline]
    #[must_use]
    pub fn at_order(mut self, display_order: i32) -> Self {
        self.display_order = display_order;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_spec_decodes_template_json() {
        let json = r#"{
            "fieldName": "concentration",
            "fieldLabel": "Concentration",
            "fieldType": "number",
            "unit": "ng/uL",
            "required": true,
            "validationRule": {"min": 0, "max": 1000},
            "displayOrder": 2
        }"#;

        let spec: FieldSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.field_type, FieldType::Number);
        assert!(spec.required);
        let rule = spec.validation_rule.unwrap();
        assert_eq!(rule.min, Some(0.0));
        assert_eq!(rule.max, Some(1000.0));
        assert!(rule.pattern.is_none());
    }

    #[test]
    fn field_type_parses_wire_names() {
        assert_eq!("formula".parse::<FieldType>(), Ok(FieldType::Formula));
        assert!("checkbox".parse::<FieldType>().is_err());
        assert!(FieldType::Formula.is_derived());
        assert!(!FieldType::Number.is_derived());
    }
}
