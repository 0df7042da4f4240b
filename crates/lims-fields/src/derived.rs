//! Derived (formula) field computation

use crate::value::as_number;
use lims_formula::{FormulaError, FormulaSandbox};
use lims_model::{FieldSpec, FieldType};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// Evaluate every formula field of a form
///
/// Variables are the numeric values of the other fields, bound by field
/// name and also by label when no field uses that label as its name.
/// Formula fields run in display order and each success is bound for the
/// ones after it, so a formula may build on an earlier derived value.
#[must_use]
pub fn compute_derived_fields(
    specs: &[FieldSpec],
    values: &Map<String, Value>,
    sandbox: &FormulaSandbox,
) -> BTreeMap<String, Result<f64, FormulaError>> {
    let mut variables: HashMap<String, f64> = HashMap::new();
    for spec in specs.iter().filter(|s| !s.field_type.is_derived()) {
        if let Some(number) = values.get(&spec.field_name).and_then(as_number) {
            variables.insert(spec.field_name.clone(), number);
        }
    }
    for spec in specs.iter().filter(|s| !s.field_type.is_derived()) {
        if let Some(number) = variables.get(&spec.field_name).copied() {
            variables.entry(spec.field_label.clone()).or_insert(number);
        }
    }

    let mut formulas: Vec<&FieldSpec> = specs
        .iter()
        .filter(|s| s.field_type == FieldType::Formula)
        .collect();
    formulas.sort_by_key(|spec| spec.display_order);

    let mut results = BTreeMap::new();
    for spec in formulas {
        let result = sandbox.evaluate(spec.formula.as_deref().unwrap_or_default(), &variables);
        if let Ok(value) = result {
            variables.insert(spec.field_name.clone(), value);
        }
        results.insert(spec.field_name.clone(), result);
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use lims_formula::FormulaErrorKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn specs() -> Vec<FieldSpec> {
        let mut concentration = FieldSpec::new("concentration", FieldType::Number);
        concentration.field_label = "浓度".into();
        vec![
            concentration,
            FieldSpec::new("volume", FieldType::Number),
            FieldSpec::new("mass", FieldType::Formula)
                .with_formula("round(浓度 * volume / 1000, 3)")
                .at_order(1),
            FieldSpec::new("half_mass", FieldType::Formula)
                .with_formula("mass / 2")
                .at_order(2),
            FieldSpec::new("bad", FieldType::Formula).with_formula("exec(volume)"),
        ]
    }

    #[test]
    fn formulas_see_values_and_earlier_results() {
        let values = json!({"concentration": "125.5", "volume": 20});
        let results = compute_derived_fields(&specs(), values.as_object().unwrap(), &FormulaSandbox::new());

        assert_eq!(results["mass"], Ok(2.51));
        assert_eq!(results["half_mass"], Ok(1.255));
        assert_eq!(
            results["bad"].as_ref().unwrap_err().kind(),
            FormulaErrorKind::DisallowedFunction
        );
    }

    #[test]
    fn missing_inputs_surface_per_field() {
        let values = json!({"volume": 20});
        let results = compute_derived_fields(&specs(), values.as_object().unwrap(), &FormulaSandbox::new());

        assert_eq!(
            results["mass"].as_ref().unwrap_err().kind(),
            FormulaErrorKind::UnresolvedVariable
        );
        assert_eq!(
            results["half_mass"].as_ref().unwrap_err().kind(),
            FormulaErrorKind::UnresolvedVariable
        );
    }
}
