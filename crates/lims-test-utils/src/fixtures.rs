//! Record and template fixtures

use lims_model::{
    FieldSpec, FieldType, Sample, SampleDraft, SampleId, SampleStatus, SampleType, Task, TaskId,
    ValidationRule,
};

pub fn create_sample(n: usize) -> Sample {
    Sample {
        id: SampleId::new(format!("s-{n}")),
        sample_code: format!("S{n:04}"),
        sample_name: format!("sample {n}"),
        project_id: "p-1".to_string(),
        sample_type: SampleType::PlasmidLiquid,
        status: SampleStatus::Pending,
        current_node: None,
        container_id: None,
        position: None,
        parent_sample_id: None,
        created_by: Some("tester".to_string()),
        created_at: None,
        updated_at: None,
        deleted: false,
    }
}

/// Samples `s-1 ..= s-count`
pub fn create_samples(count: usize) -> Vec<Sample> {
    (1..=count).map(create_sample).collect()
}

pub fn create_draft(name: &str) -> SampleDraft {
    SampleDraft::new(name, "p-1", SampleType::PlasmidLiquid)
}

pub fn create_drafts(names: &[&str]) -> Vec<SampleDraft> {
    names.iter().map(|name| create_draft(name)).collect()
}

pub fn create_task(n: usize) -> Task {
    Task {
        id: TaskId::new(format!("t-{n}")),
        name: format!("QC step {n}"),
        process_instance_id: format!("pi-{n}"),
        process_definition_id: "sample-flow:1".to_string(),
        task_definition_key: "qc".to_string(),
        assignee: None,
        create_time: None,
        due_date: None,
        priority: 50,
        suspended: false,
    }
}

/// Tasks `t-1 ..= t-count`
pub fn create_tasks(count: usize) -> Vec<Task> {
    (1..=count).map(create_task).collect()
}

/// Nucleic-acid QC row: two measurements, a grade, a date and a derived amount
pub fn create_measurement_template() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("concentration", FieldType::Number)
            .required()
            .with_rule(ValidationRule::new().with_min(0.0).with_max(1000.0))
            .at_order(1),
        FieldSpec::new("volume", FieldType::Number).required().at_order(2),
        FieldSpec::new("grade", FieldType::Select)
            .with_option("Pass", "pass")
            .with_option("Fail", "fail")
            .at_order(3),
        FieldSpec::new("measured_on", FieldType::Date).required().at_order(4),
        FieldSpec::new("amount", FieldType::Formula)
            .with_formula("round(concentration * volume / 660, 2)")
            .at_order(5),
    ]
}
