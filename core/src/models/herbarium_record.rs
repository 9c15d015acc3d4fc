use crate::conditions::ConditionBuilder;
use crate::error::ConfigurationError;
use crate::model::Model;
use crate::params::{ParamDeclaration, ParamKind};
use crate::schema::{LetterColumn, ModelDef};
use crate::spec::QuerySpec;

use super::{
    CREATED_AT, NOTES_HAS, OBSERVATION, OBSERVATION_QUERY, OUTER, PATTERN, UPDATED_AT, USERS,
};

const COLUMNS: &[&str] = &[
    "id",
    "created_at",
    "updated_at",
    "herbarium_id",
    "user_id",
    "initial_det",
    "accession_number",
    "notes",
];

const PARAMS: &[ParamDeclaration] = &[
    CREATED_AT,
    UPDATED_AT,
    USERS,
    ParamDeclaration::new("herbaria", ParamKind::Record(Model::Herbarium)).array(),
    ParamDeclaration::new("has_notes", ParamKind::Bool),
    NOTES_HAS,
    ParamDeclaration::new("initial_det", ParamKind::String).array(),
    ParamDeclaration::new("initial_det_has", ParamKind::String),
    ParamDeclaration::new("accession_number", ParamKind::String).array(),
    ParamDeclaration::new("accession_number_has", ParamKind::String),
    ParamDeclaration::new("observations", ParamKind::Id).array(),
    OBSERVATION,
    OUTER,
    PATTERN,
    OBSERVATION_QUERY,
];

pub(super) static DEFINITION: ModelDef = ModelDef {
    model: Model::HerbariumRecord,
    columns: COLUMNS,
    params: PARAMS,
    build,
    default_order: "herbarium_label",
    letter_column: Some(LetterColumn {
        column: "herbarium_records.initial_det",
        joins: &[],
    }),
};

fn build(spec: &QuerySpec, b: &mut ConditionBuilder<'_>) -> Result<(), ConfigurationError> {
    b.owner_and_time_stamps(spec);
    b.ids(spec, "herbaria", "herbarium_records.herbarium_id", &[]);
    b.boolean(
        spec,
        "has_notes",
        "COALESCE(herbarium_records.notes, '') != ''",
        Some("COALESCE(herbarium_records.notes, '') = ''"),
        &[],
    );
    b.search(spec, "notes_has", "herbarium_records.notes", &[]);
    b.exact(spec, "initial_det", "herbarium_records.initial_det", &[]);
    b.search(spec, "initial_det_has", "herbarium_records.initial_det", &[]);
    b.exact(
        spec,
        "accession_number",
        "herbarium_records.accession_number",
        &[],
    );
    b.search(
        spec,
        "accession_number_has",
        "herbarium_records.accession_number",
        &[],
    );
    b.ids(
        spec,
        "observations",
        "observation_herbarium_records.observation_id",
        &["observation_herbarium_records"],
    );
    b.id(
        spec,
        "observation",
        "observation_herbarium_records.observation_id",
        &["observation_herbarium_records"],
    );
    let searchable = b.dialect().concat(&[
        "herbarium_records.initial_det",
        "herbarium_records.accession_number",
        "herbarium_records.notes",
    ]);
    b.search(spec, "pattern", &searchable, &[]);
    b.subquery(
        spec,
        "observation_query",
        "herbarium_records.id",
        "observation_herbarium_records.herbarium_record_id",
        &["observation_herbarium_records"],
    )?;
    Ok(())
}
