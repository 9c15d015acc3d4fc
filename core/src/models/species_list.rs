use crate::conditions::ConditionBuilder;
use crate::error::ConfigurationError;
use crate::model::Model;
use crate::params::{ParamDeclaration, ParamKind};
use crate::schema::{LetterColumn, ModelDef};
use crate::spec::QuerySpec;

use super::{CREATED_AT, NOTES_HAS, PATTERN, UPDATED_AT, USERS};

const COLUMNS: &[&str] = &[
    "id",
    "created_at",
    "updated_at",
    "user_id",
    "when",
    "where",
    "location_id",
    "title",
    "notes",
    "rss_log_id",
];

const PARAMS: &[ParamDeclaration] = &[
    CREATED_AT,
    UPDATED_AT,
    USERS,
    ParamDeclaration::new("date", ParamKind::Date).range(),
    ParamDeclaration::new("title_has", ParamKind::String),
    NOTES_HAS,
    ParamDeclaration::new("locations", ParamKind::String).array(),
    ParamDeclaration::new("projects", ParamKind::Record(Model::Project)).array(),
    ParamDeclaration::new("has_observations", ParamKind::Bool),
    PATTERN,
];

pub(super) static DEFINITION: ModelDef = ModelDef {
    model: Model::SpeciesList,
    columns: COLUMNS,
    params: PARAMS,
    build,
    default_order: "title",
    letter_column: Some(LetterColumn {
        column: "species_lists.title",
        joins: &[],
    }),
};

fn build(spec: &QuerySpec, b: &mut ConditionBuilder<'_>) -> Result<(), ConfigurationError> {
    b.owner_and_time_stamps(spec);
    b.date(spec, "date", "species_lists.`when`", &[]);
    b.search(spec, "title_has", "species_lists.title", &[]);
    b.search(spec, "notes_has", "species_lists.notes", &[]);
    b.locations(spec, "locations", "species_lists", &[]);
    b.ids(
        spec,
        "projects",
        "project_species_lists.project_id",
        &["project_species_lists"],
    );
    if spec.bool("has_observations") == Some(true) {
        b.join(&["species_list_observations"]);
    }
    let searchable = b.dialect().concat(&[
        "species_lists.title",
        "species_lists.notes",
        "species_lists.`where`",
    ]);
    b.search(spec, "pattern", &searchable, &[]);
    Ok(())
}
