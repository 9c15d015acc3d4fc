use crate::conditions::ConditionBuilder;
use crate::error::ConfigurationError;
use crate::model::Model;
use crate::params::{ParamDeclaration, ParamKind};
use crate::schema::{LetterColumn, ModelDef};
use crate::spec::QuerySpec;

use super::{CREATED_AT, PATTERN, UPDATED_AT, USERS};

const COLUMNS: &[&str] = &[
    "id",
    "created_at",
    "updated_at",
    "user_id",
    "title",
    "summary",
    "admin_group_id",
    "user_group_id",
    "rss_log_id",
    "open_membership",
];

const PARAMS: &[ParamDeclaration] = &[
    CREATED_AT,
    UPDATED_AT,
    USERS,
    ParamDeclaration::new("title_has", ParamKind::String),
    ParamDeclaration::new("summary_has", ParamKind::String),
    ParamDeclaration::new("has_observations", ParamKind::Bool),
    ParamDeclaration::new("has_species_lists", ParamKind::Bool),
    PATTERN,
];

pub(super) static DEFINITION: ModelDef = ModelDef {
    model: Model::Project,
    columns: COLUMNS,
    params: PARAMS,
    build,
    default_order: "title",
    letter_column: Some(LetterColumn {
        column: "projects.title",
        joins: &[],
    }),
};

fn build(spec: &QuerySpec, b: &mut ConditionBuilder<'_>) -> Result<(), ConfigurationError> {
    b.owner_and_time_stamps(spec);
    b.search(spec, "title_has", "projects.title", &[]);
    b.search(spec, "summary_has", "projects.summary", &[]);
    if spec.bool("has_observations") == Some(true) {
        b.join(&["project_observations"]);
    }
    if spec.bool("has_species_lists") == Some(true) {
        b.join(&["project_species_lists"]);
    }
    let searchable = b.dialect().concat(&["projects.title", "projects.summary"]);
    b.search(spec, "pattern", &searchable, &[]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{params, Dialect, Limits, Model, Overrides, Planner};

    #[test]
    fn test_pattern_on_mysql() {
        let planner = Planner::new(Dialect::MySQL, Limits::default());
        let spec = planner
            .construct(Model::Project, params! { "pattern" => "bolete" })
            .unwrap();
        let sql = planner.compile(&spec, &Overrides::new()).unwrap().to_sql();
        assert!(
            sql.contains("CONCAT_WS(' ', projects.title, projects.summary) LIKE '%bolete%'"),
            "{sql}"
        );
    }

    #[test]
    fn test_has_observations_is_an_inner_join() {
        let planner = Planner::default();
        let spec = planner
            .construct(Model::Project, params! { "has_observations" => true })
            .unwrap();
        let sql = planner.compile(&spec, &Overrides::new()).unwrap().to_sql();
        assert!(sql.contains(
            "JOIN `project_observations` ON project_observations.project_id = projects.id"
        ));
        assert!(!sql.contains("WHERE"));
    }
}
