use crate::conditions::ConditionBuilder;
use crate::error::ConfigurationError;
use crate::model::Model;
use crate::params::{ParamDeclaration, ParamKind};
use crate::schema::ModelDef;
use crate::spec::QuerySpec;

use super::UPDATED_AT;

const COLUMNS: &[&str] = &[
    "id",
    "created_at",
    "updated_at",
    "notes",
    "location_id",
    "name_id",
    "observation_id",
    "project_id",
    "species_list_id",
];

/// Log types; `all` places no restriction
pub const LOG_TYPES: &[&str] = &[
    "all",
    "location",
    "name",
    "observation",
    "project",
    "species_list",
];

const PARAMS: &[ParamDeclaration] = &[
    UPDATED_AT,
    ParamDeclaration::new("type", ParamKind::Enum(LOG_TYPES)).array(),
];

pub(super) static DEFINITION: ModelDef = ModelDef {
    model: Model::RssLog,
    columns: COLUMNS,
    params: PARAMS,
    build,
    default_order: "updated_at",
    letter_column: None,
};

fn build(spec: &QuerySpec, b: &mut ConditionBuilder<'_>) -> Result<(), ConfigurationError> {
    b.time(spec, "updated_at", "rss_logs.updated_at");

    let types = spec.strings("type");
    if types.is_empty() || types.contains(&"all") {
        return Ok(());
    }
    let fragment = types
        .iter()
        .map(|kind| format!("rss_logs.{kind}_id IS NOT NULL"))
        .collect::<Vec<_>>()
        .join(" OR ");
    b.push(fragment, &[]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{params, Model, Overrides, Planner};

    fn sql_for(raw: crate::Params) -> String {
        let planner = Planner::default();
        let spec = planner.construct(Model::RssLog, raw).unwrap();
        planner.compile(&spec, &Overrides::new()).unwrap().to_sql()
    }

    #[test]
    fn test_types_are_ored() {
        assert_eq!(
            sql_for(params! { "type" => vec!["name", "species_list"] }),
            "SELECT DISTINCT rss_logs.id FROM `rss_logs` \
             WHERE (rss_logs.name_id IS NOT NULL OR rss_logs.species_list_id IS NOT NULL) \
             ORDER BY rss_logs.updated_at DESC, rss_logs.id DESC"
        );
    }

    #[test]
    fn test_all_is_unrestricted() {
        assert!(!sql_for(params! { "type" => vec!["all", "name"] }).contains("WHERE"));
    }
}
