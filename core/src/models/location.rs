use crate::conditions::ConditionBuilder;
use crate::error::ConfigurationError;
use crate::geo::GeoTarget;
use crate::model::Model;
use crate::params::{ParamDeclaration, ParamKind};
use crate::schema::{LetterColumn, ModelDef};
use crate::spec::QuerySpec;

use super::{CREATED_AT, NOTES_HAS, OBSERVATION_QUERY, PATTERN, UPDATED_AT, USERS};

const COLUMNS: &[&str] = &[
    "id",
    "created_at",
    "updated_at",
    "user_id",
    "name",
    "scientific_name",
    "north",
    "south",
    "east",
    "west",
    "high",
    "low",
    "notes",
    "description_id",
    "rss_log_id",
    "num_views",
    "last_view",
    "locked",
    "hidden",
    "box_area",
];

const PARAMS: &[ParamDeclaration] = &[
    CREATED_AT,
    UPDATED_AT,
    USERS,
    ParamDeclaration::new("north", ParamKind::Float),
    ParamDeclaration::new("south", ParamKind::Float),
    ParamDeclaration::new("east", ParamKind::Float),
    ParamDeclaration::new("west", ParamKind::Float),
    ParamDeclaration::new("has_observations", ParamKind::Bool),
    ParamDeclaration::new("hidden", ParamKind::Bool),
    NOTES_HAS,
    PATTERN,
    OBSERVATION_QUERY,
];

pub(super) static DEFINITION: ModelDef = ModelDef {
    model: Model::Location,
    columns: COLUMNS,
    params: PARAMS,
    build,
    default_order: "name",
    letter_column: Some(LetterColumn {
        column: "locations.name",
        joins: &[],
    }),
};

fn build(spec: &QuerySpec, b: &mut ConditionBuilder<'_>) -> Result<(), ConfigurationError> {
    b.owner_and_time_stamps(spec);
    b.bounding_box(spec, GeoTarget::Region { table: "locations" }, &[]);
    if spec.bool("has_observations") == Some(true) {
        b.join(&["observations"]);
    }
    b.boolean(
        spec,
        "hidden",
        "locations.hidden = 1",
        Some("locations.hidden = 0"),
        &[],
    );
    b.search(spec, "notes_has", "locations.notes", &[]);
    b.search(spec, "pattern", "locations.name", &[]);
    b.subquery(
        spec,
        "observation_query",
        "locations.id",
        "observations.location_id",
        &[],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{params, Model, Overrides, Planner};

    #[test]
    fn test_straddling_region_box() {
        let planner = Planner::default();
        let spec = planner
            .construct(
                Model::Location,
                params! { "north" => 10, "south" => 0, "east" => -170, "west" => 170 },
            )
            .unwrap();
        let sql = planner.compile(&spec, &Overrides::new()).unwrap().to_sql();
        assert!(sql.contains("locations.west > locations.east"), "{sql}");
        assert!(sql.contains("locations.west >= 170.0"), "{sql}");
    }
}
