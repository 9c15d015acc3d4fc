use crate::conditions::{ConditionBuilder, EnumRender};
use crate::error::ConfigurationError;
use crate::model::Model;
use crate::params::{ParamDeclaration, ParamKind};
use crate::schema::ModelDef;
use crate::spec::QuerySpec;

use super::{CREATED_AT, PATTERN, UPDATED_AT, USERS};

const COLUMNS: &[&str] = &[
    "id",
    "created_at",
    "updated_at",
    "user_id",
    "target_type",
    "target_id",
    "summary",
    "comment",
];

/// Models a comment may be attached to
pub const TARGET_TYPES: &[&str] = &["Location", "Name", "Observation", "Project", "SpeciesList"];

const PARAMS: &[ParamDeclaration] = &[
    CREATED_AT,
    UPDATED_AT,
    USERS,
    ParamDeclaration::new("types", ParamKind::Enum(TARGET_TYPES)).array(),
    ParamDeclaration::new("target", ParamKind::Id),
    ParamDeclaration::new("summary_has", ParamKind::String),
    ParamDeclaration::new("content_has", ParamKind::String),
    PATTERN,
];

pub(super) static DEFINITION: ModelDef = ModelDef {
    model: Model::Comment,
    columns: COLUMNS,
    params: PARAMS,
    build,
    default_order: "created_at",
    letter_column: None,
};

fn build(spec: &QuerySpec, b: &mut ConditionBuilder<'_>) -> Result<(), ConfigurationError> {
    b.owner_and_time_stamps(spec);
    b.enums(
        spec,
        "types",
        "comments.target_type",
        TARGET_TYPES,
        EnumRender::Quoted,
    );
    b.id(spec, "target", "comments.target_id", &[]);
    b.search(spec, "summary_has", "comments.summary", &[]);
    b.search(spec, "content_has", "comments.comment", &[]);
    let searchable = b
        .dialect()
        .concat(&["comments.summary", "comments.comment"]);
    b.search(spec, "pattern", &searchable, &[]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{params, Model, Overrides, Planner};

    #[test]
    fn test_target_types_are_quoted() {
        let planner = Planner::default();
        let spec = planner
            .construct(
                Model::Comment,
                params! { "types" => vec!["Name", "Observation"], "target" => 3 },
            )
            .unwrap();
        let sql = planner.compile(&spec, &Overrides::new()).unwrap().to_sql();
        assert!(sql.contains(
            "WHERE comments.target_type IN ('Name','Observation') AND comments.target_id = 3"
        ));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let planner = Planner::default();
        assert!(
            planner
                .construct(Model::Comment, params! { "types" => "Image" })
                .is_err()
        );
    }
}
