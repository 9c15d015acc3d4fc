use crate::conditions::ConditionBuilder;
use crate::error::ConfigurationError;
use crate::model::Model;
use crate::params::{ParamDeclaration, ParamKind};
use crate::schema::{LetterColumn, ModelDef};
use crate::spec::QuerySpec;

use super::{CREATED_AT, PATTERN, UPDATED_AT};

const COLUMNS: &[&str] = &[
    "id",
    "created_at",
    "updated_at",
    "login",
    "name",
    "email",
    "contribution",
    "last_login",
    "location_id",
    "image_id",
    "verified",
    "admin",
    "notes",
];

const PARAMS: &[ParamDeclaration] = &[
    CREATED_AT,
    UPDATED_AT,
    ParamDeclaration::new("has_location", ParamKind::Bool),
    ParamDeclaration::new("has_image", ParamKind::Bool),
    ParamDeclaration::new("contribution", ParamKind::Int).range(),
    PATTERN,
];

pub(super) static DEFINITION: ModelDef = ModelDef {
    model: Model::User,
    columns: COLUMNS,
    params: PARAMS,
    build,
    default_order: "name",
    letter_column: Some(LetterColumn {
        column: "users.login",
        joins: &[],
    }),
};

fn build(spec: &QuerySpec, b: &mut ConditionBuilder<'_>) -> Result<(), ConfigurationError> {
    b.time(spec, "created_at", "users.created_at");
    b.time(spec, "updated_at", "users.updated_at");
    b.boolean(
        spec,
        "has_location",
        "users.location_id IS NOT NULL",
        Some("users.location_id IS NULL"),
        &[],
    );
    b.boolean(
        spec,
        "has_image",
        "users.image_id IS NOT NULL",
        Some("users.image_id IS NULL"),
        &[],
    );
    b.range(spec, "contribution", "users.contribution", &[]);
    let searchable = b.dialect().concat(&["users.login", "users.name"]);
    b.search(spec, "pattern", &searchable, &[]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{params, Model, Overrides, Planner};

    #[test]
    fn test_location_order_keeps_users_without_one() {
        let planner = Planner::default();
        let spec = planner
            .construct(Model::User, params! { "by" => "location" })
            .unwrap();
        let sql = planner.compile(&spec, &Overrides::new()).unwrap().to_sql();
        assert_eq!(
            sql,
            "SELECT DISTINCT users.id FROM `users` \
             LEFT OUTER JOIN `locations` ON users.location_id = locations.id \
             ORDER BY locations.name ASC, users.id DESC"
        );
    }
}
