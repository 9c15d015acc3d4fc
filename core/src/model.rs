//! The fixed set of queryable models.

use std::fmt;
use std::str::FromStr;

use compact_str::CompactString;
use heck::ToSnakeCase;

use crate::error::ValidationError;

/// A queryable model of the fixed schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Model {
    Observation,
    Name,
    Location,
    Image,
    User,
    Herbarium,
    HerbariumRecord,
    Sequence,
    SpeciesList,
    Project,
    Comment,
    RssLog,
}

impl Model {
    pub const ALL: [Model; 12] = [
        Model::Observation,
        Model::Name,
        Model::Location,
        Model::Image,
        Model::User,
        Model::Herbarium,
        Model::HerbariumRecord,
        Model::Sequence,
        Model::SpeciesList,
        Model::Project,
        Model::Comment,
        Model::RssLog,
    ];

    /// Model name as used in serialized descriptions
    pub const fn as_str(&self) -> &'static str {
        match self {
            Model::Observation => "Observation",
            Model::Name => "Name",
            Model::Location => "Location",
            Model::Image => "Image",
            Model::User => "User",
            Model::Herbarium => "Herbarium",
            Model::HerbariumRecord => "HerbariumRecord",
            Model::Sequence => "Sequence",
            Model::SpeciesList => "SpeciesList",
            Model::Project => "Project",
            Model::Comment => "Comment",
            Model::RssLog => "RssLog",
        }
    }

    /// Backing table
    pub const fn table(&self) -> &'static str {
        match self {
            Model::Observation => "observations",
            Model::Name => "names",
            Model::Location => "locations",
            Model::Image => "images",
            Model::User => "users",
            Model::Herbarium => "herbaria",
            Model::HerbariumRecord => "herbarium_records",
            Model::Sequence => "sequences",
            Model::SpeciesList => "species_lists",
            Model::Project => "projects",
            Model::Comment => "comments",
            Model::RssLog => "rss_logs",
        }
    }

    /// Columns that identify a row by name, tried in order. Empty for models
    /// that can only be referred to by id.
    pub const fn lookup_columns(&self) -> &'static [&'static str] {
        match self {
            Model::Name => &["search_name", "text_name"],
            Model::Location | Model::Herbarium => &["name"],
            Model::User => &["login"],
            Model::HerbariumRecord => &["accession_number"],
            Model::SpeciesList | Model::Project => &["title"],
            Model::Observation
            | Model::Image
            | Model::Sequence
            | Model::Comment
            | Model::RssLog => &[],
        }
    }

    /// Accepts the model name (`SpeciesList`) or its snake form (`species_list`).
    pub fn from_name(name: &str) -> Option<Model> {
        let snake = name.to_snake_case();
        Model::ALL
            .into_iter()
            .find(|m| m.as_str() == name || m.as_str().to_snake_case() == snake)
    }

    pub fn from_table(table: &str) -> Option<Model> {
        Model::ALL.into_iter().find(|m| m.table() == table)
    }

    /// Key under which a query on this model is nested inside another query.
    ///
    /// ```
    /// use quarry_core::Model;
    ///
    /// assert_eq!(Model::HerbariumRecord.subquery_key(), "herbarium_record_query");
    /// ```
    pub fn subquery_key(&self) -> CompactString {
        let mut key = CompactString::from(self.as_str().to_snake_case());
        key.push_str("_query");
        key
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Model {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Model::from_name(s).ok_or_else(|| ValidationError::UnknownModel(CompactString::from(s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(Model::from_name("Observation"), Some(Model::Observation));
        assert_eq!(Model::from_name("species_list"), Some(Model::SpeciesList));
        assert_eq!(Model::from_name("RssLog"), Some(Model::RssLog));
        assert_eq!(Model::from_name("Mushroom"), None);
    }

    #[test]
    fn test_from_str_unknown() {
        let err = "Fungus".parse::<Model>().unwrap_err();
        assert_eq!(err, ValidationError::UnknownModel("Fungus".into()));
    }

    #[test]
    fn test_tables_are_distinct() {
        for model in Model::ALL {
            assert_eq!(Model::from_table(model.table()), Some(model));
        }
    }
}
