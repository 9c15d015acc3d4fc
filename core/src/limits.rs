/// Size caps applied while validating and compiling queries.
///
/// Exceeding a cap never fails: surplus values are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Limits {
    /// Maximum number of values kept for an array parameter
    pub max_array: usize,
    /// Maximum cardinality of a rendered `IN (...)` id set
    pub max_id_set: usize,
    /// Maximum number of ids per hydration statement
    pub hydrate_batch: usize,
}

pub const DEFAULT_MAX_ARRAY: usize = 1000;

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_array: DEFAULT_MAX_ARRAY,
            max_id_set: DEFAULT_MAX_ARRAY,
            hydrate_batch: DEFAULT_MAX_ARRAY,
        }
    }
}
