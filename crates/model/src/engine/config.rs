use std::time::Duration;

use typed_builder::TypedBuilder;

/// Default number of levels walked below the root.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// How the engine discovers the members of each level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[derive(strum::EnumIter, strum::EnumString, strum::Display)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum TraversalStrategy {
    /// Use a bulk query when the store supports it, otherwise go level by level.
    #[default]
    Auto,
    /// One membership query per level.
    LevelByLevel,
    /// A single query for the whole reachable network. Fails if unsupported.
    Bulk,
}

/// Config of [`DownlineEngine`](super::DownlineEngine).
#[derive(Debug, Clone, TypedBuilder)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Number of levels in the report.
    #[builder(default = DEFAULT_MAX_DEPTH)]
    #[cfg_attr(feature = "serde", serde(default = "default_max_depth"))]
    pub max_depth: usize,
    /// Upper bound for each store query.
    #[builder(default, setter(strip_option))]
    #[cfg_attr(feature = "serde", serde(default))]
    pub query_timeout: Option<Duration>,
    /// Traversal strategy.
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde(default))]
    pub strategy: TraversalStrategy,
}

#[cfg(feature = "serde")]
fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
