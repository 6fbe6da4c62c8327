use super::{ConfigError, RowmapConfig};

/// Trait for strongly-typed configuration sections.
///
/// ```ignore
/// impl ConfigProperties for DatabaseConfig {
///     fn prefix() -> &'static str { "rowmap.database" }
///     fn from_config(config: &RowmapConfig) -> Result<Self, ConfigError> {
///         Ok(Self { url: config.get(&Self::key("url"))?, .. })
///     }
/// }
/// ```
pub trait ConfigProperties: Sized {
    /// The configuration key prefix (e.g., `"rowmap.database"`).
    fn prefix() -> &'static str;

    /// Construct from a loaded config.
    fn from_config(config: &RowmapConfig) -> Result<Self, ConfigError>;

    /// Absolute key of a property of this section.
    fn key(property: &str) -> String {
        format!("{}.{property}", Self::prefix())
    }
}
