use super::{ConfigError, ConfigProperties, RowmapConfig};

/// Connection parameters, supplied once at process start.
///
/// ```yaml
/// rowmap:
///   database:
///     url: "sqlite://catalog.db"
///     user: "SYSDBA"
///     password: "masterkey"
///     dialect: "sqlite"
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub url: String,
    pub user: String,
    pub password: String,
    /// SQL dialect name, parsed by the data layer.
    pub dialect: String,
    /// Create the database file when it doesn't exist (file-based backends).
    pub create_if_missing: bool,
}

pub const DEFAULT_USER: &str = "SYSDBA";
pub const DEFAULT_PASSWORD: &str = "masterkey";
pub const DEFAULT_DIALECT: &str = "sqlite";

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user: DEFAULT_USER.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            dialect: DEFAULT_DIALECT.to_string(),
            create_if_missing: true,
        }
    }

    /// `url` with the credentials spliced in as userinfo.
    ///
    /// URLs without an authority (`sqlite::memory:`, `sqlite:catalog.db`) and
    /// URLs already carrying a userinfo part are returned unchanged.
    pub fn connect_url(&self) -> String {
        let Some((scheme, rest)) = self.url.split_once("://") else {
            return self.url.clone();
        };
        if scheme == "sqlite" || rest.is_empty() || rest.starts_with('/') {
            return self.url.clone();
        }
        let authority = rest.split('/').next().unwrap_or(rest);
        if authority.contains('@') {
            return self.url.clone();
        }
        format!("{scheme}://{}:{}@{rest}", self.user, self.password)
    }
}

impl ConfigProperties for DatabaseConfig {
    fn prefix() -> &'static str {
        "rowmap.database"
    }

    fn from_config(config: &RowmapConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            url: config.get(&Self::key("url"))?,
            user: config.get_or(&Self::key("user"), DEFAULT_USER.to_string())?,
            password: config.get_or(&Self::key("password"), DEFAULT_PASSWORD.to_string())?,
            dialect: config.get_or(&Self::key("dialect"), DEFAULT_DIALECT.to_string())?,
            create_if_missing: config.get_or(&Self::key("create_if_missing"), true)?,
        })
    }
}
