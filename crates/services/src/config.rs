use std::env;

/// Tree cache switch, read from `STUDY_TREE_CACHE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CatalogConfig {
    pub cache_trees: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { cache_trees: true }
    }
}

impl CatalogConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_value(env::var("STUDY_TREE_CACHE").ok().as_deref())
    }

    fn from_value(raw: Option<&str>) -> Self {
        let cache_trees = match raw.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) => !matches!(v.as_str(), "0" | "false" | "off" | "no"),
            None => true,
        };
        Self { cache_trees }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub db_url: String,
    pub catalog: CatalogConfig,
}

impl AppConfig {
    pub const DEFAULT_DB_URL: &'static str = "sqlite:study.sqlite3";

    #[must_use]
    pub fn from_env() -> Self {
        let db_url = env::var("STUDY_DB_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| Self::DEFAULT_DB_URL.into());
        Self {
            db_url,
            catalog: CatalogConfig::from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_is_on_unless_switched_off() {
        assert!(CatalogConfig::from_value(None).cache_trees);
        assert!(CatalogConfig::from_value(Some("1")).cache_trees);
        assert!(!CatalogConfig::from_value(Some(" Off ")).cache_trees);
        assert!(!CatalogConfig::from_value(Some("false")).cache_trees);
    }
}
