use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

const DEFAULT_SNAPSHOT_PATH: &str = "priv/resource_snapshots";
const DEFAULT_MIGRATION_PATH: &str = "priv/";

/// Recognized configuration options (§6): `snapshot_path`, `migration_path`,
/// `quiet`, and `format`. Loaded from `migrate.toml` in the current
/// directory, with every field optional and defaulted the way §6 specifies.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub snapshot_path: String,
    pub migration_path: Option<String>,
    pub quiet: bool,
    pub format: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_path: DEFAULT_SNAPSHOT_PATH.to_owned(),
            migration_path: None,
            quiet: false,
            format: true,
        }
    }
}

impl Config {
    pub fn snapshot_dir(&self) -> &Path {
        Path::new(&self.snapshot_path)
    }

    pub fn migration_dir(&self) -> PathBuf {
        PathBuf::from(self.migration_path.as_deref().unwrap_or(DEFAULT_MIGRATION_PATH))
    }

    fn load() -> crate::error::MigrationResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("migrate").required(false))
            .add_source(config::Environment::with_prefix("MIGRATE"));
        Ok(builder.build()?.try_deserialize()?)
    }
}

pub fn get() -> &'static Config {
    &CONFIG
}

static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::load().unwrap_or_else(|err| {
        tracing::warn!("falling back to default configuration: {err}");
        Config::default()
    })
});

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = Config::default();
        assert_eq!(config.snapshot_path, "priv/resource_snapshots");
        assert_eq!(config.migration_dir(), PathBuf::from("priv/"));
        assert!(!config.quiet);
        assert!(config.format);
    }
}
