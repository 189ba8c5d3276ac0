use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Name of the database holding dataset records themselves.
    pub metadata_dataset: String,
    /// Prepare the metadata database on startup.
    pub seed_on_start: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            metadata_dataset: "datasets".to_string(),
            seed_on_start: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional config file, and
    /// environment variables prefixed with "LABGRAPH_".
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = config::Config::builder();

        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        config = config.add_source(config::File::with_name("config").required(false));

        config = config.add_source(
            config::Environment::with_prefix("LABGRAPH")
                .separator("__")
                .prefix_separator("_"),
        );

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        Ok(app_config)
    }
}
