use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use config::builder::DefaultState;
use minibot_world::SimulatorConfig;
use serde::Deserialize;
use tracing::{error, info};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
const ENV_PREFIX: &str = "MINIBOT";

/// Top-level configuration of the rollout runner.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub simulator: SimulatorConfig,
    /// Built-in map indices to use; all maps when absent.
    pub maps: Option<Vec<usize>>,
    pub rollout: RolloutConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RolloutConfig {
    pub workers: usize,
    pub episodes_per_worker: usize,
    pub max_steps: usize,
    pub seed: u64,
}

impl Default for RolloutConfig {
    fn default() -> Self {
        RolloutConfig {
            workers: 4,
            episodes_per_worker: 25,
            max_steps: 200,
            seed: 7,
        }
    }
}

/// Loads `path` (TOML, required), overridden by `MINIBOT_*` environment
/// variables, e.g. `MINIBOT_ROLLOUT__WORKERS=8`.
pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    info!("Attempting to load configuration from {}", path);

    let builder = Config::builder()
        .add_source(File::new(path, FileFormat::Toml).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("maps"),
        );

    match deserialize(builder) {
        Ok(config) => {
            info!("Successfully loaded configuration: {:?}", config);
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}

fn deserialize(builder: ConfigBuilder<DefaultState>) -> Result<AppConfig, ConfigError> {
    builder.build()?.try_deserialize::<AppConfig>()
}
