use crate::components::insights::Task;
use crate::config::Config;
use crate::error::{other_error, AppResult, Error};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| other_error(&format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and validate the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

#[derive(Debug, Deserialize)]
struct TaskFile {
    #[serde(default)]
    tasks: Vec<Task>,
}

/// Read tasks from a TOML file with `[[tasks]]` tables
pub fn load_tasks(path: &Path) -> AppResult<Vec<Task>> {
    let content = fs::read_to_string(path)?;
    let file: TaskFile = toml::from_str(&content).map_err(Error::from)?;
    info!("Loaded {} tasks from {}", file.tasks.len(), path.display());
    Ok(file.tasks)
}
