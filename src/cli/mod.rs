pub mod init;
pub mod run;
pub mod stages;

use crate::models::CrewConfig;
use crate::Result;
use std::path::Path;

/// Load the config at `path`, or `agentbus.toml` in the working directory
pub fn load_config(path: Option<&Path>) -> Result<CrewConfig> {
    match path {
        Some(path) => CrewConfig::load_file(path),
        None => CrewConfig::load(&std::env::current_dir()?),
    }
}
