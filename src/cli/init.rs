use crate::models::CrewConfig;
use crate::Result;
use colored::Colorize;
use std::env;
use std::path::{Path, PathBuf};

/// Write the default config into the working directory
pub fn run(force: bool) -> Result<()> {
    let project_root = env::current_dir()?;

    match write_default(&project_root, force)? {
        Some(path) => {
            println!("{}", "✓ Created default configuration".green().bold());
            println!("   {}", path.display());
            println!();
            println!("{}", "Next steps:".cyan());
            println!("   agentbus stages        # inspect the pipeline");
            println!("   agentbus run \"<brief>\" --output out");
        }
        None => {
            println!("{}", "⚠️  agentbus.toml already exists".yellow());
            println!("   Run with --force to overwrite");
        }
    }
    Ok(())
}

/// Write `agentbus.toml` with defaults; `None` when it exists and `force` is off
pub fn write_default(project_root: &Path, force: bool) -> Result<Option<PathBuf>> {
    if CrewConfig::path_in(project_root).exists() && !force {
        return Ok(None);
    }
    let path = CrewConfig::default().save(project_root)?;
    Ok(Some(path))
}
