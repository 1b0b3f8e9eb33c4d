use crate::bus::MessageBus;
use crate::models::{Backend, LlmConfig, RunOverrides};
use crate::orchestrator::pipeline::{TOPIC_HTML, TOPIC_PAGE_SPEC, TOPIC_PLAN, TOPIC_PRD, TOPIC_TASKS};
use crate::orchestrator::{CliGenerator, Generator, PipelineRunner};
use crate::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const HTML_FILE: &str = "index.html";
pub const MESSAGES_FILE: &str = "messages.json";

/// Options of one `agentbus run` invocation
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub brief: Option<String>,
    pub file: Option<PathBuf>,
    pub overrides: RunOverrides,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

pub async fn run(args: RunArgs) -> Result<()> {
    let config = super::load_config(args.config.as_deref())?;
    let brief = resolve_brief(args.brief.as_deref(), args.file.as_deref())?;
    let generator = build_generator(&config.llm)?;

    let mut bus = MessageBus::new();
    for topic in [TOPIC_TASKS, TOPIC_PRD, TOPIC_PAGE_SPEC, TOPIC_PLAN, TOPIC_HTML] {
        bus.subscribe(topic, |message| {
            println!(
                "   {} {} → {}",
                "✓".green(),
                message.sender.bold(),
                message.topic.cyan()
            );
        });
    }

    println!("{}", "🚀 Running pipeline...".cyan().bold());
    let mut runner = PipelineRunner::from_config(bus, generator, &config);
    let html = runner.run_with(&brief, args.overrides).await?;

    match &args.output {
        Some(dir) => {
            let (html_path, messages_path) = write_outputs(dir, &html, runner.bus())?;
            println!();
            println!("{}", "✅ Page generated".green().bold());
            println!("   {}", html_path.display());
            println!("   {}", messages_path.display());
        }
        None => {
            println!();
            println!("{}", html);
        }
    }
    Ok(())
}

/// Brief from the positional argument, or from `--file`
pub fn resolve_brief(brief: Option<&str>, file: Option<&Path>) -> Result<String> {
    let brief = match (brief, file) {
        (Some(text), None) => text.to_string(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read brief from {}", path.display()))?,
        (Some(_), Some(_)) => anyhow::bail!("Pass the brief either inline or with --file, not both"),
        (None, None) => anyhow::bail!("No brief given (pass it inline or with --file)"),
    };

    if brief.trim().is_empty() {
        anyhow::bail!("Brief is empty");
    }
    Ok(brief)
}

/// Generator for the configured backend
pub fn build_generator(config: &LlmConfig) -> Result<Arc<dyn Generator>> {
    match config.backend {
        Backend::Cli => Ok(Arc::new(CliGenerator::new(config.clone()))),
        #[cfg(feature = "api-direct")]
        Backend::Http => Ok(Arc::new(crate::orchestrator::HttpGenerator::new(
            config.http.clone(),
        )?)),
        #[cfg(not(feature = "api-direct"))]
        Backend::Http => anyhow::bail!(
            "The http backend needs agentbus built with the `api-direct` feature"
        ),
    }
}

/// Write the artifact and the audit dump into `dir`
pub fn write_outputs(dir: &Path, html: &str, bus: &MessageBus) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let html_path = dir.join(HTML_FILE);
    std::fs::write(&html_path, html)
        .with_context(|| format!("Failed to write {}", html_path.display()))?;

    let messages_path = dir.join(MESSAGES_FILE);
    std::fs::write(&messages_path, bus.dump_json()?)
        .with_context(|| format!("Failed to write {}", messages_path.display()))?;

    Ok((html_path, messages_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_brief_sources() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("brief.txt");
        std::fs::write(&path, "sunflower seeds, 19.9 yuan").unwrap();

        assert_eq!(resolve_brief(Some("inline"), None).unwrap(), "inline");
        assert_eq!(
            resolve_brief(None, Some(&path)).unwrap(),
            "sunflower seeds, 19.9 yuan"
        );
        assert!(resolve_brief(Some("inline"), Some(&path)).is_err());
        assert!(resolve_brief(None, None).is_err());
        assert!(resolve_brief(Some("  \n"), None).is_err());
    }

    #[test]
    fn test_write_outputs() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        let mut bus = MessageBus::new();
        bus.publish("brief", "human", "seeds");
        bus.publish("html", "Engineer", "<html></html>");

        let (html_path, messages_path) = write_outputs(&out, "<html></html>", &bus).unwrap();
        assert_eq!(std::fs::read_to_string(html_path).unwrap(), "<html></html>");

        let dump: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(messages_path).unwrap()).unwrap();
        assert_eq!(dump["brief"][0]["content"], "seeds");
        assert_eq!(dump["html"][0]["sender"], "Engineer");
    }

    #[cfg(not(feature = "api-direct"))]
    #[test]
    fn test_http_backend_requires_feature() {
        let config = LlmConfig {
            backend: Backend::Http,
            ..Default::default()
        };
        let err = build_generator(&config).err().unwrap();
        assert!(err.to_string().contains("api-direct"));
    }
}
