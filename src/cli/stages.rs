use crate::models::{PipelineOptions, RunOverrides};
use crate::orchestrator::capability::responsibilities_param;
use crate::orchestrator::Pipeline;
use crate::Result;
use colored::Colorize;
use serde_json::json;
use std::path::Path;

/// Print the stage list the builder produces for the effective options
pub fn run(config_path: Option<&Path>, overrides: RunOverrides, json: bool) -> Result<()> {
    let config = super::load_config(config_path)?;
    let pipeline = Pipeline::new(config.pipeline.with_overrides(overrides));

    if json {
        println!("{}", render_json(&pipeline)?);
        return Ok(());
    }

    let PipelineOptions {
        with_design_stages,
        with_shared_context,
    } = pipeline.options();
    println!("{}", "Pipeline".cyan().bold());
    println!("   Design stages:  {}", on_off(with_design_stages));
    println!("   Shared context: {}", on_off(with_shared_context));
    println!();

    for (index, stage) in pipeline.stages().iter().enumerate() {
        println!(
            "   {}. {} {}  {} → {}",
            index + 1,
            stage.capability.id().bold(),
            format!("({})", stage.capability.agent_name()).bright_black(),
            stage.input_topic,
            stage.output_topic.green()
        );
    }

    let duties = pipeline
        .stages()
        .first()
        .map(|stage| responsibilities_param(&stage.params))
        .unwrap_or_default();
    println!();
    println!("{}", "Roster".cyan().bold());
    for role in pipeline.roster() {
        match duties.get(&role) {
            Some(duty) => println!("   • {}: {}", role, duty),
            None => println!("   • {}", role),
        }
    }
    Ok(())
}

/// Options, roster and stages as pretty JSON
pub fn render_json(pipeline: &Pipeline) -> Result<String> {
    let value = json!({
        "options": pipeline.options(),
        "roster": pipeline.roster(),
        "stages": pipeline.stages(),
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

fn on_off(enabled: bool) -> colored::ColoredString {
    if enabled {
        "on".green()
    } else {
        "off".yellow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_json_lists_stages() {
        let pipeline = Pipeline::new(PipelineOptions::new(false, true));
        let value: serde_json::Value = serde_json::from_str(&render_json(&pipeline).unwrap()).unwrap();

        assert_eq!(value["options"]["with_shared_context"], true);
        assert_eq!(value["roster"], json!(["TeamLeader", "Engineer"]));
        assert_eq!(value["stages"][0]["capability"], "role_planner");
        assert_eq!(value["stages"][1]["input_topic"], "brief");
        assert!(value["stages"][1].get("params").is_none());
    }
}
