use agentbus::cli::run::RunArgs;
use agentbus::models::RunOverrides;
use agentbus::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "agentbus")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Multi-agent page pipeline over a topic message log", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Debug logging (RUST_LOG still wins)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: ./agentbus.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Pipeline shape overrides shared by `run` and `stages`
#[derive(Args, Debug, Clone, Copy)]
struct ShapeFlags {
    /// Run the requirements and architecture stages
    #[arg(long, overrides_with = "no_design")]
    design: bool,

    /// Build straight from the brief
    #[arg(long, overrides_with = "design")]
    no_design: bool,

    /// Give every stage the full conversation history
    #[arg(long, overrides_with = "isolated_context")]
    shared_context: bool,

    /// Give every stage only its input artifact
    #[arg(long, overrides_with = "shared_context")]
    isolated_context: bool,
}

impl ShapeFlags {
    fn overrides(&self) -> RunOverrides {
        RunOverrides {
            with_design_stages: flag_pair(self.design, self.no_design),
            with_shared_context: flag_pair(self.shared_context, self.isolated_context),
        }
    }
}

fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline on a brief
    Run {
        /// Client brief text
        brief: Option<String>,

        /// Read the brief from a file
        #[arg(short, long, conflicts_with = "brief")]
        file: Option<PathBuf>,

        #[command(flatten)]
        shape: ShapeFlags,

        /// Write index.html and messages.json into this directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the stages and roster for the effective options
    Stages {
        #[command(flatten)]
        shape: ShapeFlags,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default agentbus.toml in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = agentbus::cli::load_config(cli.config.as_deref())
        .map(|config| config.log_level)
        .unwrap_or_else(|_| "warn".to_string());
    agentbus::logging::init(&log_level, cli.verbose);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("{}", format!("Error: failed to start runtime: {}", e).red());
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run_async(cli)) {
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}

async fn run_async(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run {
            brief,
            file,
            shape,
            output,
        } => {
            agentbus::cli::run::run(RunArgs {
                brief,
                file,
                overrides: shape.overrides(),
                output,
                config: cli.config,
            })
            .await?;
        }
        Commands::Stages { shape, json } => {
            agentbus::cli::stages::run(cli.config.as_deref(), shape.overrides(), json)?;
        }
        Commands::Init { force } => {
            agentbus::cli::init::run(force)?;
        }
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "agentbus", &mut io::stdout());
        }
    }

    Ok(())
}
