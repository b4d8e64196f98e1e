//! CLI interface for Lookout.
//!
//! Designed to run unattended in a CI workflow, one event per process.
//! Subcommands never prompt. Results go to stdout and logs to stderr.
//!
//! - `lookout run`: triage the triggering event and apply the decision.
//! - `lookout context`: show the seed text an event produces.
//! - `lookout tool`: call one tool against the working tree.

mod format;

use std::{env, fs, path::PathBuf};

use clap::{Args, Parser, Subcommand};
use serde_json::Value;

use crate::{
    backend::{OpenAiBackend, OpenAiConfig},
    config::Config,
    context::build_context,
    model::EventRecord,
    pipeline::{self, LoopSettings},
    tools::{ToolName, Toolbox},
    tracker::GhTracker,
};

use format::{format_decision, format_outcome};

/// Lookout, an issue and pull request triage bot.
#[derive(Debug, Parser)]
#[command(name = "lookout", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// TOML config file. Environment variables override its values.
    #[arg(long, global = true, env = "LOOKOUT_CONFIG")]
    config: Option<PathBuf>,

    /// Repository checkout the tools may read.
    #[arg(long, global = true, default_value = ".")]
    workdir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r#"In a GitHub Actions workflow:
  env:
    AI_MODEL: gpt-4o-mini
    OPENAI_API_KEY: ${{ secrets.OPENAI_API_KEY }}
    GH_TOKEN: ${{ github.token }}
  run: lookout run --event-name ${{ github.event_name }}

Locally:
  lookout context --event-name issues --event-path event.json
  lookout run --dry-run --event-name issues --event-path event.json
  lookout tool search_keyword --args '{"keyword": "save"}'"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Triage the event: decide, then label, set state, and comment.
    ///
    /// With `--dry-run`, prints the decision instead of applying it.
    Run {
        #[command(flatten)]
        event: EventArgs,

        /// Print the decision as JSON instead of touching the issue.
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the subject number and seed text derived from an event.
    ///
    /// No network access.
    Context {
        #[command(flatten)]
        event: EventArgs,
    },

    /// Call a tool directly and print what the model would see.
    Tool {
        /// One of `list_directory`, `read_file`, `search_keyword`.
        name: String,

        /// Arguments as a JSON object.
        #[arg(long, default_value = "{}")]
        args: String,
    },
}

/// Where the triggering event comes from.
#[derive(Debug, Args)]
pub struct EventArgs {
    /// Event name: `issues`, `pull_request`, or `issue_comment`.
    /// Falls back to `GITHUB_EVENT_NAME`.
    #[arg(long, env = "EVENT_NAME")]
    event_name: Option<String>,

    /// Path to the event payload JSON.
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    event_path: Option<PathBuf>,

    /// Event payload JSON, inline. Wins over `--event-path`.
    #[arg(long, env = "EVENT_CONTEXT")]
    event_context: Option<String>,
}

impl EventArgs {
    /// Read and parse the event. Any problem here is fatal.
    fn load(&self) -> Result<EventRecord, String> {
        let name = self
            .event_name
            .clone()
            .or_else(|| env::var("GITHUB_EVENT_NAME").ok())
            .ok_or("no event name: pass --event-name or set EVENT_NAME")?;

        let raw = match (&self.event_context, &self.event_path) {
            (Some(inline), _) => inline.clone(),
            (None, Some(path)) => fs::read_to_string(path)
                .map_err(|e| format!("failed to read {}: {e}", path.display()))?,
            (None, None) => {
                return Err(
                    "no event payload: pass --event-context or --event-path".to_string(),
                );
            }
        };

        let payload: Value =
            serde_json::from_str(&raw).map_err(|e| format!("event payload is not JSON: {e}"))?;

        EventRecord::from_payload(&name, &payload).map_err(|e| e.to_string())
    }
}

/// Run the CLI, returning an error message on failure.
pub fn run() -> Result<(), String> {
    let cli = Cli::parse();

    match &cli.command {
        Command::Run { event, dry_run } => {
            let config = Config::load(cli.config.as_deref())?;
            let event = event.load()?;
            cmd_run(&config, &Toolbox::new(&cli.workdir), &event, *dry_run)
        }
        Command::Context { event } => cmd_context(&event.load()?),
        Command::Tool { name, args } => cmd_tool(&Toolbox::new(&cli.workdir), name, args),
    }
}

fn cmd_run(
    config: &Config,
    toolbox: &Toolbox,
    event: &EventRecord,
    dry_run: bool,
) -> Result<(), String> {
    let settings = LoopSettings {
        model: config.require_model()?.to_string(),
        max_turns: config.max_turns,
    };

    let backend = OpenAiBackend::new(&OpenAiConfig {
        api_base: config.api_base.clone(),
        api_key: config.api_key.clone().unwrap_or_default(),
        request_timeout: config.request_timeout(),
    })
    .map_err(|e| format!("failed to set up the reasoning backend: {e}"))?;

    let tracker = GhTracker::new(config.repository.clone());

    if dry_run {
        let decision = pipeline::decide(event, &backend, &tracker, toolbox, &settings)
            .map_err(|e| e.to_string())?;
        println!("{}", format_decision(&decision));
        return Ok(());
    }

    let (decision, applied) = pipeline::triage(event, &backend, &tracker, toolbox, &settings)
        .map_err(|e| e.to_string())?;
    if !applied.is_clean() {
        tracing::warn!(number = decision.number, "some changes could not be applied");
    }
    eprintln!("{}", format_outcome(&decision, &applied));

    Ok(())
}

fn cmd_context(event: &EventRecord) -> Result<(), String> {
    let (number, seed) = build_context(event);
    println!("#{number}\n{seed}");
    Ok(())
}

fn cmd_tool(toolbox: &Toolbox, name: &str, args: &str) -> Result<(), String> {
    let tool: ToolName = name.parse().map_err(|()| {
        let known = ToolName::ALL.map(ToolName::as_str);
        format!("unknown tool '{name}' (expected one of: {})", known.join(", "))
    })?;

    let arguments: Value =
        serde_json::from_str(args).map_err(|e| format!("--args is not JSON: {e}"))?;

    println!("{}", toolbox.invoke(tool, &arguments));
    Ok(())
}
