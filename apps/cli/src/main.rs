//! keepawake - keep the system awake until Ctrl+C.

use anyhow::{Context, Result};
use clap::Parser;
use keepawake_core::{
    FailureTextStyle, OnFail, OutcomeView, PriorityOrder, Selection, StatusLabels,
    KEEP_PRESENTING, KEEP_RUNNING,
};
use keepawake_methods::keep;
use tracing_subscriber::EnvFilter;

mod render;

/// Keep the system awake while this program runs.
#[derive(Parser, Debug)]
#[command(name = "keepawake")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Keep programs running: no automatic suspend, the screen may lock (default)
    #[arg(short = 'r', long, conflicts_with = "keep_presenting")]
    keep_running: bool,

    /// Keep the screen on and unlocked
    #[arg(short = 'p', long)]
    keep_presenting: bool,

    /// Only use these methods (comma separated)
    #[arg(long, value_delimiter = ',', conflicts_with = "omit")]
    methods: Vec<String>,

    /// Never use these methods (comma separated)
    #[arg(long, value_delimiter = ',')]
    omit: Vec<String>,

    /// Methods priority, e.g. "a+b,*,c"
    #[arg(long)]
    priority: Option<String>,

    /// Try every method once and report which ones work
    #[arg(long)]
    probe: bool,

    /// Print the probe result as JSON
    #[arg(long, requires = "probe")]
    json: bool,

    /// More output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn mode_name(&self) -> &'static str {
        if self.keep_presenting {
            KEEP_PRESENTING
        } else {
            KEEP_RUNNING
        }
    }

    fn selection(&self) -> Selection {
        if !self.methods.is_empty() {
            Selection::use_only(self.methods.iter().cloned())
        } else if !self.omit.is_empty() {
            Selection::omit(self.omit.iter().cloned())
        } else {
            Selection::All
        }
    }

    fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level())),
        )
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(?cli, "parsed arguments");

    let mut params = keep::mode(cli.mode_name()).selection(cli.selection());
    if let Some(priority) = &cli.priority {
        let priority: PriorityOrder = priority
            .parse()
            .with_context(|| format!("invalid --priority \"{priority}\""))?;
        params = params.priority(priority);
    }

    if cli.probe {
        let mode = params.build().context("failed to set up mode")?;
        let probe = mode.probe();
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&probe)?);
        } else {
            println!("{}", probe.methods_text_detailed(80, &StatusLabels::default()));
        }
        return Ok(());
    }

    let params = params.on_fail(OnFail::callback(|result| {
        eprintln!("{}", result.failure_text(FailureTextStyle::Block));
    }));
    let mut mode = params.build().context("failed to set up mode")?;
    mode.enter().context("failed to activate mode")?;

    if !mode.active() {
        std::process::exit(1);
    }

    let session = render::Session {
        mode_name: mode.name().to_string(),
        method_name: mode
            .active_method()
            .map(|m| m.name.clone())
            .unwrap_or_else(|| "(no method)".to_string()),
        fake_success: !mode.result().real_success(),
        started: chrono::Local::now(),
    };
    println!("{}", render::banner(&session));
    println!("\nPress Ctrl+C to exit.");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;

    mode.exit().context("failed to deactivate mode")?;
    println!("\nExited.");
    Ok(())
}
