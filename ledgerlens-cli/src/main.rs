use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use ledgerlens_client::{ReqwestTransport, SubmissionController};
use ledgerlens_core::{Session, SubmissionState};
use ledgerlens_ingest::collect_candidates;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod config;
mod export;
mod logging;
mod report;
mod state;
mod tui;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("LEDGERLENS_BUILD_SHA"),
    ")"
);

#[derive(Parser, Debug)]
#[command(
    name = "ledgerlens",
    version = VERSION,
    about = "Send bank statements to an analysis service and read the summary"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Per-invocation overrides for `~/.ledgerlens/config.toml`.
#[derive(Args, Debug, Default)]
struct Overrides {
    /// Service base URL, e.g. http://localhost:8000
    #[arg(long)]
    endpoint: Option<String>,

    /// Maximum number of statements per batch
    #[arg(long)]
    max_files: Option<usize>,

    /// Seconds to wait for the analysis before giving up
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Currency format: de-DE or en-US
    #[arg(long)]
    locale: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze statements and print a summary of the first one
    Analyze {
        /// PDF files, or directories containing them
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,

        /// Print the validated result as JSON instead of the report
        #[arg(long)]
        json: bool,

        /// Also write the chart series to this CSV file
        #[arg(long)]
        export_csv: Option<PathBuf>,
    },

    /// Interactive terminal UI
    Tui {
        /// Statements to preload into the batch
        paths: Vec<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Check that the analysis service is up
    Health {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Manage ~/.ledgerlens/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

fn effective_config(o: &Overrides) -> Result<config::Config> {
    let mut cfg = config::load_config()?;
    if let Some(url) = &o.endpoint {
        cfg.service.base_url = url.clone();
    }
    if let Some(n) = o.max_files {
        cfg.selector.max_files = n;
    }
    if let Some(s) = o.timeout_secs {
        cfg.service.timeout_secs = s;
    }
    if let Some(l) = &o.locale {
        cfg.display.locale = l.clone();
    }
    cfg.validate()?;
    Ok(cfg)
}

fn controller(cfg: &config::Config) -> SubmissionController<ReqwestTransport> {
    let transport = ReqwestTransport::new(cfg.endpoint());
    SubmissionController::new(Session::new(cfg.selector()), Arc::new(transport))
        .with_timeout(cfg.timeout())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze {
            paths,
            overrides,
            json,
            export_csv,
        } => {
            logging::init_stderr("warn");
            let cfg = effective_config(&overrides)?;
            analyze(&cfg, &paths, json, export_csv).await?;
        }

        Command::Tui { paths, overrides } => {
            let log = state::daily_log_path()?;
            logging::init_file(&log, "info")?;
            let cfg = effective_config(&overrides)?;
            let app = tui::App::new(
                controller(&cfg),
                cfg.currency_format()?,
                tokio::runtime::Handle::current(),
            );
            tokio::task::spawn_blocking(move || tui::run_tui(app, &paths))
                .await
                .context("terminal UI thread panicked")??;
        }

        Command::Health { overrides } => {
            logging::init_stderr("warn");
            let cfg = effective_config(&overrides)?;
            let transport = ReqwestTransport::new(cfg.endpoint());
            let status = transport.health(Duration::from_secs(10)).await?;
            if !status.is_healthy() {
                bail!("service reported status {:?}", status.status);
            }
            println!("{} is healthy", cfg.endpoint().health_url());
        }

        Command::Config { command } => {
            logging::init_stderr("warn");
            match command {
                ConfigCommand::Init => config::init_config()?,
                ConfigCommand::Show => {
                    let cfg = effective_config(&Overrides::default())?;
                    println!("# {}", config::config_path()?.display());
                    print!("{}", toml::to_string_pretty(&cfg)?);
                }
            }
        }
    }

    Ok(())
}

async fn analyze(
    cfg: &config::Config,
    paths: &[PathBuf],
    json: bool,
    export_csv: Option<PathBuf>,
) -> Result<()> {
    let mut ctl = controller(cfg);
    let accepted = ctl.session().selector().config().accepted_media_type.clone();
    let collected = collect_candidates(paths, &accepted)?;
    let outcome = ctl.add(collected.files)?;
    let ignored = collected.skipped + outcome.ignored;
    if ignored > 0 {
        eprintln!("Ignored {ignored} file(s) that are not PDFs");
    }

    ctl.submit_and_wait().await?;
    let result = match ctl.state() {
        SubmissionState::Succeeded(r) => r,
        SubmissionState::Failed(err) => {
            tracing::error!(kind = err.kind(), error = %err, "analysis failed");
            bail!("{}", err.user_message());
        }
        other => bail!("unexpected state after submission: {}", other.label()),
    };

    let fmt = cfg.currency_format()?;
    let Some(p) = ctl.session().presenter(&fmt) else {
        bail!("analysis returned no statements");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        print!("{}", report::render(&p));
    }

    if let Some(path) = export_csv {
        let rows = export::export_chart_csv(&p, &path)?;
        eprintln!("Wrote {rows} chart point(s) to {}", path.display());
    }
    Ok(())
}
