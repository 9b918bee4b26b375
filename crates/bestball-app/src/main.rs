// Best-ball league tools entry point.
//
// Subcommands:
// - validate: compare submitted draft orders against saved reference pages
// - scores:   weekly ideal-lineup scores with waiver-ordered free agents
// - rank:     build a custom draft ranking from depth charts and ADP

use std::path::PathBuf;

use anyhow::Context;
use bestball_app::{config, ranking, scoring, validate};
use bestball_data::adp::AdpClient;
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "bestball", version, about = "Best-ball fantasy football league tools")]
struct Cli {
    /// Directory holding config/ and defaults/ (defaults to the working directory).
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check submitted draft orders against the reference rankings.
    Validate {
        /// Team to validate; repeat for several. Defaults to every configured team.
        #[arg(long = "team")]
        teams: Vec<String>,
    },
    /// Score every completed week and write the table.
    Scores {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Build the custom draft ranking.
    Rank {
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().context("failed to read working directory")?,
    };
    let copied = config::ensure_config_files(&root).context("failed to initialize configuration")?;
    for path in &copied {
        info!("Created {} from defaults", path.display());
    }
    let config = config::load_config_from(&root).context("failed to load configuration")?;
    info!("Config loaded: league={}, {} teams", config.league.name, config.league.num_teams);

    match cli.command {
        Command::Validate { teams } => {
            let results = validate::run(&config, &teams)?;
            for result in &results {
                print!("{}", validate::render(result));
            }
        }
        Command::Scores { output } => {
            let path = scoring::run(&config, output.as_deref())?;
            println!("{}", path.display());
        }
        Command::Rank { output } => {
            let adp = &config.ranking.adp;
            let client = AdpClient::new(adp.base_url.clone(), adp.min_draft_percentage);
            let path = ranking::run(&config, &client, output.as_deref()).await?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

/// Log to stderr so stdout carries only reports.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bestball=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
