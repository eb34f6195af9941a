use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use covecon::core::log::init_logging;
use covecon::core::series::ProviderKind;
use covecon::core::simulator::SimulationParams;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the joined case and GDP series for a country
    Series {
        /// Country key, ISO code or case-feed name (defaults to the configured country)
        #[arg(long)]
        country: Option<String>,
        /// Preferred GDP provider: worldbank, tradingeconomics or oecd
        #[arg(long)]
        provider: Option<ProviderKind>,
        /// Number of most recent days to show
        #[arg(long, default_value_t = 14)]
        tail: usize,
    },
    /// Summarise every configured country
    Overview {
        #[arg(long)]
        provider: Option<ProviderKind>,
    },
    /// Write the joined series to a CSV file
    Export {
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        provider: Option<ProviderKind>,
        /// Output file (defaults to a name derived from the country)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Read country keys from stdin and show each as it arrives
    Explore {
        #[arg(long)]
        provider: Option<ProviderKind>,
        #[arg(long, default_value_t = 14)]
        tail: usize,
    },
    /// Run the healthy/infected simulation
    Simulate(SimulateArgs),
    /// List known countries
    Countries,
}

#[derive(Args)]
struct SimulateArgs {
    /// Growth rate of the healthy population
    #[arg(long, default_value_t = SimulationParams::default().a)]
    a: f64,
    /// Infection rate
    #[arg(long, default_value_t = SimulationParams::default().b)]
    b: f64,
    /// Growth rate of the infected population
    #[arg(long, default_value_t = SimulationParams::default().c)]
    c: f64,
    /// Death rate
    #[arg(long, default_value_t = SimulationParams::default().d)]
    d: f64,
    /// Recovery rate
    #[arg(long, default_value_t = SimulationParams::default().e)]
    e: f64,
    #[arg(long, default_value_t = SimulationParams::default().healthy0)]
    healthy: f64,
    #[arg(long, default_value_t = SimulationParams::default().infected0)]
    infected: f64,
    #[arg(long, default_value_t = SimulationParams::default().steps)]
    steps: usize,
    #[arg(long, default_value_t = SimulationParams::default().dt)]
    dt: f64,
    /// Print every Nth state
    #[arg(long, default_value_t = 10)]
    every: usize,
    /// Write all states to this CSV file instead of printing a table
    #[arg(long)]
    csv: Option<PathBuf>,
}

impl From<SimulateArgs> for covecon::AppCommand {
    fn from(args: SimulateArgs) -> covecon::AppCommand {
        covecon::AppCommand::Simulate {
            params: SimulationParams {
                a: args.a,
                b: args.b,
                c: args.c,
                d: args.d,
                e: args.e,
                healthy0: args.healthy,
                infected0: args.infected,
                steps: args.steps,
                dt: args.dt,
            },
            every: args.every,
            csv: args.csv,
        }
    }
}

impl From<Commands> for covecon::AppCommand {
    fn from(cmd: Commands) -> covecon::AppCommand {
        match cmd {
            Commands::Series {
                country,
                provider,
                tail,
            } => covecon::AppCommand::Series {
                country,
                provider,
                tail,
            },
            Commands::Overview { provider } => covecon::AppCommand::Overview { provider },
            Commands::Export {
                country,
                provider,
                output,
            } => covecon::AppCommand::Export {
                country,
                provider,
                output,
            },
            Commands::Explore { provider, tail } => {
                covecon::AppCommand::Explore { provider, tail }
            }
            Commands::Simulate(args) => args.into(),
            Commands::Countries => covecon::AppCommand::Countries,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => covecon::cli::setup::setup_at_path(path),
            None => covecon::cli::setup::setup(),
        },
        Some(cmd) => covecon::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
