//! Run HTTP client demonstrations against a placeholder REST API.
use std::process::ExitCode;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{ArgMatches, FromArgMatches, Parser, Subcommand};
use harness_core::{Catalog, HarnessConfig, Operation, Reporter, UreqBackend};
use tracing::{error, info};

mod trc;

#[derive(Parser)]
#[command(version, about = "Exercise an HTTP client against a placeholder REST API.")]
struct Args {
    /// Base URL of the API. Overrides HARNESS_BASE_URL.
    #[arg(long)]
    base_url: Option<String>,

    /// Token sent as X-Auth-Token on every request. Overrides
    /// HARNESS_AUTH_TOKEN.
    #[arg(long)]
    auth_token: Option<String>,

    /// Default timeout for requests that set none. Overrides
    /// HARNESS_TIMEOUT_MS.
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

/// What to run. One subcommand per catalog operation, plus `all` and `list`.
///
/// The operation subcommands are generated from [`Operation::ALL`], so the
/// catalog is the only place operations are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Run(Operation),
    All,
    List,
}

const ALL_COMMAND: &str = "all";
const LIST_COMMAND: &str = "list";

impl Command {
    fn operations(self) -> Vec<Operation> {
        match self {
            Command::Run(op) => vec![op],
            Command::All => Operation::ALL.to_vec(),
            Command::List => Vec::new(),
        }
    }
}

impl FromArgMatches for Command {
    fn from_arg_matches(matches: &ArgMatches) -> Result<Self, clap::Error> {
        match matches.subcommand_name() {
            Some(ALL_COMMAND) => Ok(Command::All),
            Some(LIST_COMMAND) => Ok(Command::List),
            Some(name) => name
                .parse()
                .map(Command::Run)
                .map_err(|e| clap::Error::raw(ErrorKind::InvalidSubcommand, e)),
            None => Err(clap::Error::raw(
                ErrorKind::MissingSubcommand,
                "a subcommand is required",
            )),
        }
    }

    fn update_from_arg_matches(&mut self, matches: &ArgMatches) -> Result<(), clap::Error> {
        *self = Self::from_arg_matches(matches)?;
        Ok(())
    }
}

impl Subcommand for Command {
    fn augment_subcommands(cmd: clap::Command) -> clap::Command {
        Operation::ALL
            .into_iter()
            .fold(cmd, |cmd, op| {
                cmd.subcommand(clap::Command::new(op.name()).about(op.description()))
            })
            .subcommand(clap::Command::new(ALL_COMMAND).about("Run every operation in order"))
            .subcommand(clap::Command::new(LIST_COMMAND).about("List the available operations"))
    }

    fn augment_subcommands_for_update(cmd: clap::Command) -> clap::Command {
        Self::augment_subcommands(cmd)
    }

    fn has_subcommand(name: &str) -> bool {
        name == ALL_COMMAND || name == LIST_COMMAND || name.parse::<Operation>().is_ok()
    }
}

impl Args {
    /// Layer command-line flags over the environment configuration.
    fn apply(&self, mut config: HarnessConfig) -> HarnessConfig {
        if let Some(base_url) = &self.base_url {
            config.base_url.clone_from(base_url);
        }
        if let Some(token) = &self.auth_token {
            config.auth_token.clone_from(token);
        }
        if let Some(ms) = self.timeout_ms {
            config.timeout = Some(Duration::from_millis(ms));
        }
        config
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = trc::init() {
        eprintln!("Failed to initialize logging: {e}");
    }

    let config = match HarnessConfig::from_env() {
        Ok(config) => args.apply(config),
        Err(e) => {
            error!("invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    if matches!(args.command, Command::List) {
        for op in Operation::ALL {
            println!("{:<20}{}", op.name(), op.description());
        }
        return ExitCode::SUCCESS;
    }

    let catalog = Catalog::from_config(UreqBackend::default(), &config);
    let mut reporter = Reporter::new(std::io::stdout());
    for op in args.command.operations() {
        info!(operation = op.name(), base_url = %config.base_url, "running");
        for outcome in catalog.run(op).await {
            reporter.report(&outcome);
        }
    }

    ExitCode::SUCCESS
}
