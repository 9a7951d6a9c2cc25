mod commands;
mod opts;
mod output;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::ledger::LedgerCommand;
use commands::mirror::MirrorCommand;
use commands::run::RunArgs;
use opts::GlobalOpts;

#[derive(Parser, Debug)]
#[command(name = "sov", version, about = "Deterministic kernel, cluster sim and audit ledger")]
struct Cli {
    #[command(flatten)]
    opts: GlobalOpts,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute a DAG file through the kernel
    Run(RunArgs),

    /// Audit ledger commands
    #[command(subcommand)]
    Ledger(LedgerCommand),

    /// External-state mirror commands
    #[command(subcommand)]
    Mirror(MirrorCommand),
}

fn main() -> ExitCode {
    setup_logging();
    let cli = Cli::parse();
    match dispatch(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn dispatch(cli: &Cli) -> Result<ExitCode> {
    let opts = &cli.opts;
    match &cli.command {
        Command::Run(args) => commands::run::cmd_run(opts, args),
        Command::Ledger(cmd) => commands::ledger::cmd_ledger(opts, cmd),
        Command::Mirror(cmd) => commands::mirror::cmd_mirror(opts, cmd),
    }
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` overrides the default.
fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
