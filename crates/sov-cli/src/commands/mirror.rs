use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;
use sov_cluster::mirror::diff;
use sov_cluster::{MirrorEvent, MirrorState, WorldState};

use crate::opts::{GlobalOpts, read_json};
use crate::output::print_json;

#[derive(Subcommand, Debug)]
pub enum MirrorCommand {
    /// Rebuild mirror state from an event file, optionally diffing it against live state
    Replay(ReplayArgs),
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// JSON array of `{tick, domain, payload}` events, in any order
    pub events: PathBuf,

    /// Live cluster state as `{domain: {key: value}}`
    #[arg(long)]
    pub world: Option<PathBuf>,
}

pub fn cmd_mirror(opts: &GlobalOpts, cmd: &MirrorCommand) -> Result<ExitCode> {
    match cmd {
        MirrorCommand::Replay(args) => replay(opts, args),
    }
}

fn replay(opts: &GlobalOpts, args: &ReplayArgs) -> Result<ExitCode> {
    let events: Vec<MirrorEvent> = read_json(&args.events)?;
    let state = MirrorState::replay(events);
    let mut out = json!({ "state": state });
    if let Some(path) = &args.world {
        let world: WorldState = read_json(path)?;
        out["diff"] = serde_json::to_value(diff(&state, &world))?;
    }
    print_json(opts, &out)?;
    Ok(ExitCode::SUCCESS)
}
