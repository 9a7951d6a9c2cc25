//! `sov ledger`: append to, verify and query the file-backed audit ledger.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use serde_json::{Map, Value, json};
use sov_ledger::{LedgerIndex, LedgerQuery, LedgerRecord};

use crate::opts::{GlobalOpts, read_json};
use crate::output::{print_json, record_json};

#[derive(Subcommand, Debug)]
pub enum LedgerCommand {
    /// Check the hash links of every chain (exit code 1 if any is broken)
    Verify,

    /// Query records across all chains
    Query(QueryArgs),

    /// Append a record to a chain, linking it to the chain tip
    Append(AppendArgs),

    /// Print every record of one chain
    Show(ShowArgs),
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Violations recorded against this node
    #[arg(long)]
    pub node: Option<String>,

    /// Constitution version in force at this tick
    #[arg(long)]
    pub constitution_at: Option<u64>,

    /// Records tagged with this scenario in their metadata
    #[arg(long)]
    pub scenario: Option<String>,
}

#[derive(Args, Debug)]
pub struct AppendArgs {
    /// Target chain id
    pub chain: String,

    /// JSON file holding `{tick, record_type, node_id, payload, metadata?}`
    pub record: PathBuf,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    pub chain: String,
}

pub fn cmd_ledger(opts: &GlobalOpts, cmd: &LedgerCommand) -> Result<ExitCode> {
    match cmd {
        LedgerCommand::Verify => verify(opts),
        LedgerCommand::Query(args) => query(opts, args),
        LedgerCommand::Append(args) => append(opts, args),
        LedgerCommand::Show(args) => show(opts, args),
    }
}

fn verify(opts: &GlobalOpts) -> Result<ExitCode> {
    let store = opts.open_store()?;
    let reports = store.validate_all();
    let valid = reports.values().all(|report| report.is_valid());
    print_json(opts, &json!({ "valid": valid, "chains": reports }))?;
    if valid {
        Ok(ExitCode::SUCCESS)
    } else {
        log::warn!("ledger verification failed");
        Ok(ExitCode::FAILURE)
    }
}

fn query(opts: &GlobalOpts, args: &QueryArgs) -> Result<ExitCode> {
    if args.node.is_none() && args.constitution_at.is_none() && args.scenario.is_none() {
        bail!("nothing to query: pass --node, --constitution-at or --scenario");
    }
    let store = opts.open_store()?;
    let query = LedgerQuery::from_store(&store);
    let mut out = Map::new();

    if let Some(node) = &args.node {
        let violations: Vec<Value> = query
            .violations_for_node(node)
            .into_iter()
            .map(record_json)
            .collect();
        out.insert("violations".into(), Value::Array(violations));
    }
    if let Some(tick) = args.constitution_at {
        let active = query.active_constitution_at(tick).map(record_json);
        out.insert("constitution".into(), active.unwrap_or(Value::Null));
    }
    if let Some(scenario) = &args.scenario {
        let mut index = LedgerIndex::new(store.clone());
        let records: Vec<Value> = index.for_scenario(scenario).iter().map(record_json).collect();
        out.insert("scenario".into(), Value::Array(records));
    }

    print_json(opts, &Value::Object(out))?;
    Ok(ExitCode::SUCCESS)
}

fn append(opts: &GlobalOpts, args: &AppendArgs) -> Result<ExitCode> {
    let value: Value = read_json(&args.record)?;
    let record = LedgerRecord::from_value(value)
        .with_context(|| format!("load record {}", args.record.display()))?;
    let store = opts.open_store()?;
    let stored = store.append(&args.chain, record)?;
    log::info!("appended {} to chain {}", stored.record_type(), args.chain);
    print_json(opts, &record_json(&stored))?;
    Ok(ExitCode::SUCCESS)
}

fn show(opts: &GlobalOpts, args: &ShowArgs) -> Result<ExitCode> {
    let store = opts.open_store()?;
    let chain = store.get_chain(&args.chain)?;
    let records: Vec<Value> = chain.records().iter().map(record_json).collect();
    print_json(
        opts,
        &json!({ "chain": args.chain, "records": records, "report": chain.verify() }),
    )?;
    Ok(ExitCode::SUCCESS)
}
