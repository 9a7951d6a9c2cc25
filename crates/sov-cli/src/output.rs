use anyhow::Result;
use serde_json::Value;
use sov_ledger::LedgerRecord;

use crate::opts::GlobalOpts;

pub fn print_json(opts: &GlobalOpts, value: &Value) -> Result<()> {
    let text = if opts.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{text}");
    Ok(())
}

/// Archived form of a record plus its own hash.
pub fn record_json(record: &LedgerRecord) -> Value {
    let mut value = record.canonical_payload();
    if let Value::Object(map) = &mut value {
        map.insert("hash".into(), Value::String(record.compute_hash()));
    }
    value
}
