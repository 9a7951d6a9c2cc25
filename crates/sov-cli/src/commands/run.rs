//! `sov run`: order a DAG and execute it with the builtin syscalls.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use serde_json::json;
use sov_kernel::builtins::register_builtins;
use sov_kernel::{Kernel, Node};

use crate::opts::{GlobalOpts, read_json};
use crate::output::print_json;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// JSON array of DAG nodes
    pub dag: PathBuf,
}

pub fn cmd_run(opts: &GlobalOpts, args: &RunArgs) -> Result<ExitCode> {
    let dag: Vec<Node> = read_json(&args.dag)?;
    let mut kernel = Kernel::with_config(opts.kernel_config()?);
    register_builtins(&mut kernel);

    let outcome = kernel.run(dag);
    let trace = kernel.trace().lines();
    match outcome {
        Ok(results) => {
            print_json(
                opts,
                &json!({
                    "results": results,
                    "trace": trace,
                    "verified": kernel.verify(),
                    "budget": kernel.budget_snapshot(),
                }),
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            // Partial trace is still reported; it names the failing node last.
            print_json(opts, &json!({ "error": err.to_string(), "trace": trace }))?;
            Ok(ExitCode::FAILURE)
        }
    }
}
