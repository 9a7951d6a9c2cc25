//! Small syscall set registered by the `sov` binary and used in tests.

use serde_json::{Map, Value};

use crate::error::SyscallError;
use crate::kernel::Kernel;

pub fn register_builtins(kernel: &mut Kernel) {
    kernel.register_syscall("noop", |_, _| Ok(Value::Null));
    kernel.register_syscall("echo", echo);
    kernel.register_syscall("sum", sum);
    kernel.register_syscall("concat", concat);
}

/// Returns `{"args": [...], "kwargs": {...}}`.
fn echo(args: &[Value], kwargs: &Map<String, Value>) -> Result<Value, SyscallError> {
    let mut out = Map::new();
    out.insert("args".into(), Value::Array(args.to_vec()));
    out.insert("kwargs".into(), Value::Object(kwargs.clone()));
    Ok(Value::Object(out))
}

/// Integer sum when every argument is an integer, float sum otherwise.
fn sum(args: &[Value], _: &Map<String, Value>) -> Result<Value, SyscallError> {
    if args.iter().all(|arg| arg.is_i64()) {
        let mut total: i64 = 0;
        for arg in args {
            let value = arg.as_i64().unwrap_or_default();
            total = total
                .checked_add(value)
                .ok_or_else(|| SyscallError::Failed("integer overflow".into()))?;
        }
        return Ok(Value::from(total));
    }
    let mut total = 0.0;
    for arg in args {
        total += arg
            .as_f64()
            .ok_or_else(|| SyscallError::InvalidArgument(format!("not a number: {arg}")))?;
    }
    serde_json::Number::from_f64(total)
        .map(Value::Number)
        .ok_or_else(|| SyscallError::Failed("non-finite result".into()))
}

/// Joins string arguments with the optional `sep` keyword.
fn concat(args: &[Value], kwargs: &Map<String, Value>) -> Result<Value, SyscallError> {
    let sep = match kwargs.get("sep") {
        None => "",
        Some(Value::String(sep)) => sep.as_str(),
        Some(other) => {
            return Err(SyscallError::InvalidArgument(format!("sep must be a string, got {other}")));
        }
    };
    let parts = args
        .iter()
        .map(|arg| {
            arg.as_str()
                .ok_or_else(|| SyscallError::InvalidArgument(format!("not a string: {arg}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::String(parts.join(sep)))
}
