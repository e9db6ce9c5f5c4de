//! Command line: a single positional sampling interval in whole seconds.

use std::time::{Duration, Instant};

use crate::error::{Result, StatError};

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Run { interval: Duration },
    Help,
}

pub fn usage(prog: &str) -> String {
    format!("Usage: {prog} <interval_in_seconds>")
}

pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Command> {
    let mut it = args.into_iter();
    let _ = it.next(); // program name
    let mut interval: Option<String> = None;

    for arg in it {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            _ => {
                if interval.is_none() {
                    interval = Some(arg);
                } else {
                    return Err(StatError::InvalidInterval(format!(
                        "unexpected argument '{arg}'"
                    )));
                }
            }
        }
    }

    let raw = interval
        .ok_or_else(|| StatError::InvalidInterval("missing interval_in_seconds".into()))?;
    let secs = parse_interval(&raw)?;
    Ok(Command::Run {
        interval: Duration::from_secs(secs),
    })
}

fn parse_interval(raw: &str) -> Result<u64> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|e| StatError::InvalidInterval(format!("'{raw}': {e}")))?;
    if secs == 0 {
        return Err(StatError::InvalidInterval(format!(
            "'{raw}': must be at least 1 second"
        )));
    }
    // the first tick is scheduled at now + interval
    if Instant::now().checked_add(Duration::from_secs(secs)).is_none() {
        return Err(StatError::InvalidInterval(format!("'{raw}': too large")));
    }
    Ok(secs)
}
