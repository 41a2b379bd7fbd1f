//! Command line arguments.

use std::path::PathBuf;

use crate::session::{SessionError, SessionResult};

pub const USAGE: &str = "inkgraph <script.json> [--document in.json] [--settings settings.json] [--out out.json]";

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub script: PathBuf,
    /// Document to start from instead of an empty one.
    pub document: Option<PathBuf>,
    pub settings: Option<PathBuf>,
    /// Where to save the result. Printed to stdout when absent.
    pub out: Option<PathBuf>,
}

impl Args {
    /// Parse arguments, without the program name.
    pub fn parse(args: impl IntoIterator<Item = String>) -> SessionResult<Self> {
        let mut script = None;
        let mut document = None;
        let mut settings = None;
        let mut out = None;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let slot = match arg.as_str() {
                "--document" => &mut document,
                "--settings" => &mut settings,
                "--out" => &mut out,
                flag if flag.starts_with("--") => {
                    return Err(SessionError::Usage(format!("unknown option {flag}\n{USAGE}")));
                }
                _ => {
                    if script.replace(PathBuf::from(&arg)).is_some() {
                        return Err(SessionError::Usage(format!("unexpected argument {arg}\n{USAGE}")));
                    }
                    continue;
                }
            };
            let value = args
                .next()
                .ok_or_else(|| SessionError::Usage(format!("{arg} needs a path\n{USAGE}")))?;
            *slot = Some(PathBuf::from(value));
        }

        let script = script.ok_or_else(|| SessionError::Usage(USAGE.to_string()))?;
        Ok(Self {
            script,
            document,
            settings,
            out,
        })
    }
}
