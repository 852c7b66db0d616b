//! Command-line arguments.

use std::path::PathBuf;

use anyhow::{bail, Context};

pub const USAGE: &str = "usage: thumbkit [--config FILE] [--out DIR] [--no-thumbs] [DIR]";

/// Parsed command line.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Args {
    pub config: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub no_thumbs: bool,
    pub dir: Option<PathBuf>,
    pub help: bool,
}

impl Args {
    /// Parses arguments, program name excluded.
    pub fn parse<I>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = Args::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => parsed.help = true,
                "--no-thumbs" => parsed.no_thumbs = true,
                "-c" | "--config" => {
                    let value = args.next().context("--config needs a file")?;
                    parsed.config = Some(PathBuf::from(value));
                }
                "-o" | "--out" => {
                    let value = args.next().context("--out needs a directory")?;
                    parsed.out = Some(PathBuf::from(value));
                }
                flag if flag.starts_with('-') => bail!("unknown option {flag}\n{USAGE}"),
                _ => {
                    if parsed.dir.is_some() {
                        bail!("only one directory may be given\n{USAGE}");
                    }
                    parsed.dir = Some(PathBuf::from(arg));
                }
            }
        }
        Ok(parsed)
    }
}
