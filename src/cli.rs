//! Command-line options shared by the desktop viewer and the headless tool.

use crate::loader::DatasetPaths;
use std::path::PathBuf;

pub const DEFAULT_SETTINGS_PATH: &str = "synteny_viewer_settings.json";

#[derive(Clone, Debug, PartialEq)]
pub struct CommonArgs {
    pub paths: DatasetPaths,
    pub settings_path: PathBuf,
    pub state_path: Option<PathBuf>,
    pub version: bool,
    /// Positional arguments, in order.
    pub rest: Vec<String>,
}

impl Default for CommonArgs {
    fn default() -> Self {
        Self {
            paths: DatasetPaths::default(),
            settings_path: PathBuf::from(DEFAULT_SETTINGS_PATH),
            state_path: None,
            version: false,
            rest: vec![],
        }
    }
}

impl CommonArgs {
    pub fn parse(args: &[String]) -> Result<Self, String> {
        let mut ret = Self::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            let mut value = |name: &str| {
                iter.next()
                    .map(PathBuf::from)
                    .ok_or_else(|| format!("{name} expects a path"))
            };
            match arg.as_str() {
                "--version" | "-V" => ret.version = true,
                "--synteny" => ret.paths.synteny = Some(value(arg.as_str())?),
                "--species" => ret.paths.species = Some(value(arg.as_str())?),
                "--reference-sizes" => ret.paths.reference_sizes = Some(value(arg.as_str())?),
                "--annotations" => ret.paths.annotations = Some(value(arg.as_str())?),
                "--breakpoints" => ret.paths.breakpoints = Some(value(arg.as_str())?),
                "--settings" => ret.settings_path = value(arg.as_str())?,
                "--state" => ret.state_path = Some(value(arg.as_str())?),
                other if other.starts_with("--") => return Err(format!("unknown option {other}")),
                other => ret.rest.push(other.to_string()),
            }
        }
        Ok(ret)
    }

    pub fn usage(program: &str) -> String {
        format!(
            "Usage:\n  \
  {program} --version\n  \
  {program} --synteny FILE --species FILE [--reference-sizes FILE]\n  \
  {pad} [--annotations FILE] [--breakpoints FILE]\n  \
  {pad} [--settings FILE] [--state FILE]",
            pad = " ".repeat(program.len())
        )
    }
}
