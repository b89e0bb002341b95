use std::{io, path::PathBuf};

use anyhow::Context as _;
use phasebridge_model::model::ForwardModel as _;

use crate::util;

use super::ModelFiles;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ActArg {
    #[clap(flatten)]
    files: ModelFiles,
    /// Parameter vector JSON file (array of numbers); not needed for baselines
    #[arg(long)]
    params: Option<PathBuf>,
    /// Phase the observation belongs to
    #[arg(long, default_value_t = 0)]
    phase: usize,
}

pub(crate) fn run(arg: &ActArg) -> anyhow::Result<()> {
    let (game, spec) = arg.files.load()?;
    let params = match &arg.params {
        Some(path) => util::read_params_file(path)?,
        None => Vec::new(),
    };
    let model = spec
        .build(&game, &params)
        .with_context(|| format!("Failed to build {}", spec.describe()))?;

    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("Failed to read observation from stdin")?;
    let observation = util::parse_observation(&line)?;

    let action = model
        .evaluate(&observation, arg.phase)
        .context("Failed to evaluate model")?;
    println!("{action}");
    Ok(())
}
