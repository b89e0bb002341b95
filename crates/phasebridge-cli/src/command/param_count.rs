use anyhow::Context as _;

use super::ModelFiles;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ParamCountArg {
    #[clap(flatten)]
    files: ModelFiles,
}

pub(crate) fn run(arg: &ParamCountArg) -> anyhow::Result<()> {
    let (game, model) = arg.files.load()?;
    let count = model
        .parameter_count(&game)
        .context("Invalid model description")?;
    println!("{count}");
    Ok(())
}
