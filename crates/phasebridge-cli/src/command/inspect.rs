use std::path::PathBuf;

use anyhow::Context as _;
use phasebridge_model::partition;

use crate::util;

use super::ModelFiles;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct InspectArg {
    #[clap(flatten)]
    files: ModelFiles,
    /// Parameter vector JSON file (array of numbers)
    #[arg(long)]
    params: PathBuf,
}

pub(crate) fn run(arg: &InspectArg) -> anyhow::Result<()> {
    let (game, model) = arg.files.load()?;
    model
        .parameter_count(&game)
        .context("Invalid model description")?;
    let Some(shape) = model.network_shape(&game) else {
        println!("{}: no learned parameters", model.describe());
        return Ok(());
    };
    let params = util::read_params_file(&arg.params)?;
    let partition = partition::partition(&params, &shape)
        .with_context(|| format!("Parameters do not fit {}", model.describe()))?;

    println!("{}", model.describe());
    for phase in 0..partition.phase_count() {
        let sizes = shape.layer_sizes(phase).unwrap_or_default();
        println!("phase {phase}: layers {sizes:?}");
        for (layer, slot) in partition.layout().phase_slots(phase).iter().enumerate() {
            println!(
                "  W{layer}: {} x {} at {}..{}",
                slot.rows,
                slot.cols,
                slot.range().start,
                slot.range().end
            );
        }
    }
    println!(
        "parameters: {} used, {} unused",
        partition.consumed(),
        partition.unused()
    );
    Ok(())
}
