use std::path::PathBuf;

use clap::{Parser, Subcommand};
use phasebridge_model::{config::PhaseConfig, model::ModelSpec};

use crate::util;

use self::{act::ActArg, inspect::InspectArg, param_count::ParamCountArg};

mod act;
mod inspect;
mod param_count;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Print the parameter vector length a model needs for a game
    ParamCount(#[clap(flatten)] ParamCountArg),
    /// Print how a parameter vector is split into per-phase weight matrices
    Inspect(#[clap(flatten)] InspectArg),
    /// Read one observation from stdin and print the model's action line
    Act(#[clap(flatten)] ActArg),
}

/// Game and model description files shared by every subcommand.
#[derive(Debug, Clone, clap::Args)]
struct ModelFiles {
    /// Game configuration JSON file
    #[arg(long)]
    game: PathBuf,
    /// Model description JSON file
    #[arg(long)]
    model: PathBuf,
}

impl ModelFiles {
    fn load(&self) -> anyhow::Result<(PhaseConfig, ModelSpec)> {
        let game = util::read_game_file(&self.game)?;
        let model = util::read_model_file(&self.model)?;
        log::debug!("loaded model: {}", model.describe());
        Ok((game, model))
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::ParamCount(arg) => param_count::run(&arg)?,
        Mode::Inspect(arg) => inspect::run(&arg)?,
        Mode::Act(arg) => act::run(&arg)?,
    }
    Ok(())
}
