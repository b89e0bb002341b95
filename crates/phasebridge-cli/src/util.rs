use std::{fs::File, io, path::Path};

use anyhow::Context;
use phasebridge_model::{config::PhaseConfig, model::ModelSpec};

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Reads a game configuration (`game_phases`, `input_sizes`, `output_sizes`).
pub fn read_game_file<P>(path: P) -> anyhow::Result<PhaseConfig>
where
    P: AsRef<Path>,
{
    read_json_file("game config", path)
}

pub fn read_model_file<P>(path: P) -> anyhow::Result<ModelSpec>
where
    P: AsRef<Path>,
{
    read_json_file("model", path)
}

/// Reads a parameter vector stored as a plain JSON array of numbers.
pub fn read_params_file<P>(path: P) -> anyhow::Result<Vec<f64>>
where
    P: AsRef<Path>,
{
    read_json_file("parameters", path)
}

/// Parses one whitespace-separated observation line.
pub fn parse_observation(line: &str) -> anyhow::Result<Vec<f64>> {
    line.split_whitespace()
        .map(|token| {
            token
                .parse::<f64>()
                .with_context(|| format!("Invalid observation value: {token:?}"))
        })
        .collect()
}
