use anyhow::Context;
use orbit_layout::Dataset;
use std::path::Path;

const DEMO_DATASET: &str = include_str!("demo.json");

pub fn demo() -> anyhow::Result<Dataset> {
    parse(DEMO_DATASET).context("Bundled demo dataset is invalid")
}

/// Reads and validates a dataset, or the bundled demo when `path` is `None`.
pub fn load(path: Option<&Path>) -> anyhow::Result<Dataset> {
    let Some(path) = path else {
        log::info!("No dataset given, using the bundled demo");
        return demo();
    };
    let json = fs_err::read_to_string(path)?;
    parse(&json).with_context(|| format!("Invalid dataset {}", path.display()))
}

pub fn parse(json: &str) -> anyhow::Result<Dataset> {
    let dataset: Dataset = serde_json::from_str(json)?;
    dataset.validate()?;
    log::debug!(
        "Loaded dataset '{}' with {} group(s)",
        dataset.center.label,
        dataset.groups.len()
    );
    Ok(dataset)
}
