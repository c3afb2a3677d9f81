use anyhow::{Result, Context as AnyhowContext};
use std::fs;
use std::path::Path;
use crate::config::EngineConfig;
use crate::runtime::context::EventContext;
use crate::runtime::run::Flow;

/// Reads a flow record from a YAML or JSON file (JSON is valid YAML)
pub fn load_flow_from_file(file_path: &Path) -> Result<Flow> {
    let content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read flow file {}", file_path.display()))?;

    let flow: Flow = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to deserialize flow from {}", file_path.display()))?;

    Ok(flow)
}

/// Loads every `.yaml`, `.yml` and `.json` file of a directory, sorted by path
pub fn load_flows_from_dir(dir: &Path) -> Result<Vec<Flow>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read directory {}", dir.display()))? {
        let path = entry?.path();
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or_default();
        if matches!(ext, "yaml" | "yml" | "json") {
            paths.push(path);
        }
    }
    paths.sort();

    paths.iter().map(|p| load_flow_from_file(p)).collect()
}

pub fn load_event_from_file(file_path: &Path) -> Result<EventContext> {
    let content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read event file {}", file_path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to deserialize event from {}", file_path.display()))
}

pub fn load_config(file_path: &Path) -> Result<EngineConfig> {
    let content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read config file {}", file_path.display()))?;

    if content.trim().is_empty() {
        return Ok(EngineConfig::default());
    }

    let config: EngineConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to deserialize config from {}", file_path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config in {}", file_path.display()))?;

    Ok(config)
}
