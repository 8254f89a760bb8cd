// FFprobe output parsing for stream and container metadata

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::tools::CommandTemplate;

/// One elementary stream as reported by ffprobe.
pub type StreamDescriptor = Map<String, Value>;

/// Container-level fields (`duration`, `bit_rate`, `tags`, ...).
pub type FormatDescriptor = Map<String, Value>;

/// The two ffprobe sections a record keeps. Other top-level sections
/// (programs, chapters) are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeOutput {
    #[serde(default)]
    pub streams: Vec<StreamDescriptor>,
    #[serde(default)]
    pub format: FormatDescriptor,
}

/// Run ffprobe on a file. Invalid JSON (including empty output) is an error.
pub fn probe(template: &CommandTemplate, path: &Path) -> Result<ProbeOutput> {
    let text = template.run(path)?;
    let output = parse(&text)?;
    log::debug!("ffprobe reported {} streams for {}", output.streams.len(), path.display());
    Ok(output)
}

pub fn parse(text: &str) -> Result<ProbeOutput> {
    Ok(serde_json::from_str(text)?)
}
