//! Document codecs: text <-> [`TreeNode`].
//!
//! `TreeNode` is serde-enabled, so each codec only wires a format crate
//! to it and normalises what the format cannot express.

use std::fmt;
use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::{join_path, Mapping, TreeNode};
use crate::infrastructure::error::{InfraError, InfraResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    #[default]
    Yaml,
    Toml,
}

impl DocumentFormat {
    /// Format implied by a file extension (`yaml`, `yml`, `toml`).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    pub fn codec(self) -> Box<dyn DocumentCodec> {
        match self {
            Self::Yaml => Box::new(YamlCodec),
            Self::Toml => Box::new(TomlCodec),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Toml => "toml",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentFormat {
    type Err = InfraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            other => Err(InfraError::codec(other, "unknown document format")),
        }
    }
}

/// Parses and emits one textual document format.
pub trait DocumentCodec {
    fn format(&self) -> DocumentFormat;

    fn parse(&self, text: &str) -> InfraResult<TreeNode>;

    fn emit(&self, node: &TreeNode) -> InfraResult<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct YamlCodec;

impl DocumentCodec for YamlCodec {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Yaml
    }

    fn parse(&self, text: &str) -> InfraResult<TreeNode> {
        if text.trim().is_empty() {
            return Ok(TreeNode::Empty);
        }
        serde_yaml::from_str(text).map_err(|e| InfraError::codec("yaml", e))
    }

    fn emit(&self, node: &TreeNode) -> InfraResult<String> {
        serde_yaml::to_string(node).map_err(|e| InfraError::codec("yaml", e))
    }
}

/// TOML has no null and needs a table at the root.
#[derive(Debug, Default, Clone, Copy)]
pub struct TomlCodec;

impl DocumentCodec for TomlCodec {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Toml
    }

    fn parse(&self, text: &str) -> InfraResult<TreeNode> {
        toml::from_str(text).map_err(|e| InfraError::codec("toml", e))
    }

    fn emit(&self, node: &TreeNode) -> InfraResult<String> {
        if !node.is_mapping() {
            return Err(InfraError::codec(
                "toml",
                format!("root must be a table, found {}", node.kind_name()),
            ));
        }
        toml::to_string(&toml_ready(node, "")?).map_err(|e| InfraError::codec("toml", e))
    }
}

/// Drop null table entries; a null array element has no TOML form.
fn toml_ready(node: &TreeNode, path: &str) -> InfraResult<TreeNode> {
    match node {
        TreeNode::Sequence(items) => {
            let mut ready = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let item_path = format!("{path}[{i}]");
                if item.is_empty() {
                    return Err(InfraError::codec(
                        "toml",
                        format!("null array element at '{item_path}'"),
                    ));
                }
                ready.push(toml_ready(item, &item_path)?);
            }
            Ok(TreeNode::Sequence(ready))
        }
        TreeNode::Mapping(map) => {
            let map = map.borrow();
            let mut ready = Mapping::with_capacity(map.len());
            for (key, value) in map.iter().filter(|(_, v)| !v.is_empty()) {
                ready.insert(key, toml_ready(value, &join_path(path, key))?);
            }
            Ok(TreeNode::from(ready))
        }
        other => Ok(other.clone()),
    }
}
