//! Script files
//!
//! A script is a command list stored as TOML or JSON:
//!
//! ```toml
//! quiet = false
//!
//! [[commands]]
//! address = { line = 2 }
//! until = { pattern = "^end" }
//! cmd = "change"
//! text = "REPLACED"
//! ```

use crate::builder::compile;
use crate::command::Command;
use crate::error::CompileError;
use crate::program::Program;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Suppress the automatic print at the end of each cycle
    #[serde(default)]
    pub quiet: bool,

    #[serde(default)]
    pub commands: Vec<Command>,
}

impl Script {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse TOML script")
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse JSON script")
    }

    /// Lower the script; `force_quiet` overrides the script's own setting
    pub fn compile(&self, force_quiet: bool) -> std::result::Result<Program, CompileError> {
        compile(&self.commands, self.quiet || force_quiet)
    }
}

/// Load a script, choosing the format by extension (`.json` or TOML)
pub fn load_script(path: &Path) -> Result<Script> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read script: {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let script = if is_json {
        Script::from_json(&text)
    } else {
        Script::from_toml(&text)
    };
    script.with_context(|| format!("Invalid script: {}", path.display()))
}
