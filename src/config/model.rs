// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::watch::COMMON_EXCLUDES;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [vars]
/// PORT = "8080"
///
/// [[block]]
/// include = ["**/*.go"]
/// exclude = ["vendor/"]
/// prep = ["go test @dirmods"]
/// daemon = ["go run ./cmd/server"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    /// Variables exported to every block's commands.
    #[serde(default)]
    pub vars: BTreeMap<String, String>,

    /// Rule blocks, in the order they are processed.
    #[serde(default)]
    pub block: Vec<RawBlock>,
}

/// One `[[block]]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawBlock {
    /// Paths this block reacts to. Empty means everything.
    #[serde(default)]
    pub include: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,

    /// Opt out of the built-in excludes (VCS dirs, editor swap files, ...).
    #[serde(default)]
    pub no_common_filter: bool,

    /// Short-lived commands run to completion on each relevant change.
    #[serde(default)]
    pub prep: Vec<String>,

    /// Long-lived commands restarted after a successful prep.
    #[serde(default)]
    pub daemon: Vec<String>,

    /// Block-local variables; override `[vars]` entries of the same name.
    #[serde(default)]
    pub vars: BTreeMap<String, String>,
}

/// A validated rule block. Never mutated after validation; a reload builds
/// fresh blocks instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Position in the config file, starting at 0.
    pub index: usize,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub no_common_filter: bool,
    pub prep: Vec<String>,
    pub daemon: Vec<String>,
    /// Global and block variables, already merged.
    pub variables: BTreeMap<String, String>,
}

impl Block {
    /// Human-facing name used in logs.
    pub fn label(&self) -> String {
        format!("block {}", self.index + 1)
    }

    /// Copy of this block with [`COMMON_EXCLUDES`] appended, unless the block
    /// opted out.
    pub fn with_common_excludes(&self) -> Block {
        let mut block = self.clone();
        if !block.no_common_filter {
            block
                .exclude
                .extend(COMMON_EXCLUDES.iter().map(|p| p.to_string()));
        }
        block
    }

    /// Patterns that decide which directories must be watched.
    pub fn watch_patterns(&self) -> Vec<String> {
        if self.include.is_empty() {
            vec!["**".to_string()]
        } else {
            self.include.clone()
        }
    }
}

/// Validated configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    vars: BTreeMap<String, String>,
    blocks: Vec<Block>,
}

impl Config {
    /// Build without validation. Prefer `Config::try_from(RawConfigFile)`.
    pub fn new_unchecked(vars: BTreeMap<String, String>, blocks: Vec<Block>) -> Self {
        Self { vars, blocks }
    }

    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Union of every block's watch patterns, in block order.
    pub fn watch_patterns(&self) -> Vec<String> {
        self.blocks.iter().flat_map(Block::watch_patterns).collect()
    }
}
