#![allow(dead_code)]

use std::collections::BTreeMap;

use modwatch::config::{Config, RawBlock, RawConfigFile};

/// Builder for `Config` to simplify test setup.
pub struct ConfigBuilder {
    config: RawConfigFile,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                vars: BTreeMap::new(),
                block: Vec::new(),
            },
        }
    }

    pub fn with_block(mut self, block: RawBlock) -> Self {
        self.config.block.push(block);
        self
    }

    pub fn with_var(mut self, name: &str, value: &str) -> Self {
        self.config.vars.insert(name.to_string(), value.to_string());
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> Config {
        Config::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `RawBlock`.
pub struct BlockBuilder {
    block: RawBlock,
}

impl BlockBuilder {
    pub fn new() -> Self {
        Self {
            block: RawBlock::default(),
        }
    }

    pub fn include(mut self, pattern: &str) -> Self {
        self.block.include.push(pattern.to_string());
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.block.exclude.push(pattern.to_string());
        self
    }

    pub fn prep(mut self, cmd: &str) -> Self {
        self.block.prep.push(cmd.to_string());
        self
    }

    pub fn daemon(mut self, cmd: &str) -> Self {
        self.block.daemon.push(cmd.to_string());
        self
    }

    pub fn var(mut self, name: &str, value: &str) -> Self {
        self.block.vars.insert(name.to_string(), value.to_string());
        self
    }

    pub fn no_common_filter(mut self, val: bool) -> Self {
        self.block.no_common_filter = val;
        self
    }

    pub fn build(self) -> RawBlock {
        self.block
    }
}

impl Default for BlockBuilder {
    fn default() -> Self {
        Self::new()
    }
}
