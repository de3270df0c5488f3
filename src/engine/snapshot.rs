// src/engine/snapshot.rs

use std::sync::Arc;

use crate::config::{Block, Config};

/// An immutable, versioned view of the configuration.
///
/// Blocks already carry the common excludes. A reload publishes a new
/// snapshot; anything still holding the old one keeps a consistent view.
#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    version: u64,
    config: Arc<Config>,
}

impl ConfigSnapshot {
    pub fn initial(config: Config) -> Self {
        Self::publish(1, config)
    }

    /// The snapshot that supersedes this one.
    pub fn next(&self, config: Config) -> Self {
        Self::publish(self.version + 1, config)
    }

    fn publish(version: u64, config: Config) -> Self {
        let blocks = config
            .blocks()
            .iter()
            .map(Block::with_common_excludes)
            .collect();
        Self {
            version,
            config: Arc::new(Config::new_unchecked(config.vars().clone(), blocks)),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn blocks(&self) -> &[Block] {
        self.config.blocks()
    }
}
