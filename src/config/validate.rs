// src/config/validate.rs

use std::sync::LazyLock;

use regex::Regex;

use crate::config::model::{Block, Config, RawBlock, RawConfigFile};
use crate::errors::{ModwatchError, Result};

static VAR_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("variable name regex is valid")
});

impl TryFrom<RawConfigFile> for Config {
    type Error = crate::errors::ModwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;

        let blocks = raw
            .block
            .into_iter()
            .enumerate()
            .map(|(index, b)| {
                let mut variables = raw.vars.clone();
                variables.extend(b.vars);
                Block {
                    index,
                    include: b.include,
                    exclude: b.exclude,
                    no_common_filter: b.no_common_filter,
                    prep: b.prep,
                    daemon: b.daemon,
                    variables,
                }
            })
            .collect();

        Ok(Config::new_unchecked(raw.vars, blocks))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_blocks(cfg)?;
    validate_var_names(cfg.vars.keys(), "[vars]")?;
    for (i, block) in cfg.block.iter().enumerate() {
        validate_block(i, block)?;
    }
    Ok(())
}

fn ensure_has_blocks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.block.is_empty() {
        return Err(ModwatchError::ConfigError(
            "config must contain at least one [[block]] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_var_names<'a>(
    names: impl IntoIterator<Item = &'a String>,
    context: &str,
) -> Result<()> {
    for name in names {
        if !VAR_NAME.is_match(name) {
            return Err(ModwatchError::ConfigError(format!(
                "{context}: invalid variable name '{name}' (expected letters, digits and '_', not starting with a digit)"
            )));
        }
    }
    Ok(())
}

fn validate_block(index: usize, block: &RawBlock) -> Result<()> {
    let context = format!("block {}", index + 1);

    if block.prep.is_empty() && block.daemon.is_empty() {
        return Err(ModwatchError::ConfigError(format!(
            "{context} has neither prep nor daemon commands"
        )));
    }

    for cmd in block.prep.iter().chain(block.daemon.iter()) {
        if cmd.trim().is_empty() {
            return Err(ModwatchError::ConfigError(format!(
                "{context} contains an empty command"
            )));
        }
    }

    validate_var_names(block.vars.keys(), &context)
}
