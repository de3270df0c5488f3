// src/config/mod.rs

//! Configuration: the TOML format, loading, and validation.
//!
//! The rest of the crate only sees the validated [`Config`] and its
//! [`Block`]s.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_and_validate_with, load_from_path, parse_str};
pub use model::{Block, Config, RawBlock, RawConfigFile};
