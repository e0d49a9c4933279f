//! file: core/src/config.rs
//! description: lowering and batch settings, loadable from a JSON file.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes. Command line flags are applied on top by the CLI.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LowerOptions {
    /// Keep PHP fallthrough between switch cases instead of closing every
    /// case with an implicit `break;`.
    pub switch_fallthrough: bool,
    /// Deepest expression/statement nesting lowered before the file fails.
    pub max_depth: usize,
}

impl Default for LowerOptions {
    fn default() -> Self {
        LowerOptions {
            switch_fallthrough: false,
            max_depth: 256,
        }
    }
}

/// Stack reserved for every thread that parses or lowers a file, plus this
/// much per allowed nesting level. Sized for unoptimized builds.
const BASE_STACK_SIZE: usize = 8 * 1024 * 1024;
const STACK_PER_LEVEL: usize = 128 * 1024;

impl LowerOptions {
    /// Thread stack size that fits `max_depth` levels of parsing and lowering.
    pub fn stack_size(&self) -> usize {
        BASE_STACK_SIZE.saturating_add(self.max_depth.saturating_mul(STACK_PER_LEVEL))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    /// Appended to the input directory name to form the output directory.
    pub output_suffix: String,
    /// Wrap each listing in `<?php` / `?>`.
    pub wrap_php_tags: bool,
    /// Worker threads; 0 leaves the choice to rayon.
    pub jobs: usize,
    #[serde(skip)]
    pub lower: LowerOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        BatchOptions {
            output_suffix: "_TAC".to_string(),
            wrap_php_tags: true,
            jobs: 0,
            lower: LowerOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TacConfig {
    pub lower: LowerOptions,
    pub batch: BatchOptions,
}

impl TacConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<TacConfig, String> {
        let raw = std::fs::read_to_string(&path).map_err(|e| format!("read config: {}", e))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<TacConfig, String> {
        serde_json::from_str(raw).map_err(|e| format!("parse config: {}", e))
    }

    /// Batch options carrying this config's lowering options.
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            lower: self.lower.clone(),
            ..self.batch.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = TacConfig::from_json(r#"{ "lower": { "switch_fallthrough": true } }"#).unwrap();
        assert!(config.lower.switch_fallthrough);
        assert_eq!(config.lower.max_depth, 256);
        assert_eq!(config.batch.output_suffix, "_TAC");
        assert!(config.batch_options().lower.switch_fallthrough);
    }

    #[test]
    fn stack_grows_with_depth_limit() {
        let shallow = LowerOptions { max_depth: 16, ..LowerOptions::default() };
        assert!(shallow.stack_size() < LowerOptions::default().stack_size());
        assert_eq!(LowerOptions::default().stack_size(), 40 * 1024 * 1024);
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = TacConfig::from_json("{ nope").unwrap_err();
        assert!(err.starts_with("parse config:"));
    }
}
