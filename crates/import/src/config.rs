use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::rules::CategoryRule;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read rules file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse rules file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// The rules file is a single JSON object, `{"label": "pattern", ...}`.
///
/// It is deserialized through a map visitor straight into a `Vec` so that
/// file order survives; first-match-wins categorization depends on the
/// rules being evaluated in the order the user wrote them, which a map
/// type would not guarantee.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RuleFile(pub Vec<CategoryRule>);

impl<'de> Deserialize<'de> for RuleFile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RuleFileVisitor;

        impl<'de> Visitor<'de> for RuleFileVisitor {
            type Value = RuleFile;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping category labels to search patterns")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut rules = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((label, pattern)) = map.next_entry::<String, String>()? {
                    rules.push(CategoryRule { label, pattern });
                }
                Ok(RuleFile(rules))
            }
        }

        deserializer.deserialize_map(RuleFileVisitor)
    }
}

/// Loads category rules from `path`, in file order.
///
/// A missing file is not fatal: the converter still runs and every
/// transaction falls through to the default category. A file that exists
/// but does not parse is an error.
pub fn load_rules(path: &Path) -> Result<Vec<CategoryRule>, ConfigError> {
    if !path.is_file() {
        tracing::warn!("categories file does not exist: {}", path.display());
        return Ok(Vec::new());
    }

    tracing::info!("reading categories from {}", path.display());
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let RuleFile(rules) = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(rules)
}
