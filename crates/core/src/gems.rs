//! Gemstone lists: the structured `{name, carats?}` form stored in
//! `aiInputs.primaryGems` and the free-text form admins type into the
//! generator (`Diamond (2 carats), Ruby`).

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum number of gems accepted in one list.
pub const MAX_GEMS: usize = 20;

/// Maximum length of a single gem name.
pub const MAX_GEM_NAME_LENGTH: usize = 100;

/// Matches `Name (N carats)`, `Name (N ct)`, `Name (N)`; case-insensitive.
const GEM_WITH_CARATS_PATTERN: &str =
    r"(?i)^(?P<name>.+?)\s*\(\s*(?P<carats>\d+(?:\.\d+)?)\s*(?:carats?|cts?\.?)?\s*\)$";

static GEM_WITH_CARATS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(GEM_WITH_CARATS_PATTERN).expect("valid regex"));

/// One gemstone entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carats: Option<f64>,
}

impl Gem {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            carats: None,
        }
    }

    pub fn with_carats(name: impl Into<String>, carats: f64) -> Self {
        Self {
            name: name.into(),
            carats: Some(carats),
        }
    }
}

/// Parse a comma-separated gem list.
///
/// Entries matching `Name (N carats)` get a weight; anything else is kept as
/// a name-only gem. Blank entries are dropped.
pub fn parse_gem_list(text: &str) -> Vec<Gem> {
    text.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_gem_entry)
        .collect()
}

fn parse_gem_entry(entry: &str) -> Gem {
    if let Some(caps) = GEM_WITH_CARATS_RE.captures(entry) {
        let carats = caps["carats"].parse::<f64>().ok();
        return Gem {
            name: caps["name"].trim().to_string(),
            carats,
        };
    }
    Gem::named(entry)
}

/// Validate a structured gem list.
pub fn validate_gems(gems: &[Gem]) -> Result<(), CoreError> {
    if gems.len() > MAX_GEMS {
        return Err(CoreError::Validation(format!(
            "At most {MAX_GEMS} gems may be listed (got {})",
            gems.len()
        )));
    }
    for gem in gems {
        let name = gem.name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("Gem name must not be empty".into()));
        }
        if name.len() > MAX_GEM_NAME_LENGTH {
            return Err(CoreError::Validation(format!(
                "Gem name exceeds maximum length of {MAX_GEM_NAME_LENGTH} characters"
            )));
        }
        if let Some(c) = gem.carats {
            if !c.is_finite() || c <= 0.0 {
                return Err(CoreError::Validation(format!(
                    "Carat weight for '{name}' must be a positive number"
                )));
            }
        }
    }
    Ok(())
}
