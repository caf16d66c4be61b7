//! Channel name normalization.
//!
//! Raw logger field names may contain anything (`"T(1)"`, `"CO2 ppm"`,
//! `"1st_sample"`). Catalog identifiers follow a C-like grammar:
//! `^[A-Za-z_][A-Za-z0-9_]*$`.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Tob1Error;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier grammar"));
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("disallowed character class"));
static DISALLOWED_LEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+").expect("disallowed leading class"));

/// A regex substitution applied to raw channel names before sanitization.
///
/// The replacement uses `regex` syntax, so `$1` / `${name}` refer to capture
/// groups of the pattern.
#[derive(Debug, Clone)]
pub struct RenameRule {
    pattern: Regex,
    replacement: String,
}

impl RenameRule {
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self, Tob1Error> {
        let pattern = Regex::new(pattern).map_err(|e| {
            Tob1Error::InvalidConfig(format!("invalid rename pattern {:?}: {}", pattern, e))
        })?;
        Ok(Self { pattern, replacement: replacement.into() })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Apply the substitution to every match in `name`.
    pub fn apply<'a>(&self, name: &'a str) -> Cow<'a, str> {
        self.pattern.replace_all(name, self.replacement.as_str())
    }
}

/// Returns true if `id` is a valid catalog identifier.
pub fn is_valid_identifier(id: &str) -> bool {
    IDENTIFIER.is_match(id)
}

/// Map a raw channel name to a catalog identifier.
///
/// # Arguments
/// * `raw_name` - Name exactly as stored in the file.
/// * `rule` - Optional rename rule applied before sanitization.
///
/// # Returns
/// `Some(identifier)` or `None` when nothing representable remains. Rejection
/// is an expected outcome; callers skip the channel.
pub fn normalize(raw_name: &str, rule: Option<&RenameRule>) -> Option<String> {
    let renamed = match rule {
        Some(rule) => rule.apply(raw_name),
        None => Cow::Borrowed(raw_name),
    };
    let stripped = DISALLOWED.replace_all(&renamed, "");
    let id = DISALLOWED_LEADING.replace(&stripped, "");

    if is_valid_identifier(&id) {
        Some(id.into_owned())
    } else {
        None
    }
}
