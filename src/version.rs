//! Version module: the normalization policy applied by CleanVersion steps.
//!
//! The policy is pluggable through [`VersionCleaner`]. Its contract: given the raw extracted
//! value, return the canonical dotted-numeric version token, or `None` when the value carries
//! no version at all (which the step reports as a no-match).

use std::fmt;

pub trait VersionCleaner: Send + Sync {
    fn clean(&self, raw: &str) -> Option<String>;
}

impl fmt::Debug for dyn VersionCleaner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VersionCleaner")
    }
}

/// Strips leading non-numeric noise, turns `_` into `.`, collapses repeated dots and cuts the
/// value at the first character that cannot be part of a version.
///
/// `"v1.2.3-beta"` becomes `"1.2.3"`, `"10_12_6"` becomes `"10.12.6"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultVersionCleaner;

impl VersionCleaner for DefaultVersionCleaner {
    fn clean(&self, raw: &str) -> Option<String> {
        let start = raw.find(|c: char| c.is_ascii_digit())?;
        let mut version = String::with_capacity(raw.len() - start);
        for c in raw[start..].chars() {
            match c {
                '0'..='9' => version.push(c),
                '.' | '_' => {
                    if !version.ends_with('.') {
                        version.push('.');
                    }
                }
                _ => break,
            }
        }
        while version.ends_with('.') {
            version.pop();
        }
        Some(version)
    }
}

/// Uses the first match of a regular expression as the version, then applies the default
/// normalization to it.
#[cfg(feature = "regex")]
#[derive(Debug, Clone)]
pub struct RegexVersionCleaner {
    pattern: regex::Regex,
}

#[cfg(feature = "regex")]
impl RegexVersionCleaner {
    pub fn new(pattern: &str) -> Result<Self, crate::WalkError> {
        let pattern = regex::Regex::new(pattern)
            .map_err(|e| crate::WalkError::ParseError(format!("Invalid version pattern: {e}")))?;
        Ok(Self { pattern })
    }
}

#[cfg(feature = "regex")]
impl VersionCleaner for RegexVersionCleaner {
    fn clean(&self, raw: &str) -> Option<String> {
        let found = self.pattern.find(raw)?;
        DefaultVersionCleaner.clean(found.as_str())
    }
}
