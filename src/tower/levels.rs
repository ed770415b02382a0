//! Upgrade-level vectors and their textual form.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

/// How many tiers of each path are unlocked, indexed by path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpgradeLevels(pub Vec<usize>);

impl UpgradeLevels {
    pub fn new(levels: Vec<usize>) -> Self {
        Self(levels)
    }

    /// All paths at level 0
    pub fn zero(path_count: usize) -> Self {
        Self(vec![0; path_count])
    }

    /// Total number of tiers unlocked across all paths
    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    /// Deepest tier unlocked on any path
    pub fn max_level(&self) -> usize {
        self.0.iter().copied().max().unwrap_or(0)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

impl Deref for UpgradeLevels {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for UpgradeLevels {
    fn from(levels: Vec<usize>) -> Self {
        Self(levels)
    }
}

impl From<&[usize]> for UpgradeLevels {
    fn from(levels: &[usize]) -> Self {
        Self(levels.to_vec())
    }
}

impl fmt::Display for UpgradeLevels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|l| l.to_string()).collect();
        write!(f, "{}", parts.join("-"))
    }
}

/// Error parsing an upgrade-level string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid upgrade levels '{input}': {reason}")]
pub struct ParseLevelsError {
    pub input: String,
    pub reason: String,
}

impl FromStr for UpgradeLevels {
    type Err = ParseLevelsError;

    /// Accepts `2-0-0`, `2,0,0`, or compact single digits `200`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let fail = |reason: &str| ParseLevelsError {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        if input.is_empty() {
            return Err(fail("empty"));
        }

        let levels = if input.contains(&['-', ','][..]) {
            input
                .split(&['-', ','][..])
                .map(|part| {
                    part.trim()
                        .parse::<usize>()
                        .map_err(|_| fail(&format!("'{}' is not a level", part.trim())))
                })
                .collect::<Result<Vec<_>, _>>()?
        } else {
            input
                .chars()
                .map(|c| {
                    c.to_digit(10)
                        .map(|d| d as usize)
                        .ok_or_else(|| fail(&format!("'{}' is not a digit", c)))
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(Self(levels))
    }
}
