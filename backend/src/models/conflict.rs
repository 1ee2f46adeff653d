//! Conflict severities and grouped conflict listings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::CourseName;

/// How strongly two courses should avoid overlapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Severity {
    #[default]
    Heavy,
    Medium,
    Light,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Heavy, Severity::Medium, Severity::Light];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Heavy => "Heavy",
            Severity::Medium => "Medium",
            Severity::Light => "Light",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "heavy" => Ok(Severity::Heavy),
            "medium" => Ok(Severity::Medium),
            "light" => Ok(Severity::Light),
            _ => Err(format!("Unknown conflict severity: {}", s)),
        }
    }
}

/// A declared conflict between a section and a peer course.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConflictEntry {
    /// Course display form, e.g. `"CMS 200 - H"`.
    pub peer: CourseName,
    pub severity: Severity,
}

impl ConflictEntry {
    pub fn new(peer: impl Into<CourseName>, severity: Severity) -> Self {
        Self {
            peer: peer.into(),
            severity,
        }
    }
}

/// Conflicts partitioned by severity, as the panes display them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroupedConflicts {
    #[serde(default)]
    pub heavy: Vec<String>,
    #[serde(default)]
    pub medium: Vec<String>,
    #[serde(default)]
    pub light: Vec<String>,
}

impl GroupedConflicts {
    /// Group entries, keeping their relative order and dropping repeats.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a ConflictEntry>) -> Self {
        let mut grouped = Self::default();
        for entry in entries {
            grouped.push(entry.peer.as_str(), entry.severity);
        }
        grouped
    }

    /// Append `name` to the bucket for `severity` unless already present there.
    pub fn push(&mut self, name: &str, severity: Severity) {
        let bucket = self.bucket_mut(severity);
        if !bucket.iter().any(|n| n == name) {
            bucket.push(name.to_string());
        }
    }

    pub fn bucket(&self, severity: Severity) -> &[String] {
        match severity {
            Severity::Heavy => &self.heavy,
            Severity::Medium => &self.medium,
            Severity::Light => &self.light,
        }
    }

    fn bucket_mut(&mut self, severity: Severity) -> &mut Vec<String> {
        match severity {
            Severity::Heavy => &mut self.heavy,
            Severity::Medium => &mut self.medium,
            Severity::Light => &mut self.light,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.heavy.is_empty() && self.medium.is_empty() && self.light.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heavy.len() + self.medium.len() + self.light.len()
    }
}
