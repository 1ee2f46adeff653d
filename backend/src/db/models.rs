//! Catalog seed data for the timetable store.

use std::fs;
use std::path::Path;

pub use crate::api::{CatalogSeed, RoomName, TimeslotCategory, TimeslotName};

use super::repository::{ErrorContext, RepositoryError, RepositoryResult};

const INSTRUCTORS: &[&str] = &[
    "Myers, Daniel S.",
    "Anderson, Mark",
    "Carrington, Julie",
    "Anderson, Julie A.",
    "Summet, Valerie",
    "Vitray, Rick",
    "Yellen, Jay",
    "Teymuroglu, Zeynep",
    "Rejniak, Gabriel",
    "Boyd, Sheri",
];

const ROOMS: &[&str] = &[
    "BUSH 105", "BUSH 110", "BUSH 120", "BUSH 301", "BUSH 310", "CSS 201", "CSS 203", "CSS 205",
    "CSS 207", "KEENE 101", "KEENE 106", "KEENE 112",
];

const MATRIX: &[(&str, &[&str])] = &[
    (
        "MWF for 50 minutes",
        &[
            "MWF 8:00 - 8:50",
            "MWF 10:00 - 10:50",
            "MWF 11:00 - 11:50",
            "MWF 13:00 - 13:50",
            "MWF 15:00 - 15:50",
        ],
    ),
    (
        "TR for 75 minutes",
        &[
            "TR 09:00 - 10:15",
            "TR 11:00 - 12:15",
            "TR 14:00 - 15:15",
            "TR 15:30 - 16:45",
        ],
    ),
    (
        "MW for 75 minutes",
        &[
            "MW 10:00 - 11:15",
            "MW 11:30 - 12:45",
            "MW 13:00 - 14:15",
            "MW 14:30 - 15:45",
        ],
    ),
];

impl CatalogSeed {
    /// Built-in campus: ten instructors, three buildings and the standard
    /// timeslot matrix.
    pub fn default_campus() -> Self {
        Self {
            instructors: INSTRUCTORS.iter().map(|s| s.to_string()).collect(),
            rooms: ROOMS.iter().map(|s| RoomName::new(*s)).collect(),
            timeslot_categories: MATRIX
                .iter()
                .map(|(name, slots)| TimeslotCategory {
                    name: name.to_string(),
                    timeslots: slots.iter().map(|s| TimeslotName::new(*s)).collect(),
                })
                .collect(),
        }
    }

    /// Load a catalog from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            RepositoryError::configuration_with_context(
                format!("Failed to read catalog file: {}", e),
                ErrorContext::new("load_catalog").with_entity_id(path.display()),
            )
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> RepositoryResult<Self> {
        let seed: CatalogSeed = serde_json::from_str(content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse catalog: {}", e))
        })?;
        seed.validate()?;
        Ok(seed)
    }

    /// Every matrix timeslot must parse.
    pub fn validate(&self) -> RepositoryResult<()> {
        for category in &self.timeslot_categories {
            for slot in &category.timeslots {
                slot.parse().map_err(|e| {
                    RepositoryError::configuration_with_context(
                        e.to_string(),
                        ErrorContext::new("load_catalog").with_entity(category.name.clone()),
                    )
                })?;
            }
        }
        Ok(())
    }
}
