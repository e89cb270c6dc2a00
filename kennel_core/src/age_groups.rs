//! Puppy age-group table.
//!
//! Groups are contiguous, non-overlapping day ranges starting at day 0. Ages
//! past the last group land in the open-ended fallback group, so every
//! non-negative age has exactly one group.

use crate::types::{AgeGroup, AgeGroupTable};
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::path::Path;

/// Cached default table - built once and reused across all operations
static DEFAULT_AGE_GROUPS: Lazy<AgeGroupTable> = Lazy::new(build_default_age_groups);

/// Get a reference to the cached default table
pub fn default_age_groups() -> &'static AgeGroupTable {
    &DEFAULT_AGE_GROUPS
}

fn group(id: &str, start_day: u32, end_day: Option<u32>, name: &str, description: &str) -> AgeGroup {
    AgeGroup {
        id: id.into(),
        start_day,
        end_day,
        name: name.into(),
        description: description.into(),
    }
}

/// Builds the default age-group table
pub fn build_default_age_groups() -> AgeGroupTable {
    AgeGroupTable {
        groups: vec![
            group(
                "first24hours",
                0,
                Some(0),
                "First 24 Hours",
                "Newborn: confirm nursing, weigh, keep warm",
            ),
            group(
                "neonatal",
                1,
                Some(13),
                "Neonatal",
                "Eyes and ears closed, daily weights",
            ),
            group(
                "transitional",
                14,
                Some(20),
                "Transitional",
                "Eyes and ears opening, first steps",
            ),
            group(
                "early_socialization",
                21,
                Some(34),
                "Early Socialization",
                "Play with littermates, first solid food",
            ),
            group(
                "weaning",
                35,
                Some(48),
                "Weaning",
                "Moving to solid food, first vaccinations",
            ),
            group(
                "go_home_ready",
                49,
                Some(83),
                "Go-Home Ready",
                "Eligible for placement with new families",
            ),
        ],
        fallback: group(
            "juvenile",
            84,
            None,
            "Juvenile",
            "Past the tracked puppy stages",
        ),
    }
}

impl AgeGroupTable {
    /// Group for a given age in days, or the fallback past the last group
    pub fn find(&self, age_in_days: u32) -> &AgeGroup {
        self.groups
            .iter()
            .find(|g| g.contains(age_in_days))
            .unwrap_or(&self.fallback)
    }

    /// Look up a group (including the fallback) by id
    pub fn get(&self, id: &str) -> Option<&AgeGroup> {
        self.groups
            .iter()
            .chain(std::iter::once(&self.fallback))
            .find(|g| g.id == id)
    }

    /// Groups in display order, fallback last
    pub fn ordered(&self) -> impl Iterator<Item = &AgeGroup> {
        self.groups.iter().chain(std::iter::once(&self.fallback))
    }

    /// Validate that the groups partition `[0, ∞)`
    ///
    /// Returns a list of problems; an empty list means the table is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.groups.is_empty() {
            errors.push("Age group table has no groups".to_string());
        }

        let mut seen_ids = HashSet::new();
        for g in self.ordered() {
            if g.id.is_empty() {
                errors.push("Age group has empty ID".to_string());
            } else if !seen_ids.insert(g.id.as_str()) {
                errors.push(format!("Duplicate age group ID '{}'", g.id));
            }
            if g.name.is_empty() {
                errors.push(format!("Age group '{}' has empty name", g.id));
            }
        }

        let mut expected_start = 0u32;
        for g in &self.groups {
            let Some(end) = g.end_day else {
                errors.push(format!(
                    "Age group '{}' is open-ended; only the fallback may be",
                    g.id
                ));
                continue;
            };
            if end < g.start_day {
                errors.push(format!(
                    "Age group '{}': end day {} < start day {}",
                    g.id, end, g.start_day
                ));
            }
            if g.start_day > expected_start {
                errors.push(format!(
                    "Gap before age group '{}': days {}..={} are not covered",
                    g.id,
                    expected_start,
                    g.start_day - 1
                ));
            } else if g.start_day < expected_start {
                errors.push(format!(
                    "Age group '{}' overlaps the previous group (starts at day {}, expected {})",
                    g.id, g.start_day, expected_start
                ));
            }
            expected_start = end.saturating_add(1);
        }

        if self.fallback.end_day.is_some() {
            errors.push(format!(
                "Fallback group '{}' must be open-ended",
                self.fallback.id
            ));
        }
        if self.fallback.start_day != expected_start {
            errors.push(format!(
                "Fallback group '{}' starts at day {}, expected {}",
                self.fallback.id, self.fallback.start_day, expected_start
            ));
        }

        errors
    }

    /// Load a custom table from a TOML file and validate it
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let table: AgeGroupTable = toml::from_str(&contents)?;
        table.ensure_valid()?;
        tracing::info!("Loaded {} age groups from {:?}", table.groups.len(), path);
        Ok(table)
    }

    /// Turn validation problems into an error
    pub fn ensure_valid(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::AgeGroupTable(errors.join("; ")))
        }
    }
}
