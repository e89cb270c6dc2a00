//! Conflict and alert detection over predicted dates and health records.

use crate::types::*;
use crate::window::{heat_window_at, CONFLICT_TOLERANCE_DAYS};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Whether the next vaccination lands within ±30 days of the next heat
///
/// Always `false` while the dog is pregnant or when either date is unknown.
pub fn detect_vaccination_heat_conflict(
    next_vaccination: Option<NaiveDate>,
    next_heat: Option<NaiveDate>,
    is_pregnant: bool,
) -> bool {
    find_vaccination_heat_conflict(next_vaccination, next_heat, is_pregnant).is_some()
}

/// Structured form of [`detect_vaccination_heat_conflict`]
pub fn find_vaccination_heat_conflict(
    next_vaccination: Option<NaiveDate>,
    next_heat: Option<NaiveDate>,
    is_pregnant: bool,
) -> Option<SchedulingConflict> {
    // Suppressed during pregnancy; pending product confirmation.
    if is_pregnant {
        return None;
    }
    let (vaccination, heat) = (next_vaccination?, next_heat?);

    if !heat_window_at(heat).in_conflict_window(vaccination) {
        return None;
    }

    tracing::debug!(
        "Vaccination on {} falls within {} days of heat on {}",
        vaccination,
        CONFLICT_TOLERANCE_DAYS,
        heat
    );
    Some(SchedulingConflict {
        kind: ConflictKind::VaccinationHeatOverlap,
        predicted_a: vaccination,
        predicted_b: heat,
    })
}

/// Reason a health observation needs attention
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Concern {
    MarkedAbnormal,
    Appetite(Appetite),
    Energy(EnergyLevel),
    Stool(StoolConsistency),
}

impl std::fmt::Display for Concern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Concern::MarkedAbnormal => write!(f, "marked abnormal"),
            Concern::Appetite(level) => write!(f, "appetite {}", level.label()),
            Concern::Energy(level) => write!(f, "energy {}", level.label()),
            Concern::Stool(level) => write!(f, "stool {}", level.label()),
        }
    }
}

fn is_concerning_appetite(appetite: &Appetite) -> bool {
    match appetite {
        Appetite::Poor | Appetite::NoAppetite => true,
        Appetite::Excellent
        | Appetite::Good
        | Appetite::Normal
        | Appetite::Fair
        | Appetite::Unrecognized(_) => false,
    }
}

fn is_concerning_energy(energy: &EnergyLevel) -> bool {
    match energy {
        EnergyLevel::Low | EnergyLevel::VeryLow => true,
        EnergyLevel::High | EnergyLevel::Normal | EnergyLevel::Unrecognized(_) => false,
    }
}

fn is_concerning_stool(stool: &StoolConsistency) -> bool {
    match stool {
        StoolConsistency::Loose
        | StoolConsistency::Watery
        | StoolConsistency::Bloody
        | StoolConsistency::Mucousy => true,
        StoolConsistency::Normal
        | StoolConsistency::Firm
        | StoolConsistency::Soft
        | StoolConsistency::Unrecognized(_) => false,
    }
}

/// Every reason the observation is concerning, in a stable order
pub fn indicator_concerns(record: &HealthIndicatorRecord) -> Vec<Concern> {
    let mut concerns = Vec::new();

    if record.abnormal {
        concerns.push(Concern::MarkedAbnormal);
    }
    if let Some(appetite) = record.appetite.as_ref().filter(|a| is_concerning_appetite(a)) {
        concerns.push(Concern::Appetite(appetite.clone()));
    }
    if let Some(energy) = record.energy.as_ref().filter(|e| is_concerning_energy(e)) {
        concerns.push(Concern::Energy(energy.clone()));
    }
    if let Some(stool) = record
        .stool_consistency
        .as_ref()
        .filter(|s| is_concerning_stool(s))
    {
        concerns.push(Concern::Stool(stool.clone()));
    }

    concerns
}

/// Whether any single indicator is in its concerning set
pub fn is_concerning_indicator(record: &HealthIndicatorRecord) -> bool {
    record.abnormal
        || record.appetite.as_ref().is_some_and(is_concerning_appetite)
        || record.energy.as_ref().is_some_and(is_concerning_energy)
        || record
            .stool_consistency
            .as_ref()
            .is_some_and(is_concerning_stool)
}
