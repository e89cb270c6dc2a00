#![forbid(unsafe_code)]

//! Core domain logic for the kennel lifecycle predictor.
//!
//! This crate provides:
//! - Domain types (profiles, windows, frequencies, health indicators)
//! - Event extraction from raw store records
//! - Window calculation (heat, gestation, vaccination, medication, age)
//! - Conflict and health-alert detection
//! - Puppy age-group table
//! - Lifecycle summaries and the upcoming-events schedule
//! - Record store and configuration

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod extract;
pub mod window;
pub mod detect;
pub mod age_groups;
pub mod summary;
pub mod store;
pub mod schedule;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use age_groups::{build_default_age_groups, default_age_groups};
pub use extract::{
    extract_health_indicator, extract_medication_record, extract_puppy_age_record,
    extract_reproductive_profile, extract_vaccination_profile, parse_date,
};
pub use window::{
    compute_age_group, compute_due_date, compute_gestation_window, compute_heat_window, heat_window_at,
    compute_next_heat, compute_next_medication_dose, compute_next_medication_dose_strict,
    compute_next_vaccination,
};
pub use detect::{
    detect_vaccination_heat_conflict, find_vaccination_heat_conflict, indicator_concerns,
    is_concerning_indicator, Concern,
};
pub use summary::{
    group_puppies_by_age, health_alerts, summarize_dog, summarize_medication, summarize_puppy,
    AgeGroupBucket, DogLifecycleSummary, HealthAlert, MedicationSchedule, PuppyAgeSummary,
};
pub use store::{JsonlStore, RecordKind, RecordStore};
pub use schedule::{build_schedule, write_schedule_csv, EventKind, ScheduledEvent};
