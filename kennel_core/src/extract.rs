//! Event extraction from raw store records.
//!
//! Raw records come from a loosely typed backend: dates may be missing,
//! `null`, timestamps or garbage, and keys may be snake_case or camelCase.
//! Extraction never fails. Anything that cannot be read becomes `None`
//! ("cannot predict") and is never replaced by a sentinel date.

use crate::types::*;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Parse a JSON value into a calendar date
///
/// Accepted forms:
/// - `2024-01-10`
/// - RFC 3339 timestamps (`2024-01-10T23:30:00-05:00`); the date is taken in
///   the timestamp's own offset, time of day is dropped
/// - naive timestamps (`2024-01-10T08:00:00`, `2024-01-10 08:00:00`)
pub fn parse_date(value: &Value) -> Option<NaiveDate> {
    let raw = value.as_str()?.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }

    tracing::debug!("Unparseable date {:?}, treating as unknown", raw);
    None
}

/// Look up the first present, non-null field among `keys`
fn field<'a>(record: &'a RawRecord, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| !value.is_null())
}

fn date_field(record: &RawRecord, keys: &[&str]) -> Option<NaiveDate> {
    field(record, keys).and_then(parse_date)
}

fn string_field(record: &RawRecord, keys: &[&str]) -> Option<String> {
    field(record, keys)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn bool_field(record: &RawRecord, keys: &[&str]) -> bool {
    match field(record, keys) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn u32_field(record: &RawRecord, keys: &[&str]) -> u32 {
    match field(record, keys) {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()).unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Extract the reproductive profile of a dog record
pub fn extract_reproductive_profile(record: &RawRecord) -> ReproductiveProfile {
    let profile = ReproductiveProfile {
        last_heat_date: date_field(record, &["last_heat_date", "lastHeatDate"]),
        is_pregnant: bool_field(record, &["is_pregnant", "isPregnant"]),
        tie_date: date_field(record, &["tie_date", "tieDate"]),
        litter_number: u32_field(record, &["litter_number", "litterNumber"]),
    };

    if profile.tie_date.is_some() && !profile.is_pregnant {
        tracing::warn!(
            "Record has tie date {:?} but is not marked pregnant; no due date will be predicted",
            profile.tie_date
        );
    }

    profile
}

/// Extract the vaccination profile of a dog record
pub fn extract_vaccination_profile(record: &RawRecord) -> VaccinationProfile {
    VaccinationProfile {
        last_vaccination_date: date_field(
            record,
            &["last_vaccination_date", "lastVaccinationDate"],
        ),
        vaccination_type: string_field(record, &["vaccination_type", "vaccinationType"]),
    }
}

/// Extract birth information from a puppy record
pub fn extract_puppy_age_record(record: &RawRecord) -> PuppyAgeRecord {
    PuppyAgeRecord {
        birth_date: date_field(record, &["birth_date", "birthDate", "date_of_birth"]),
    }
}

/// Extract the dosing record of a medication
///
/// A missing frequency is treated like an unrecognized one.
pub fn extract_medication_record(record: &RawRecord) -> MedicationDueRecord {
    let frequency = string_field(record, &["frequency", "frequency_code", "frequencyCode"])
        .map(|raw| Frequency::parse(&raw))
        .unwrap_or_else(|| Frequency::Unrecognized(String::new()));

    MedicationDueRecord {
        last_administered: date_field(
            record,
            &[
                "last_administered",
                "last_administered_date",
                "lastAdministered",
                "lastAdministeredDate",
            ],
        ),
        frequency,
    }
}

/// Extract a health indicator observation
pub fn extract_health_indicator(record: &RawRecord) -> HealthIndicatorRecord {
    HealthIndicatorRecord {
        appetite: string_field(record, &["appetite"]).map(|s| Appetite::parse(&s)),
        energy: string_field(record, &["energy", "energy_level", "energyLevel"])
            .map(|s| EnergyLevel::parse(&s)),
        stool_consistency: string_field(record, &["stool_consistency", "stoolConsistency"])
            .map(|s| StoolConsistency::parse(&s)),
        abnormal: bool_field(record, &["abnormal"]),
        notes: string_field(record, &["notes"]),
        date: date_field(record, &["date", "recorded_at", "recordedAt"]),
    }
}
