//! Lifecycle summaries assembled from raw records.
//!
//! This is the one-way pipeline callers consume:
//! raw record → extraction → window calculation → conflict/alert detection.
//! `as_of` is always passed in; nothing here reads the clock.

use crate::detect::{find_vaccination_heat_conflict, indicator_concerns, Concern};
use crate::extract::*;
use crate::types::*;
use crate::window::*;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Everything derived about one dog
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DogLifecycleSummary {
    pub dog_id: String,
    pub name: Option<String>,
    pub as_of: NaiveDate,
    pub reproductive: ReproductiveProfile,
    pub vaccination: VaccinationProfile,
    pub heat_window: Option<HeatWindow>,
    pub gestation: Option<GestationWindow>,
    pub next_vaccination: Option<NaiveDate>,
    pub conflict: Option<SchedulingConflict>,
    pub days_until_heat: Option<i64>,
    pub days_until_due: Option<i64>,
    pub days_until_vaccination: Option<i64>,
    pub vaccination_overdue: bool,
}

/// Age placement of one puppy
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PuppyAgeSummary {
    pub puppy_id: String,
    pub name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub age_in_days: Option<u32>,
    pub age_in_weeks: Option<u32>,
    pub age_group: Option<AgeGroup>,
}

/// Puppies sharing one age group
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgeGroupBucket {
    pub group: AgeGroup,
    pub puppies: Vec<PuppyAgeSummary>,
}

/// Next dose of one medication
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MedicationSchedule {
    pub medication_id: String,
    pub name: Option<String>,
    pub dog_id: Option<String>,
    pub record: MedicationDueRecord,
    pub next_due: Option<NaiveDate>,
    pub overdue: bool,
}

/// A concerning health observation with its reasons
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthAlert {
    pub record_id: String,
    pub dog_id: Option<String>,
    pub indicator: HealthIndicatorRecord,
    pub concerns: Vec<Concern>,
}

/// Read the record's `id` as a string, accepting numeric ids
pub fn record_id(record: &RawRecord) -> Option<String> {
    match record.get("id")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text(record: &RawRecord, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find_map(|value| match value {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

/// Summarize a dog record as of a given day
pub fn summarize_dog(record: &RawRecord, as_of: NaiveDate) -> DogLifecycleSummary {
    let dog_id = record_id(record).unwrap_or_default();
    let reproductive = extract_reproductive_profile(record);
    let vaccination = extract_vaccination_profile(record);

    let heat_window = compute_heat_window(&reproductive);
    let gestation = compute_gestation_window(&reproductive);
    let next_vaccination = compute_next_vaccination(&vaccination);
    let conflict = find_vaccination_heat_conflict(
        next_vaccination,
        heat_window.as_ref().map(|w| w.next_heat_start),
        reproductive.is_pregnant,
    );

    if conflict.is_some() {
        tracing::info!("Dog {}: vaccination falls near the predicted heat", dog_id);
    }

    DogLifecycleSummary {
        name: text(record, &["name", "call_name"]),
        as_of,
        days_until_heat: heat_window.as_ref().map(|w| days_between(as_of, w.next_heat_start)),
        days_until_due: gestation.as_ref().map(|g| days_between(as_of, g.due_date)),
        days_until_vaccination: next_vaccination.map(|date| days_between(as_of, date)),
        vaccination_overdue: next_vaccination.is_some_and(|date| date < as_of),
        dog_id,
        reproductive,
        vaccination,
        heat_window,
        gestation,
        next_vaccination,
        conflict,
    }
}

/// Place a puppy record in its age group
pub fn summarize_puppy(
    record: &RawRecord,
    as_of: NaiveDate,
    table: &AgeGroupTable,
) -> PuppyAgeSummary {
    let birth_date = extract_puppy_age_record(record).birth_date;

    PuppyAgeSummary {
        puppy_id: record_id(record).unwrap_or_default(),
        name: text(record, &["name", "collar_color", "collarColor"]),
        birth_date,
        age_in_days: birth_date.and_then(|b| age_in_days(b, as_of)),
        age_in_weeks: birth_date.and_then(|b| age_in_weeks(b, as_of)),
        age_group: birth_date
            .and_then(|b| compute_age_group(b, as_of, table))
            .cloned(),
    }
}

/// Group puppies by age group, in table order
///
/// Empty groups are omitted. Puppies without a usable birth date are returned
/// separately since they cannot be placed.
pub fn group_puppies_by_age(
    records: &[RawRecord],
    as_of: NaiveDate,
    table: &AgeGroupTable,
) -> (Vec<AgeGroupBucket>, Vec<PuppyAgeSummary>) {
    let mut buckets: Vec<AgeGroupBucket> = table
        .ordered()
        .map(|group| AgeGroupBucket {
            group: group.clone(),
            puppies: Vec::new(),
        })
        .collect();
    let mut unplaced = Vec::new();

    for record in records {
        let summary = summarize_puppy(record, as_of, table);
        let slot = summary
            .age_group
            .as_ref()
            .and_then(|g| buckets.iter().position(|b| b.group.id == g.id));
        match slot {
            Some(index) => buckets[index].puppies.push(summary),
            None => unplaced.push(summary),
        }
    }

    buckets.retain(|b| !b.puppies.is_empty());
    tracing::debug!(
        "Grouped {} puppies into {} age groups ({} unplaced)",
        records.len(),
        buckets.len(),
        unplaced.len()
    );
    (buckets, unplaced)
}

/// Next dose for a medication record
pub fn summarize_medication(record: &RawRecord, as_of: NaiveDate) -> MedicationSchedule {
    let due_record = extract_medication_record(record);
    let next_due = compute_next_medication_dose(&due_record);

    MedicationSchedule {
        medication_id: record_id(record).unwrap_or_default(),
        name: text(record, &["name", "medication_name", "medicationName"]),
        dog_id: text(record, &["dog_id", "dogId"]),
        overdue: next_due.is_some_and(|date| date < as_of),
        record: due_record,
        next_due,
    }
}

/// The concerning subset of health indicator records, with reasons
pub fn health_alerts(records: &[RawRecord]) -> Vec<HealthAlert> {
    records
        .iter()
        .filter_map(|record| {
            let indicator = extract_health_indicator(record);
            let concerns = indicator_concerns(&indicator);
            if concerns.is_empty() {
                return None;
            }
            Some(HealthAlert {
                record_id: record_id(record).unwrap_or_default(),
                dog_id: text(record, &["dog_id", "dogId"]),
                indicator,
                concerns,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::age_groups::build_default_age_groups;
    use serde_json::{json, Value};

    fn record(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_summarize_dog_with_conflict() {
        let dog = record(json!({
            "id": "dog-1",
            "name": "Maple",
            "last_heat_date": "2023-12-04",
            "is_pregnant": false,
            "last_vaccination_date": "2023-06-20"
        }));

        let summary = summarize_dog(&dog, d("2024-05-01"));
        assert_eq!(summary.dog_id, "dog-1");
        assert_eq!(summary.name.as_deref(), Some("Maple"));
        assert_eq!(summary.heat_window.as_ref().unwrap().next_heat_start, d("2024-06-01"));
        assert_eq!(summary.next_vaccination, Some(d("2024-06-20")));
        assert!(summary.conflict.is_some());
        assert_eq!(summary.days_until_heat, Some(31));
        assert_eq!(summary.days_until_vaccination, Some(50));
        assert!(!summary.vaccination_overdue);
        assert!(summary.gestation.is_none());
    }

    #[test]
    fn test_summarize_pregnant_dog() {
        let dog = record(json!({
            "id": 7,
            "last_heat_date": "2023-12-04",
            "is_pregnant": true,
            "tie_date": "2024-03-01",
            "last_vaccination_date": "2023-06-20"
        }));

        let summary = summarize_dog(&dog, d("2024-05-01"));
        assert_eq!(summary.dog_id, "7");
        assert_eq!(summary.gestation.as_ref().unwrap().due_date, d("2024-05-05"));
        assert_eq!(summary.days_until_due, Some(4));
        assert!(summary.conflict.is_none());
    }

    #[test]
    fn test_summarize_dog_with_nothing_known() {
        let summary = summarize_dog(&record(json!({ "id": "x" })), d("2024-05-01"));
        assert!(summary.heat_window.is_none());
        assert!(summary.next_vaccination.is_none());
        assert!(summary.days_until_heat.is_none());
        assert!(!summary.vaccination_overdue);
    }

    #[test]
    fn test_vaccination_overdue() {
        let dog = record(json!({ "id": "d", "last_vaccination_date": "2022-01-10" }));
        let summary = summarize_dog(&dog, d("2024-01-01"));
        assert!(summary.vaccination_overdue);
        assert!(summary.days_until_vaccination.unwrap() < 0);
    }

    #[test]
    fn test_group_puppies_by_age() {
        let table = build_default_age_groups();
        let puppies = vec![
            record(json!({ "id": "p1", "birth_date": "2024-03-01" })),
            record(json!({ "id": "p2", "birth_date": "2024-02-25" })),
            record(json!({ "id": "p3", "birth_date": "2024-03-01" })),
            record(json!({ "id": "p4", "birth_date": "2023-01-01" })),
            record(json!({ "id": "p5", "birth_date": "garbage" })),
        ];

        let (buckets, unplaced) = group_puppies_by_age(&puppies, d("2024-03-01"), &table);

        let ids: Vec<_> = buckets.iter().map(|b| b.group.id.as_str()).collect();
        assert_eq!(ids, vec!["first24hours", "neonatal", "juvenile"]);
        assert_eq!(buckets[0].puppies.len(), 2);
        assert_eq!(buckets[1].puppies[0].age_in_days, Some(5));
        assert_eq!(unplaced.len(), 1);
        assert_eq!(unplaced[0].puppy_id, "p5");
    }

    #[test]
    fn test_summarize_medication() {
        let med = record(json!({
            "id": "m1",
            "name": "Heartworm",
            "dog_id": "dog-1",
            "frequency": "monthly",
            "last_administered": "2024-01-15"
        }));

        let schedule = summarize_medication(&med, d("2024-03-01"));
        assert_eq!(schedule.next_due, Some(d("2024-02-15")));
        assert!(schedule.overdue);
        assert_eq!(schedule.dog_id.as_deref(), Some("dog-1"));
    }

    #[test]
    fn test_health_alerts_only_concerning() {
        let records = vec![
            record(json!({ "id": "h1", "appetite": "Good", "energy": "Normal" })),
            record(json!({ "id": "h2", "dog_id": "dog-1", "stool_consistency": "Watery" })),
        ];

        let alerts = health_alerts(&records);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].record_id, "h2");
        assert_eq!(alerts[0].concerns, vec![Concern::Stool(StoolConsistency::Watery)]);
    }
}
