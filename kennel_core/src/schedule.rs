//! Upcoming-events schedule and CSV export.
//!
//! Collects every predicted date (heat, whelping, vaccination, medication)
//! up to a horizon, overdue ones included, and writes them out as CSV.

use crate::store::{RecordKind, RecordStore};
use crate::summary::{summarize_dog, summarize_medication};
use crate::window::days_between;
use crate::{Error, Result};
use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::path::Path;
use tempfile::NamedTempFile;

/// What a scheduled event is about
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    NextHeat,
    DueDate,
    Vaccination,
    MedicationDose,
}

/// A single upcoming (or overdue) predicted date
#[derive(Clone, Debug, Serialize)]
pub struct ScheduledEvent {
    pub date: NaiveDate,
    pub days_until: i64,
    pub kind: EventKind,
    pub subject_id: String,
    pub subject_name: Option<String>,
    pub detail: Option<String>,
}

/// Build the event list from every dog and medication in the store
///
/// Events dated on or before `as_of + horizon_days` are kept, sorted by date.
pub fn build_schedule<S: RecordStore>(
    store: &S,
    as_of: NaiveDate,
    horizon_days: u32,
) -> Result<Vec<ScheduledEvent>> {
    let cutoff = as_of
        .checked_add_days(Days::new(u64::from(horizon_days)))
        .unwrap_or(NaiveDate::MAX);
    let mut events = Vec::new();

    let mut push = |date: NaiveDate,
                    kind: EventKind,
                    subject_id: &str,
                    subject_name: &Option<String>,
                    detail: Option<String>| {
        if date <= cutoff {
            events.push(ScheduledEvent {
                date,
                days_until: days_between(as_of, date),
                kind,
                subject_id: subject_id.to_string(),
                subject_name: subject_name.clone(),
                detail,
            });
        }
    };

    for record in store.list(RecordKind::Dog)? {
        let summary = summarize_dog(&record, as_of);
        let conflict_note = summary
            .conflict
            .as_ref()
            .map(|_| "within 30 days of predicted heat".to_string());

        if let Some(window) = &summary.heat_window {
            push(window.next_heat_start, EventKind::NextHeat, &summary.dog_id, &summary.name, None);
        }
        if let Some(gestation) = &summary.gestation {
            push(
                gestation.due_date,
                EventKind::DueDate,
                &summary.dog_id,
                &summary.name,
                Some(format!("earliest {}", gestation.earliest_due_date)),
            );
        }
        if let Some(date) = summary.next_vaccination {
            let detail = match (&summary.vaccination.vaccination_type, conflict_note) {
                (Some(kind), Some(note)) => Some(format!("{}; {}", kind, note)),
                (Some(kind), None) => Some(kind.clone()),
                (None, note) => note,
            };
            push(date, EventKind::Vaccination, &summary.dog_id, &summary.name, detail);
        }
    }

    for record in store.list(RecordKind::Medication)? {
        let schedule = summarize_medication(&record, as_of);
        if let Some(date) = schedule.next_due {
            let detail = Some(match &schedule.dog_id {
                Some(dog) => format!("{} for {}", schedule.record.frequency, dog),
                None => schedule.record.frequency.to_string(),
            });
            push(
                date,
                EventKind::MedicationDose,
                &schedule.medication_id,
                &schedule.name,
                detail,
            );
        }
    }

    events.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then(a.kind.cmp(&b.kind))
            .then_with(|| a.subject_id.cmp(&b.subject_id))
    });

    tracing::info!(
        "Built schedule of {} events through {} ({} days)",
        events.len(),
        cutoff,
        horizon_days
    );
    Ok(events)
}

/// A row in the CSV output
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    date: String,
    days_until: i64,
    kind: EventKind,
    subject_id: &'a str,
    subject_name: Option<&'a str>,
    detail: Option<&'a str>,
}

impl<'a> From<&'a ScheduledEvent> for CsvRow<'a> {
    fn from(event: &'a ScheduledEvent) -> Self {
        CsvRow {
            date: event.date.format("%Y-%m-%d").to_string(),
            days_until: event.days_until,
            kind: event.kind,
            subject_id: &event.subject_id,
            subject_name: event.subject_name.as_deref(),
            detail: event.detail.as_deref(),
        }
    }
}

/// Write the schedule as CSV, replacing `path` atomically
///
/// The CSV is written to a temp file in the same directory, synced, and then
/// renamed over the destination.
pub fn write_schedule_csv(events: &[ScheduledEvent], path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(true)
            .from_writer(temp.as_file());
        for event in events {
            writer.serialize(CsvRow::from(event))?;
        }
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::info!("Wrote {} schedule rows to {:?}", events.len(), path);
    Ok(())
}
