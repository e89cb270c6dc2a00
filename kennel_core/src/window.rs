//! Window calculation: fixed offsets applied to known anchor dates.
//!
//! The next heat, due date, vaccination and dose depend only on their anchor
//! date, so they take no `as_of`; "today" matters only for ages.
//!
//! Every function here is pure. Unknown anchors produce `None`; the only
//! substituted default is the medication interval for unrecognized frequency
//! codes, which callers rely on to always get a next dose.

use crate::types::*;
use crate::{Error, Result};
use chrono::{Days, Months, NaiveDate};

/// Days from the start of one heat to the predicted start of the next
pub const HEAT_CYCLE_DAYS: u64 = 180;

/// Shortest gestation, tie date to whelping
pub const GESTATION_MIN_DAYS: u64 = 63;

/// Gestation used for the displayed due date (upper bound)
pub const GESTATION_DAYS: u64 = 65;

/// Half-width of the window in which a vaccination collides with a heat
pub const CONFLICT_TOLERANCE_DAYS: u64 = 30;

/// Interval assumed for frequency codes outside the known set
pub const DEFAULT_MEDICATION_INTERVAL_DAYS: u64 = 30;

/// Offset between two doses for a given frequency
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DoseInterval {
    Days(u64),
    Months(u32),
}

impl DoseInterval {
    /// Add this interval to `date`, clamping month arithmetic to month end
    pub fn after(self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            DoseInterval::Days(days) => date.checked_add_days(Days::new(days)),
            DoseInterval::Months(months) => date.checked_add_months(Months::new(months)),
        }
    }
}

/// Interval for a known frequency, `None` for unrecognized codes
///
/// Twice-daily medications are tracked per day, so the next dose day is +1.
pub fn dose_interval(frequency: &Frequency) -> Option<DoseInterval> {
    match frequency {
        Frequency::Daily | Frequency::TwiceDaily => Some(DoseInterval::Days(1)),
        Frequency::Weekly => Some(DoseInterval::Days(7)),
        Frequency::Biweekly => Some(DoseInterval::Days(14)),
        Frequency::Monthly => Some(DoseInterval::Months(1)),
        Frequency::Quarterly => Some(DoseInterval::Months(3)),
        Frequency::Annually => Some(DoseInterval::Months(12)),
        Frequency::Unrecognized(_) => None,
    }
}

fn add_days(date: NaiveDate, days: u64) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(days))
}

/// Predicted start of the next heat: last heat + 180 days
pub fn compute_next_heat(profile: &ReproductiveProfile) -> Option<NaiveDate> {
    profile
        .last_heat_date
        .and_then(|last| add_days(last, HEAT_CYCLE_DAYS))
}

/// Next heat with its ±30 day conflict band
pub fn compute_heat_window(profile: &ReproductiveProfile) -> Option<HeatWindow> {
    compute_next_heat(profile).map(heat_window_at)
}

/// Heat window around a predicted heat date
///
/// Conflict bounds clamp to the representable date range.
pub fn heat_window_at(next_heat: NaiveDate) -> HeatWindow {
    let tolerance = Days::new(CONFLICT_TOLERANCE_DAYS);
    HeatWindow {
        next_heat_start: next_heat,
        next_heat_end: next_heat,
        conflict_window_start: next_heat.checked_sub_days(tolerance).unwrap_or(NaiveDate::MIN),
        conflict_window_end: next_heat.checked_add_days(tolerance).unwrap_or(NaiveDate::MAX),
    }
}

/// Due date: tie date + 65 days, only for pregnant dogs
pub fn compute_due_date(profile: &ReproductiveProfile) -> Option<NaiveDate> {
    compute_gestation_window(profile).map(|window| window.due_date)
}

/// Full gestation window (63 to 65 days after the tie), only for pregnant dogs
pub fn compute_gestation_window(profile: &ReproductiveProfile) -> Option<GestationWindow> {
    if !profile.is_pregnant {
        return None;
    }
    let tie_date = profile.tie_date?;
    Some(GestationWindow {
        tie_date,
        earliest_due_date: add_days(tie_date, GESTATION_MIN_DAYS)?,
        due_date: add_days(tie_date, GESTATION_DAYS)?,
    })
}

/// Next vaccination: one calendar year after the last one
///
/// A Feb 29 vaccination comes due on Feb 28 of the following year.
pub fn compute_next_vaccination(profile: &VaccinationProfile) -> Option<NaiveDate> {
    profile
        .last_vaccination_date
        .and_then(|last| last.checked_add_months(Months::new(12)))
}

/// Next medication dose from the frequency table
///
/// Unrecognized frequency codes fall back to a 30-day interval. Returns `None`
/// only when the last administration date is unknown.
pub fn compute_next_medication_dose(record: &MedicationDueRecord) -> Option<NaiveDate> {
    let last = record.last_administered?;
    let interval = dose_interval(&record.frequency).unwrap_or_else(|| {
        tracing::debug!(
            "Unrecognized frequency {:?}, assuming {} days",
            record.frequency.code(),
            DEFAULT_MEDICATION_INTERVAL_DAYS
        );
        DoseInterval::Days(DEFAULT_MEDICATION_INTERVAL_DAYS)
    });
    interval.after(last)
}

/// Like [`compute_next_medication_dose`] but rejects unrecognized frequencies
pub fn compute_next_medication_dose_strict(
    record: &MedicationDueRecord,
) -> Result<Option<NaiveDate>> {
    let interval = dose_interval(&record.frequency)
        .ok_or_else(|| Error::UnknownFrequency(record.frequency.code().to_string()))?;
    Ok(record.last_administered.and_then(|last| interval.after(last)))
}

/// Signed calendar-day difference `to - from`
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Whole days since birth, `None` for birth dates after `as_of`
pub fn age_in_days(birth_date: NaiveDate, as_of: NaiveDate) -> Option<u32> {
    u32::try_from(days_between(birth_date, as_of)).ok()
}

/// Whole weeks since birth
pub fn age_in_weeks(birth_date: NaiveDate, as_of: NaiveDate) -> Option<u32> {
    age_in_days(birth_date, as_of).map(|days| days / 7)
}

/// Age group of a puppy born on `birth_date`, as of `as_of`
///
/// Ages past the last bucket resolve to the table's fallback group. A birth
/// date in the future cannot be placed and yields `None`.
pub fn compute_age_group<'a>(
    birth_date: NaiveDate,
    as_of: NaiveDate,
    table: &'a AgeGroupTable,
) -> Option<&'a AgeGroup> {
    match age_in_days(birth_date, as_of) {
        Some(days) => Some(table.find(days)),
        None => {
            tracing::warn!(
                "Birth date {} is after {}, cannot assign an age group",
                birth_date,
                as_of
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::age_groups::build_default_age_groups;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn with_heat(date: Option<&str>) -> ReproductiveProfile {
        ReproductiveProfile {
            last_heat_date: date.map(d),
            ..Default::default()
        }
    }

    fn medication(last: &str, code: &str) -> MedicationDueRecord {
        MedicationDueRecord {
            last_administered: Some(d(last)),
            frequency: Frequency::parse(code),
        }
    }

    #[test]
    fn test_next_heat_unknown_without_last_heat() {
        assert_eq!(compute_next_heat(&with_heat(None)), None);
        assert_eq!(compute_heat_window(&with_heat(None)), None);
    }

    #[test]
    fn test_next_heat_is_180_days_later() {
        assert_eq!(
            compute_next_heat(&with_heat(Some("2024-01-01"))),
            Some(d("2024-06-29"))
        );
        assert_eq!(
            compute_next_heat(&with_heat(Some("2023-12-04"))),
            Some(d("2024-06-01"))
        );
    }

    #[test]
    fn test_heat_window_starts_at_predicted_heat() {
        let profile = with_heat(Some("2023-12-04"));
        let window = compute_heat_window(&profile).unwrap();
        assert_eq!(Some(window.next_heat_start), compute_next_heat(&profile));
        assert_eq!(window.next_heat_start, d("2024-06-01"));
        assert_eq!(window.next_heat_end, d("2024-06-01"));
        assert_eq!(window.conflict_window_start, d("2024-05-02"));
        assert_eq!(window.conflict_window_end, d("2024-07-01"));
    }

    #[test]
    fn test_heat_window_clamps_at_date_range_edge() {
        let window = heat_window_at(NaiveDate::MAX);
        assert_eq!(window.conflict_window_end, NaiveDate::MAX);
        assert!(window.in_conflict_window(NaiveDate::MAX));
    }

    #[test]
    fn test_due_date_requires_pregnancy() {
        let mut profile = ReproductiveProfile {
            is_pregnant: true,
            tie_date: Some(d("2024-03-01")),
            ..Default::default()
        };
        assert_eq!(compute_due_date(&profile), Some(d("2024-05-05")));

        let window = compute_gestation_window(&profile).unwrap();
        assert_eq!(window.earliest_due_date, d("2024-05-03"));
        assert_eq!(window.due_date, d("2024-05-05"));

        profile.is_pregnant = false;
        assert_eq!(compute_due_date(&profile), None);

        profile.is_pregnant = true;
        profile.tie_date = None;
        assert_eq!(compute_due_date(&profile), None);
    }

    #[test]
    fn test_next_vaccination_is_one_calendar_year() {
        let profile = VaccinationProfile {
            last_vaccination_date: Some(d("2024-01-10")),
            vaccination_type: Some("DHPP".into()),
        };
        assert_eq!(compute_next_vaccination(&profile), Some(d("2025-01-10")));
    }

    #[test]
    fn test_next_vaccination_leap_day_clamps() {
        let profile = VaccinationProfile {
            last_vaccination_date: Some(d("2024-02-29")),
            vaccination_type: None,
        };
        assert_eq!(compute_next_vaccination(&profile), Some(d("2025-02-28")));
        assert_eq!(compute_next_vaccination(&VaccinationProfile::default()), None);
    }

    #[test]
    fn test_medication_frequency_table() {
        let cases = [
            ("daily", "2024-01-02"),
            ("twice_daily", "2024-01-02"),
            ("weekly", "2024-01-08"),
            ("biweekly", "2024-01-15"),
            ("bi-weekly", "2024-01-15"),
            ("monthly", "2024-02-01"),
            ("quarterly", "2024-04-01"),
            ("annually", "2025-01-01"),
        ];
        for (code, expected) in cases {
            assert_eq!(
                compute_next_medication_dose(&medication("2024-01-01", code)),
                Some(d(expected)),
                "frequency {}",
                code
            );
        }
    }

    #[test]
    fn test_unknown_frequency_defaults_to_30_days() {
        assert_eq!(
            compute_next_medication_dose(&medication("2024-01-01", "unknown_code")),
            Some(d("2024-01-31"))
        );
    }

    #[test]
    fn test_monthly_clamps_to_month_end() {
        assert_eq!(
            compute_next_medication_dose(&medication("2024-01-31", "monthly")),
            Some(d("2024-02-29"))
        );
    }

    #[test]
    fn test_medication_unknown_without_last_dose() {
        let record = MedicationDueRecord {
            last_administered: None,
            frequency: Frequency::Weekly,
        };
        assert_eq!(compute_next_medication_dose(&record), None);
    }

    #[test]
    fn test_strict_mode_rejects_unknown_codes() {
        let result = compute_next_medication_dose_strict(&medication("2024-01-01", "hourly"));
        assert!(matches!(result, Err(Error::UnknownFrequency(code)) if code == "hourly"));

        let ok = compute_next_medication_dose_strict(&medication("2024-01-01", "weekly")).unwrap();
        assert_eq!(ok, Some(d("2024-01-08")));
    }

    #[test]
    fn test_age_arithmetic() {
        assert_eq!(age_in_days(d("2024-01-01"), d("2024-01-01")), Some(0));
        assert_eq!(age_in_days(d("2024-01-01"), d("2024-03-01")), Some(60));
        assert_eq!(age_in_weeks(d("2024-01-01"), d("2024-01-14")), Some(1));
        assert_eq!(age_in_days(d("2024-01-02"), d("2024-01-01")), None);
    }

    #[test]
    fn test_age_group_newborn_and_overflow() {
        let table = build_default_age_groups();

        let newborn = compute_age_group(d("2024-01-01"), d("2024-01-01"), &table).unwrap();
        assert_eq!(newborn.id, "first24hours");

        let older = compute_age_group(d("2020-01-01"), d("2024-01-01"), &table).unwrap();
        assert_eq!(older.id, table.fallback.id);

        assert!(compute_age_group(d("2024-02-01"), d("2024-01-01"), &table).is_none());
    }

    #[test]
    fn test_results_are_idempotent() {
        let profile = with_heat(Some("2024-01-01"));
        assert_eq!(compute_next_heat(&profile), compute_next_heat(&profile));

        let table = build_default_age_groups();
        let first = compute_age_group(d("2024-01-01"), d("2024-02-01"), &table).map(|g| g.id.clone());
        let second = compute_age_group(d("2024-01-01"), d("2024-02-01"), &table).map(|g| g.id.clone());
        assert_eq!(first, second);
    }
}
