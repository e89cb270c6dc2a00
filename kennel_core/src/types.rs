//! Core domain types for the kennel lifecycle predictor.
//!
//! This module defines the value records the predictor works with:
//! - Reproductive and vaccination profiles extracted from dog records
//! - Derived windows (heat, gestation) and scheduling conflicts
//! - Medication frequency codes and due records
//! - Health indicator levels and records
//! - Puppy age groups
//!
//! Everything here is an immutable value; nothing is mutated after extraction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw key/value record as handed over by the record store
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Lowercase a code and fold `-` and spaces into `_`
pub(crate) fn normalize_code(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '-' || c.is_whitespace() { '_' } else { c })
        .collect()
}

// ============================================================================
// Dog Profiles
// ============================================================================

/// Reproductive state of a dog, rebuilt from the latest stored record
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReproductiveProfile {
    pub last_heat_date: Option<NaiveDate>,
    pub is_pregnant: bool,
    pub tie_date: Option<NaiveDate>,
    pub litter_number: u32,
}

/// Vaccination state of a dog
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VaccinationProfile {
    pub last_vaccination_date: Option<NaiveDate>,
    pub vaccination_type: Option<String>,
}

// ============================================================================
// Derived Windows
// ============================================================================

/// Predicted next heat
///
/// The heat itself is a point estimate, so start and end coincide. The
/// conflict bounds are the ±30 day band a vaccination must stay out of.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeatWindow {
    /// Last heat + heat cycle length
    pub next_heat_start: NaiveDate,
    pub next_heat_end: NaiveDate,
    pub conflict_window_start: NaiveDate,
    pub conflict_window_end: NaiveDate,
}

impl HeatWindow {
    /// Whether `date` falls inside the conflict band, bounds inclusive
    pub fn in_conflict_window(&self, date: NaiveDate) -> bool {
        self.conflict_window_start <= date && date <= self.conflict_window_end
    }
}

/// Gestation window anchored on the tie date
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GestationWindow {
    pub tie_date: NaiveDate,
    pub earliest_due_date: NaiveDate,
    /// Upper bound; this is the date callers show as "due"
    pub due_date: NaiveDate,
}

/// Kind of scheduling conflict between two predicted dates
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    VaccinationHeatOverlap,
}

/// Two predicted dates that collide
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchedulingConflict {
    pub kind: ConflictKind,
    /// Next vaccination
    pub predicted_a: NaiveDate,
    /// Next heat
    pub predicted_b: NaiveDate,
}

// ============================================================================
// Puppies
// ============================================================================

/// Birth information for a puppy
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PuppyAgeRecord {
    pub birth_date: Option<NaiveDate>,
}

/// A named developmental stage covering `start_day..=end_day` days since birth
///
/// `end_day` is `None` only for the open-ended fallback group.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgeGroup {
    pub id: String,
    pub start_day: u32,
    #[serde(default)]
    pub end_day: Option<u32>,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl AgeGroup {
    pub fn contains(&self, age_in_days: u32) -> bool {
        age_in_days >= self.start_day && self.end_day.map_or(true, |end| age_in_days <= end)
    }
}

/// Ordered age-group buckets plus the group used past the last bucket
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgeGroupTable {
    pub groups: Vec<AgeGroup>,
    pub fallback: AgeGroup,
}

// ============================================================================
// Medication
// ============================================================================

/// How often a medication is given
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Frequency {
    Daily,
    TwiceDaily,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Annually,
    /// Any code outside the known set, kept verbatim
    Unrecognized(String),
}

impl Frequency {
    pub fn parse(raw: &str) -> Self {
        match normalize_code(raw).as_str() {
            "daily" | "once_daily" => Frequency::Daily,
            "twice_daily" | "bid" => Frequency::TwiceDaily,
            "weekly" => Frequency::Weekly,
            "biweekly" | "bi_weekly" => Frequency::Biweekly,
            "monthly" => Frequency::Monthly,
            "quarterly" => Frequency::Quarterly,
            "annually" | "yearly" => Frequency::Annually,
            _ => Frequency::Unrecognized(raw.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Frequency::Daily => "daily",
            Frequency::TwiceDaily => "twice_daily",
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Annually => "annually",
            Frequency::Unrecognized(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Frequency::Unrecognized(_))
    }
}

impl From<String> for Frequency {
    fn from(raw: String) -> Self {
        Frequency::parse(&raw)
    }
}

impl From<Frequency> for String {
    fn from(frequency: Frequency) -> Self {
        frequency.code().to_string()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// When a medication was last given and how often it repeats
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MedicationDueRecord {
    pub last_administered: Option<NaiveDate>,
    pub frequency: Frequency,
}

// ============================================================================
// Health Indicators
// ============================================================================

/// Recorded appetite level
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Appetite {
    Excellent,
    Good,
    Normal,
    Fair,
    Poor,
    NoAppetite,
    Unrecognized(String),
}

impl Appetite {
    pub fn parse(raw: &str) -> Self {
        match normalize_code(raw).as_str() {
            "excellent" => Appetite::Excellent,
            "good" => Appetite::Good,
            "normal" => Appetite::Normal,
            "fair" => Appetite::Fair,
            "poor" => Appetite::Poor,
            "none" | "no_appetite" => Appetite::NoAppetite,
            _ => Appetite::Unrecognized(raw.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Appetite::Excellent => "Excellent",
            Appetite::Good => "Good",
            Appetite::Normal => "Normal",
            Appetite::Fair => "Fair",
            Appetite::Poor => "Poor",
            Appetite::NoAppetite => "None",
            Appetite::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for Appetite {
    fn from(raw: String) -> Self {
        Appetite::parse(&raw)
    }
}

impl From<Appetite> for String {
    fn from(level: Appetite) -> Self {
        level.label().to_string()
    }
}

/// Recorded energy level
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EnergyLevel {
    High,
    Normal,
    Low,
    VeryLow,
    Unrecognized(String),
}

impl EnergyLevel {
    pub fn parse(raw: &str) -> Self {
        match normalize_code(raw).as_str() {
            "high" => EnergyLevel::High,
            "normal" => EnergyLevel::Normal,
            "low" => EnergyLevel::Low,
            "very_low" | "verylow" => EnergyLevel::VeryLow,
            _ => EnergyLevel::Unrecognized(raw.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            EnergyLevel::High => "High",
            EnergyLevel::Normal => "Normal",
            EnergyLevel::Low => "Low",
            EnergyLevel::VeryLow => "Very Low",
            EnergyLevel::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for EnergyLevel {
    fn from(raw: String) -> Self {
        EnergyLevel::parse(&raw)
    }
}

impl From<EnergyLevel> for String {
    fn from(level: EnergyLevel) -> Self {
        level.label().to_string()
    }
}

/// Recorded stool consistency
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StoolConsistency {
    Normal,
    Firm,
    Soft,
    Loose,
    Watery,
    Bloody,
    Mucousy,
    Unrecognized(String),
}

impl StoolConsistency {
    pub fn parse(raw: &str) -> Self {
        match normalize_code(raw).as_str() {
            "normal" => StoolConsistency::Normal,
            "firm" => StoolConsistency::Firm,
            "soft" => StoolConsistency::Soft,
            "loose" => StoolConsistency::Loose,
            "watery" => StoolConsistency::Watery,
            "bloody" => StoolConsistency::Bloody,
            "mucousy" | "mucus" | "mucousy_stool" => StoolConsistency::Mucousy,
            _ => StoolConsistency::Unrecognized(raw.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            StoolConsistency::Normal => "Normal",
            StoolConsistency::Firm => "Firm",
            StoolConsistency::Soft => "Soft",
            StoolConsistency::Loose => "Loose",
            StoolConsistency::Watery => "Watery",
            StoolConsistency::Bloody => "Bloody",
            StoolConsistency::Mucousy => "Mucousy",
            StoolConsistency::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for StoolConsistency {
    fn from(raw: String) -> Self {
        StoolConsistency::parse(&raw)
    }
}

impl From<StoolConsistency> for String {
    fn from(level: StoolConsistency) -> Self {
        level.label().to_string()
    }
}

/// A single health observation
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthIndicatorRecord {
    pub appetite: Option<Appetite>,
    pub energy: Option<EnergyLevel>,
    pub stool_consistency: Option<StoolConsistency>,
    pub abnormal: bool,
    pub notes: Option<String>,
    pub date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_parse_variants() {
        assert_eq!(Frequency::parse("weekly"), Frequency::Weekly);
        assert_eq!(Frequency::parse("Twice-Daily"), Frequency::TwiceDaily);
        assert_eq!(Frequency::parse("twice daily"), Frequency::TwiceDaily);
        assert_eq!(Frequency::parse(" MONTHLY "), Frequency::Monthly);
        assert_eq!(Frequency::parse("bi-weekly"), Frequency::Biweekly);
        assert_eq!(Frequency::parse("Bi_Weekly"), Frequency::Biweekly);
        assert_eq!(
            Frequency::parse("unknown_code"),
            Frequency::Unrecognized("unknown_code".into())
        );
    }

    #[test]
    fn test_frequency_serde_uses_codes() {
        let json = serde_json::to_string(&Frequency::Biweekly).unwrap();
        assert_eq!(json, "\"biweekly\"");

        let parsed: Frequency = serde_json::from_str("\"every_full_moon\"").unwrap();
        assert!(!parsed.is_recognized());
        assert_eq!(parsed.code(), "every_full_moon");
    }

    #[test]
    fn test_health_levels_parse_labels() {
        assert_eq!(Appetite::parse("None"), Appetite::NoAppetite);
        assert_eq!(EnergyLevel::parse("Very Low"), EnergyLevel::VeryLow);
        assert_eq!(EnergyLevel::parse("very_low"), EnergyLevel::VeryLow);
        assert_eq!(StoolConsistency::parse("MUCOUSY"), StoolConsistency::Mucousy);
        assert_eq!(
            StoolConsistency::parse("sparkly"),
            StoolConsistency::Unrecognized("sparkly".into())
        );
    }

    #[test]
    fn test_heat_conflict_window_bounds() {
        let d = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        let window = HeatWindow {
            next_heat_start: d("2024-06-01"),
            next_heat_end: d("2024-06-01"),
            conflict_window_start: d("2024-05-02"),
            conflict_window_end: d("2024-07-01"),
        };

        assert!(window.in_conflict_window(d("2024-05-02")));
        assert!(window.in_conflict_window(d("2024-07-01")));
        assert!(!window.in_conflict_window(d("2024-07-02")));
        assert!(!window.in_conflict_window(d("2024-05-01")));
    }

    #[test]
    fn test_open_ended_age_group() {
        let group = AgeGroup {
            id: "juvenile".into(),
            start_day: 84,
            end_day: None,
            name: "Juvenile".into(),
            description: String::new(),
        };
        assert!(group.contains(84));
        assert!(group.contains(10_000));
        assert!(!group.contains(83));
    }
}
