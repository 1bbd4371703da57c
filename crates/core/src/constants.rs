//! Constants used throughout the MedPulse core crate.
//!
//! This module contains the scoring tables, wait-time factors and validation
//! messages in one place so the rules stay consistent across the codebase.

/// Starting score before any symptom, age or vital adjustment.
pub const BASE_SCORE: i32 = 20;

/// Bonus added when a critical keyword matches.
pub const CRITICAL_KEYWORD_BONUS: i32 = 40;

/// Bonus added when a moderate keyword matches.
pub const MODERATE_KEYWORD_BONUS: i32 = 25;

/// Override applied when only a mild keyword matches and the score is still at base.
pub const MILD_OVERRIDE_SCORE: i32 = 15;

/// Lowest severity score a patient can be assigned.
pub const MIN_SEVERITY: i32 = 5;

/// Highest severity score a patient can be assigned.
pub const MAX_SEVERITY: i32 = 100;

/// Symptom keywords that indicate a potentially life-threatening presentation.
pub const CRITICAL_KEYWORDS: &[&str] = &[
    "chest pain",
    "heart attack",
    "stroke",
    "difficulty breathing",
    "shortness of breath",
    "severe bleeding",
    "unconscious",
    "seizure",
    "severe head injury",
    "overdose",
    "severe allergic reaction",
];

/// Symptom keywords that indicate an urgent but not immediately life-threatening presentation.
pub const MODERATE_KEYWORDS: &[&str] = &[
    "severe headache",
    "high fever",
    "severe pain",
    "vomiting",
    "dizziness",
    "fainting",
    "severe nausea",
    "broken bone",
];

/// Symptom keywords that indicate a routine presentation.
pub const MILD_KEYWORDS: &[&str] = &[
    "cough",
    "cold",
    "minor cut",
    "sprain",
    "rash",
    "sore throat",
];

/// Age from which the elderly adjustment applies.
pub const ELDERLY_AGE: u8 = 65;

/// Bonus added for elderly patients.
pub const ELDERLY_BONUS: i32 = 15;

/// Age up to which the young-child adjustment applies.
pub const YOUNG_CHILD_AGE: u8 = 5;

/// Bonus added for young children.
pub const YOUNG_CHILD_BONUS: i32 = 20;

/// Deduction applied to healthy-adult ages (18 to 30 inclusive).
pub const YOUNG_ADULT_DEDUCTION: i32 = 5;

/// Symmetric bound of the severity jitter, applied as a uniform draw in
/// `-SCORE_JITTER_BOUND..=SCORE_JITTER_BOUND`.
pub const SCORE_JITTER_BOUND: i32 = 5;

/// Severity score from which a patient counts as critical.
pub const CRITICAL_BAND_MIN: u8 = 80;

/// Severity score from which a patient counts as moderate.
pub const MODERATE_BAND_MIN: u8 = 60;

/// Minutes of expected treatment time per queue position.
pub const MINUTES_PER_POSITION: f64 = 15.0;

/// Wait multiplier for critical patients (fast-tracked).
pub const CRITICAL_WAIT_FACTOR: f64 = 0.3;

/// Minimum wait in minutes for critical patients.
pub const CRITICAL_WAIT_FLOOR: f64 = 5.0;

/// Wait multiplier for moderate patients.
pub const MODERATE_WAIT_FACTOR: f64 = 0.7;

/// Wait multiplier for mild patients (deprioritised).
pub const MILD_WAIT_FACTOR: f64 = 1.2;

/// Upper bound of the wait-time jitter, applied as a uniform draw in
/// `0..=WAIT_JITTER_MAX` minutes.
pub const WAIT_JITTER_MAX: u32 = 10;

/// Validation message when a required intake field is missing or blank.
pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields: name, age, symptoms";

/// Validation message when the age lies outside the accepted range.
pub const AGE_RANGE_MESSAGE: &str = "Age must be between 1 and 120";
