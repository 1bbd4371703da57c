//! Severity scoring for walk-in patients.
//!
//! The score is a rule-based composite of symptom keywords, age and vital
//! signs, plus a small random jitter so that batches of near-identical
//! presentations do not all land on the same value. The result is an ordinal
//! priority in `5..=100`, not a clinical measurement.
//!
//! Scoring is deterministic for a given random generator state: the engine
//! injects a seedable [`rand::rngs::StdRng`], which makes every score
//! reproducible in tests and simulations.

use medpulse_types::Age;
use rand::Rng;

use crate::constants::{
    BASE_SCORE, CRITICAL_KEYWORDS, CRITICAL_KEYWORD_BONUS, ELDERLY_AGE, ELDERLY_BONUS,
    MAX_SEVERITY, MILD_KEYWORDS, MILD_OVERRIDE_SCORE, MIN_SEVERITY, MODERATE_KEYWORDS,
    MODERATE_KEYWORD_BONUS, SCORE_JITTER_BOUND, YOUNG_ADULT_DEDUCTION, YOUNG_CHILD_AGE,
    YOUNG_CHILD_BONUS,
};
use crate::vitals::VitalSigns;

/// Computes the severity score for a presentation.
///
/// Keyword tiers are additive and independent: a symptom text matching both a
/// critical and a moderate keyword receives both bonuses. Within a tier the
/// first matching keyword ends the scan. The mild tier only applies when
/// nothing else matched and lowers the score below base.
///
/// # Arguments
///
/// * `symptoms` - Free-text symptom description, already validated non-empty
/// * `age` - Validated patient age
/// * `vitals` - Optional free-text vitals, parsed tolerantly
/// * `rng` - Jitter source, drawn from once per call
///
/// # Returns
///
/// A score clamped to `5..=100`.
pub fn score<R: Rng + ?Sized>(symptoms: &str, age: Age, vitals: Option<&str>, rng: &mut R) -> u8 {
    let mut score = BASE_SCORE;
    let symptoms_lower = symptoms.to_lowercase();

    for keyword in CRITICAL_KEYWORDS {
        if symptoms_lower.contains(keyword) {
            score += CRITICAL_KEYWORD_BONUS;
            break;
        }
    }

    for keyword in MODERATE_KEYWORDS {
        if symptoms_lower.contains(keyword) {
            score += MODERATE_KEYWORD_BONUS;
            break;
        }
    }

    if score == BASE_SCORE {
        for keyword in MILD_KEYWORDS {
            if symptoms_lower.contains(keyword) {
                score = MILD_OVERRIDE_SCORE;
                break;
            }
        }
    }

    score += age_adjustment(age);

    if let Some(text) = vitals {
        score += vitals_adjustment(&VitalSigns::extract(text));
    }

    score += rng.gen_range(-SCORE_JITTER_BOUND..=SCORE_JITTER_BOUND);

    score.clamp(MIN_SEVERITY, MAX_SEVERITY) as u8
}

/// Age-based adjustment: elderly and very young patients score higher,
/// healthy adult ages score slightly lower.
fn age_adjustment(age: Age) -> i32 {
    let years = age.years();
    let mut adjustment = 0;

    if years >= ELDERLY_AGE {
        adjustment += ELDERLY_BONUS;
    }
    if years <= YOUNG_CHILD_AGE {
        adjustment += YOUNG_CHILD_BONUS;
    }
    if (18..=30).contains(&years) {
        adjustment -= YOUNG_ADULT_DEDUCTION;
    }

    adjustment
}

/// Vitals-based adjustment. Each reading contributes at most one band.
fn vitals_adjustment(signs: &VitalSigns) -> i32 {
    let mut adjustment = 0;

    if let Some(bp) = signs.blood_pressure {
        if bp.systolic > 180 || bp.diastolic > 110 {
            adjustment += 20;
        } else if bp.systolic > 140 || bp.diastolic > 90 {
            adjustment += 10;
        }
    }

    if let Some(hr) = signs.heart_rate {
        if hr > 120 || hr < 50 {
            adjustment += 15;
        } else if hr > 100 || hr < 60 {
            adjustment += 8;
        }
    }

    if let Some(temp) = signs.temperature_f {
        if temp > 103.0 || temp < 95.0 {
            adjustment += 15;
        } else if temp > 101.0 {
            adjustment += 8;
        }
    }

    adjustment
}
