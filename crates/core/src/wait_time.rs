//! Wait-time estimation.
//!
//! Estimates are a courtesy figure shown to patients, derived from the queue
//! position and severity band plus a small jitter so the board does not look
//! mechanical. They are recomputed for every waiting patient whenever the
//! ordering changes; the stored value is a cache of this function's output,
//! never an input to ordering decisions.

use rand::Rng;

use crate::constants::{
    CRITICAL_WAIT_FACTOR, CRITICAL_WAIT_FLOOR, MILD_WAIT_FACTOR, MINUTES_PER_POSITION,
    MODERATE_WAIT_FACTOR, WAIT_JITTER_MAX,
};
use crate::patient::SeverityBand;

/// Estimates the wait in minutes for a patient at `queue_position` with
/// `severity_score`.
///
/// The base is fifteen minutes per position ahead of the treatment room.
/// Critical patients are fast-tracked to roughly a third of that with a
/// five-minute floor; mild patients wait a little longer than the base.
pub fn estimate<R: Rng + ?Sized>(queue_position: u32, severity_score: u8, rng: &mut R) -> u32 {
    let base = f64::from(queue_position) * MINUTES_PER_POSITION;

    let adjusted = match SeverityBand::from_score(severity_score) {
        SeverityBand::Critical => (base * CRITICAL_WAIT_FACTOR).max(CRITICAL_WAIT_FLOOR),
        SeverityBand::Moderate => base * MODERATE_WAIT_FACTOR,
        SeverityBand::Mild => base * MILD_WAIT_FACTOR,
    };

    let jitter = f64::from(rng.gen_range(0..=WAIT_JITTER_MAX));

    (adjusted + jitter).round() as u32
}

/// Inclusive bounds the estimate can take for a position and severity,
/// covering every possible jitter draw.
pub fn estimate_bounds(queue_position: u32, severity_score: u8) -> (u32, u32) {
    let base = f64::from(queue_position) * MINUTES_PER_POSITION;

    let adjusted = match SeverityBand::from_score(severity_score) {
        SeverityBand::Critical => (base * CRITICAL_WAIT_FACTOR).max(CRITICAL_WAIT_FLOOR),
        SeverityBand::Moderate => base * MODERATE_WAIT_FACTOR,
        SeverityBand::Mild => base * MILD_WAIT_FACTOR,
    };

    (
        adjusted.round() as u32,
        (adjusted + f64::from(WAIT_JITTER_MAX)).round() as u32,
    )
}
