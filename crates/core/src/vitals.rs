//! Vital-sign extraction from free-form intake text.
//!
//! Reception staff type vitals as loose text such as
//! `"BP: 160/95, HR: 110, Temp: 101.2"`. This module pulls the structured
//! readings back out so the scorer can react to them. Extraction is tolerant:
//! fragments that do not match any pattern are ignored, never an error.

use once_cell::sync::Lazy;
use regex::Regex;

static BLOOD_PRESSURE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{2,3})/(\d{2,3})").unwrap());

static HEART_RATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"hr:\s*(\d+)|heart rate:\s*(\d+)").unwrap());

static TEMPERATURE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"temp:\s*(\d+\.?\d*)|temperature:\s*(\d+\.?\d*)").unwrap());

/// A blood-pressure reading in mmHg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BloodPressure {
    pub systolic: u32,
    pub diastolic: u32,
}

/// Structured vital signs recovered from intake text.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VitalSigns {
    pub blood_pressure: Option<BloodPressure>,
    /// Heart rate in beats per minute.
    pub heart_rate: Option<u32>,
    /// Body temperature in degrees Fahrenheit.
    pub temperature_f: Option<f64>,
}

impl VitalSigns {
    /// Extracts vital signs from free-form text.
    ///
    /// Matching is case-insensitive. A blood-pressure value is only taken
    /// when the text mentions it explicitly (`bp:` or `blood pressure`), so a
    /// stray `120/80` in a symptom description is not misread as a vital.
    pub fn extract(text: &str) -> Self {
        let lowered = text.to_lowercase();

        let blood_pressure = if lowered.contains("bp:") || lowered.contains("blood pressure") {
            BLOOD_PRESSURE_RE.captures(&lowered).and_then(|caps| {
                let systolic = caps.get(1)?.as_str().parse().ok()?;
                let diastolic = caps.get(2)?.as_str().parse().ok()?;
                Some(BloodPressure {
                    systolic,
                    diastolic,
                })
            })
        } else {
            None
        };

        let heart_rate = HEART_RATE_RE
            .captures(&lowered)
            .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
            .and_then(|m| m.as_str().parse().ok());

        let temperature_f = TEMPERATURE_RE
            .captures(&lowered)
            .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
            .and_then(|m| m.as_str().parse().ok());

        Self {
            blood_pressure,
            heart_rate,
            temperature_f,
        }
    }

    /// True when no reading was recovered from the text.
    pub fn is_empty(&self) -> bool {
        self.blood_pressure.is_none() && self.heart_rate.is_none() && self.temperature_f.is_none()
    }
}
