//! Growth status classification.
//!
//! A deliberately simplified placeholder: an age-bucketed height cutoff
//! flags stunting and a flat BMI cutoff flags risk. This is an approximation
//! for demo use, not the WHO length/height-for-age standard.

use crate::{Gender, GrowthStatus, MeasurementInput};
use serde::Serialize;

/// BMI below which a child of adequate height is flagged as at risk
pub const AT_RISK_BMI: f64 = 13.5;

/// Result of classifying one measurement
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Classification {
    /// BMI rounded to one decimal place, as stored on the record
    pub bmi: f64,
    pub status: GrowthStatus,
}

/// Body-mass index from weight (kg) and height (cm).
///
/// Returns 0 when either value is missing or non-positive.
pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    if !(weight_kg > 0.0) || !(height_cm > 0.0) {
        return 0.0;
    }
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

/// Minimum height (cm) below which a child of this age counts as stunted
pub fn stunting_threshold_cm(age_months: i64) -> f64 {
    if age_months < 24 {
        75.0
    } else if age_months < 60 {
        95.0
    } else {
        110.0
    }
}

/// Classify a measurement into a stored BMI and a growth status.
///
/// Gender is accepted but not used by the current thresholds. The status is
/// decided on the unrounded BMI; only the returned value is rounded.
pub fn classify(
    weight_kg: f64,
    height_cm: f64,
    age_months: i64,
    _gender: Gender,
) -> Classification {
    let raw_bmi = bmi(weight_kg, height_cm);

    let status = if age_months <= 0 || !(height_cm > 0.0) {
        GrowthStatus::Unknown
    } else if height_cm < stunting_threshold_cm(age_months) {
        GrowthStatus::Stunted
    } else if raw_bmi < AT_RISK_BMI {
        GrowthStatus::AtRisk
    } else {
        GrowthStatus::Normal
    };

    Classification {
        bmi: round_to_tenth(raw_bmi),
        status,
    }
}

/// Classify the current contents of a form without validating it
pub fn preview(input: &MeasurementInput) -> Classification {
    classify(
        input.weight_kg,
        input.height_cm,
        input.age_months,
        input.gender,
    )
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
