use crate::model::ComplianceStatus;

/// Largest absolute deviation (percent) still considered compliant.
pub const COMPLIANT_MAX_PERCENT: f64 = 5.0;

/// Largest absolute deviation (percent) classified as needing attention.
/// Anything above is non-compliant.
pub const NEEDS_ATTENTION_MAX_PERCENT: f64 = 15.0;

/// Map a deviation to its compliance tier. Thresholds are inclusive upper
/// bounds on the absolute value.
pub fn classify(deviation_percent: Option<f64>) -> ComplianceStatus {
    let Some(deviation) = deviation_percent else {
        return ComplianceStatus::Undetermined;
    };

    let magnitude = deviation.abs();
    if magnitude <= COMPLIANT_MAX_PERCENT {
        ComplianceStatus::Compliant
    } else if magnitude <= NEEDS_ATTENTION_MAX_PERCENT {
        ComplianceStatus::NeedsAttention
    } else if magnitude > NEEDS_ATTENTION_MAX_PERCENT {
        ComplianceStatus::NonCompliant
    } else {
        // NaN compares false everywhere
        ComplianceStatus::Undetermined
    }
}
