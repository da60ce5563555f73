//! Validation utilities for classifier output

/// Lower bound of demo-mode confidences
pub const DEMO_CONFIDENCE_MIN: f32 = 0.82;

/// Upper bound (exclusive) of demo-mode confidences
pub const DEMO_CONFIDENCE_MAX: f32 = 0.98;

/// Validate that a confidence is a probability
pub fn validate_confidence(confidence: f32) -> Result<(), &'static str> {
    if !confidence.is_finite() {
        return Err("Confidence must be a finite number");
    }
    if !(0.0..=1.0).contains(&confidence) {
        return Err("Confidence must lie in [0, 1]");
    }
    Ok(())
}

/// Validate a network output distribution against its class set size
pub fn validate_distribution(probabilities: &[f32], num_classes: usize) -> Result<(), &'static str> {
    if probabilities.len() != num_classes {
        return Err("Output size does not match the class set");
    }
    for p in probabilities {
        validate_confidence(*p)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_confidence() {
        assert!(validate_confidence(0.0).is_ok());
        assert!(validate_confidence(1.0).is_ok());
        assert!(validate_confidence(-0.01).is_err());
        assert!(validate_confidence(1.01).is_err());
        assert!(validate_confidence(f32::NAN).is_err());
    }

    #[test]
    fn test_validate_distribution() {
        assert!(validate_distribution(&[0.2, 0.8], 2).is_ok());
        assert!(validate_distribution(&[0.2, 0.8], 3).is_err());
        assert!(validate_distribution(&[0.2, 1.8], 2).is_err());
    }
}
