//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a score is a finite number.
///
/// Some legacy clients encode "no data yet" as ±infinity; that sentinel is
/// rejected at the boundary instead of being silently coerced.
pub fn validate_finite_score(score: f64) -> Result<(), ValidationError> {
    if !score.is_finite() {
        let mut err = ValidationError::new("score_not_finite");
        err.message = Some(format!("score must be a finite number (got {score})").into());
        return Err(err);
    }

    Ok(())
}
