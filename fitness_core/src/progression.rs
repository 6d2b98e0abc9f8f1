//! Workout progress increments.
//!
//! Progress moves up in fixed steps (10% by default) and is capped at 100%.
//! Once a workout is complete, further increments are rejected.

use crate::{Error, Result};

/// Default increment applied by "progress" actions
pub const DEFAULT_PROGRESS_INCREMENT: f32 = 0.1;

/// Round to four decimals so repeated f32 steps land on exact tenths
fn round_progress(value: f32) -> f32 {
    (value * 10_000.0).round() / 10_000.0
}

/// Next progress value after one increment, or `None` if already complete
pub fn increment_progress(current: f32, step: f32) -> Option<f32> {
    if current >= 1.0 {
        return None;
    }
    Some(round_progress(current + step).min(1.0))
}

/// Validate a configured increment step
pub fn validate_increment(step: f32) -> Result<f32> {
    if step.is_finite() && step > 0.0 && step <= 1.0 {
        Ok(step)
    } else {
        Err(Error::InvalidInput(format!(
            "progress increment must be in (0, 1], got {}",
            step
        )))
    }
}
