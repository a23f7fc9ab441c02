//! Creativity - the sampling temperature handed to the text generator
//!
//! Always within [0.1, 1.0]; out-of-range input is clamped rather than rejected
//! because it comes straight from a UI slider.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Lowest temperature the generator is ever asked for.
pub const MIN_CREATIVITY: f32 = 0.1;

/// Highest temperature the generator is ever asked for.
pub const MAX_CREATIVITY: f32 = 1.0;

/// Temperature used when the caller has no preference.
pub const DEFAULT_CREATIVITY: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct Creativity(f32);

impl Creativity {
    /// Create a creativity value, clamping into [0.1, 1.0]. NaN maps to the default.
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(MIN_CREATIVITY, MAX_CREATIVITY))
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for Creativity {
    fn default() -> Self {
        Self(DEFAULT_CREATIVITY)
    }
}

impl From<f32> for Creativity {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl From<Creativity> for f32 {
    fn from(c: Creativity) -> f32 {
        c.0
    }
}

impl fmt::Display for Creativity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Creativity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<f32>()
            .map(Self::new)
            .map_err(|e| DomainError::parse(format!("Invalid creativity '{}': {}", s, e)))
    }
}
