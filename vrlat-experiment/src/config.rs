use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vrlat_core::RECORD_BYTES;
use vrlat_timing::JitterRange;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("trial count must be positive")]
    ZeroTrials,

    #[error("points per frame must be positive")]
    ZeroPoints,

    #[error("frame size overflows for {points} points per frame")]
    OversizedFrame { points: usize },

    #[error("{name} must be finite, got {value}")]
    NonFiniteWidth { name: &'static str, value: f64 },

    #[error("{name} must not be negative, got {value}")]
    NegativeWidth { name: &'static str, value: f64 },

    #[error("{name} range is inverted: [{min}, {max}]")]
    InvertedRange {
        name: &'static str,
        min: f64,
        max: f64,
    },

    #[error("a pulse width takes one or two values, got {len}")]
    WidthArity { len: usize },

    #[error("unparsable pulse width '{text}'")]
    WidthParse { text: String },
}

/// Stimulus pulse width in seconds: fixed, or a `[min, max]` interval the
/// per-trial jitter is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PulseWidth {
    pub min_s: f64,
    pub max_s: f64,
}

impl PulseWidth {
    pub fn fixed(width_s: f64) -> Self {
        Self {
            min_s: width_s,
            max_s: width_s,
        }
    }

    pub fn range(min_s: f64, max_s: f64) -> Self {
        Self { min_s, max_s }
    }

    /// Accepts the one- or two-element form scripts pass around: a lone
    /// width applies symmetrically.
    pub fn from_values(values: &[f64]) -> Result<Self, ConfigError> {
        match *values {
            [width] => Ok(Self::fixed(width)),
            [min, max] => Ok(Self::range(min, max)),
            _ => Err(ConfigError::WidthArity { len: values.len() }),
        }
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if !self.min_s.is_finite() || !self.max_s.is_finite() {
            return Err(ConfigError::NonFiniteWidth {
                name,
                value: if self.min_s.is_finite() {
                    self.max_s
                } else {
                    self.min_s
                },
            });
        }
        if self.min_s < 0.0 || self.max_s < 0.0 {
            return Err(ConfigError::NegativeWidth {
                name,
                value: self.min_s.min(self.max_s),
            });
        }
        if self.min_s > self.max_s {
            return Err(ConfigError::InvertedRange {
                name,
                min: self.min_s,
                max: self.max_s,
            });
        }
        Ok(())
    }

    pub fn jitter(&self) -> JitterRange {
        JitterRange::new(
            Duration::from_secs_f64(self.min_s),
            Duration::from_secs_f64(self.max_s),
        )
    }
}

impl FromStr for PulseWidth {
    type Err = ConfigError;

    /// Parses `"0.5"` or `"0.1,0.3"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values: Vec<f64> = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| ConfigError::WidthParse { text: s.to_string() })?;
        Self::from_values(&values)
    }
}

/// Everything a run needs decided up front.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub trials: u64,
    pub on_width: PulseWidth,
    pub off_width: PulseWidth,
    /// Records the device sends per frame. The firmware is flashed with the
    /// same number; a mismatch is not negotiated at runtime and shows up as
    /// a read timeout or as desynchronized later frames.
    pub points_per_frame: usize,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            trials: 20,
            on_width: PulseWidth::fixed(0.5),
            off_width: PulseWidth::fixed(0.5),
            points_per_frame: 240,
        }
    }
}

impl ExperimentConfig {
    /// Rejects a bad configuration before anything is scheduled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trials == 0 {
            return Err(ConfigError::ZeroTrials);
        }
        if self.points_per_frame == 0 {
            return Err(ConfigError::ZeroPoints);
        }
        if self.points_per_frame.checked_mul(RECORD_BYTES).is_none() {
            return Err(ConfigError::OversizedFrame {
                points: self.points_per_frame,
            });
        }
        self.on_width.validate("on_width")?;
        self.off_width.validate("off_width")?;
        Ok(())
    }

    /// Bytes in one full telemetry frame. Saturates for point counts
    /// `validate` rejects.
    pub fn frame_bytes(&self) -> usize {
        self.points_per_frame.saturating_mul(RECORD_BYTES)
    }
}
