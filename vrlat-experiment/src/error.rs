use thiserror::Error;
use vrlat_device::{ChannelError, FrameError};

use crate::config::ConfigError;

/// Anything that can abort a run. Channel and frame failures carry the
/// 1-based index of the trial they killed; that trial's data is never
/// appended.
#[derive(Error, Debug)]
pub enum AcquisitionError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("trial {trial}: {source}")]
    Channel { trial: u64, source: ChannelError },

    #[error("trial {trial}: {source}")]
    Frame { trial: u64, source: FrameError },
}

impl AcquisitionError {
    /// Index of the trial the run died in, if it got that far.
    pub fn trial(&self) -> Option<u64> {
        match self {
            AcquisitionError::Config(_) => None,
            AcquisitionError::Channel { trial, .. } | AcquisitionError::Frame { trial, .. } => {
                Some(*trial)
            }
        }
    }
}
