pub mod config;
pub mod error;
pub mod state;
pub mod store;

pub use config::{ConfigError, ExperimentConfig, PulseWidth};
pub use error::AcquisitionError;
pub use state::{ExperimentStateMachine, TrialEvent, TrialPhase};
pub use store::TrialDataStore;
