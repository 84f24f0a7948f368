pub mod paradigm;
pub mod record;
pub mod stimulus;

pub use paradigm::{DisplayLatency, Paradigm, TotalLatency, TrackingLatency};
pub use record::{RECORD_BYTES, TelemetryRecord, TrialRecordBatch};
pub use stimulus::{StimulusControl, StimulusState};
