use serde::{Deserialize, Serialize};

/// Bytes one record occupies on the wire.
pub const RECORD_BYTES: usize = 8;

/// One timestamped sample reported by the device.
///
/// Wire layout is 8 bytes little-endian: a `u32` device timestamp in
/// microseconds followed by two `u16` channel values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub timestamp_us: u32,
    pub chan1: u16,
    pub chan2: u16,
}

impl TelemetryRecord {
    pub fn from_le_bytes(bytes: [u8; RECORD_BYTES]) -> Self {
        Self {
            timestamp_us: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            chan1: u16::from_le_bytes([bytes[4], bytes[5]]),
            chan2: u16::from_le_bytes([bytes[6], bytes[7]]),
        }
    }

    pub fn to_le_bytes(&self) -> [u8; RECORD_BYTES] {
        let mut out = [0u8; RECORD_BYTES];
        out[0..4].copy_from_slice(&self.timestamp_us.to_le_bytes());
        out[4..6].copy_from_slice(&self.chan1.to_le_bytes());
        out[6..8].copy_from_slice(&self.chan2.to_le_bytes());
        out
    }
}

/// Decoded samples of one completed trial, tagged with its 1-based index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialRecordBatch {
    pub trial_index: u64,
    pub records: Vec<TelemetryRecord>,
}

impl TrialRecordBatch {
    pub fn new(trial_index: u64, records: Vec<TelemetryRecord>) -> Self {
        Self {
            trial_index,
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
