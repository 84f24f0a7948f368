use thiserror::Error;
use vrlat_core::{RECORD_BYTES, TelemetryRecord};

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("malformed frame: {actual} bytes for {points} records, expected {expected}")]
    MalformedFrame {
        expected: usize,
        actual: usize,
        points: usize,
    },

    #[error("frame size overflows for {points} records")]
    OversizedFrame { points: usize },
}

/// Decodes one telemetry frame holding exactly `points` records.
///
/// The buffer must be `points * RECORD_BYTES` long; any other length fails
/// whole. A frame is never decoded partially.
pub fn decode_frame(buf: &[u8], points: usize) -> Result<Vec<TelemetryRecord>, FrameError> {
    let Some(expected) = points.checked_mul(RECORD_BYTES) else {
        return Err(FrameError::OversizedFrame { points });
    };
    if buf.len() != expected {
        return Err(FrameError::MalformedFrame {
            expected,
            actual: buf.len(),
            points,
        });
    }

    Ok(buf
        .chunks_exact(RECORD_BYTES)
        .map(|chunk| {
            let mut bytes = [0u8; RECORD_BYTES];
            bytes.copy_from_slice(chunk);
            TelemetryRecord::from_le_bytes(bytes)
        })
        .collect())
}

/// Inverse of `decode_frame`. The mock channel and tests build frames with
/// it.
pub fn encode_frame(records: &[TelemetryRecord]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(records.len() * RECORD_BYTES);
    for rec in records {
        buf.extend_from_slice(&rec.to_le_bytes());
    }
    buf
}
