use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use vrlat_core::{RECORD_BYTES, TelemetryRecord};

use crate::channel::{ChannelError, SyncChannel};
use crate::frame::encode_frame;

/// Scripted outcome of one `read_frame` call.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Frame(Vec<u8>),
    Timeout,
    Io(io::ErrorKind),
}

/// In-memory stand-in for the serial link.
///
/// Records every marker written and replays scripted responses in order.
/// Once the script runs out it synthesizes a ramp frame of the requested
/// length, which keeps hardware-free dry runs going indefinitely.
#[derive(Debug, Default)]
pub struct MockChannel {
    markers: Vec<u8>,
    responses: VecDeque<MockResponse>,
    synthesized: u32,
}

impl MockChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `frame` for the next unanswered `read_frame`.
    pub fn push_frame(&mut self, frame: Vec<u8>) -> &mut Self {
        self.responses.push_back(MockResponse::Frame(frame));
        self
    }

    /// Queues the same frame `count` times, one per expected trial.
    pub fn push_frames(&mut self, frame: &[u8], count: usize) -> &mut Self {
        for _ in 0..count {
            self.push_frame(frame.to_vec());
        }
        self
    }

    pub fn push_timeout(&mut self) -> &mut Self {
        self.responses.push_back(MockResponse::Timeout);
        self
    }

    pub fn push_io_error(&mut self, kind: io::ErrorKind) -> &mut Self {
        self.responses.push_back(MockResponse::Io(kind));
        self
    }

    /// Every marker byte written so far, in write order.
    pub fn markers(&self) -> &[u8] {
        &self.markers
    }

    fn synthesize(&mut self, len: usize) -> Vec<u8> {
        let points = len / RECORD_BYTES;
        let records: Vec<TelemetryRecord> = (0..points)
            .map(|i| {
                self.synthesized += 1;
                TelemetryRecord {
                    timestamp_us: self.synthesized * 1000,
                    chan1: (i % 2 == 0) as u16 * 1023,
                    chan2: i as u16,
                }
            })
            .collect();
        encode_frame(&records)
    }
}

impl SyncChannel for MockChannel {
    fn write_marker(&mut self, marker: u8) -> Result<(), ChannelError> {
        self.markers.push(marker);
        Ok(())
    }

    fn read_frame(&mut self, len: usize) -> Result<Vec<u8>, ChannelError> {
        match self.responses.pop_front() {
            // Scripted frames come back as-is, so callers can also exercise
            // their handling of a wrong-length frame.
            Some(MockResponse::Frame(frame)) => Ok(frame),
            Some(MockResponse::Timeout) => Err(ChannelError::Timeout(Duration::from_secs(2))),
            Some(MockResponse::Io(kind)) => {
                Err(ChannelError::Io(io::Error::new(kind, "scripted failure")))
            }
            None => Ok(self.synthesize(len)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::SYNC_MARKER;
    use crate::frame::decode_frame;

    #[test]
    fn test_records_markers_in_order() {
        let mut mock = MockChannel::new();
        mock.write_marker(SYNC_MARKER).unwrap();
        mock.write_marker(b'X').unwrap();
        assert_eq!(mock.markers(), &[SYNC_MARKER, b'X']);
    }

    #[test]
    fn test_replays_script_then_synthesizes() {
        let mut mock = MockChannel::new();
        mock.push_frame(vec![0xAA; 8]).push_timeout();

        assert_eq!(mock.read_frame(8).unwrap(), vec![0xAA; 8]);
        assert!(matches!(
            mock.read_frame(8),
            Err(ChannelError::Timeout(_))
        ));

        let synthesized = mock.read_frame(16).unwrap();
        assert_eq!(synthesized.len(), 16);
        assert_eq!(decode_frame(&synthesized, 2).unwrap().len(), 2);
    }

    #[test]
    fn test_synthesized_timestamps_advance() {
        let mut mock = MockChannel::new();
        let first = decode_frame(&mock.read_frame(8).unwrap(), 1).unwrap();
        let second = decode_frame(&mock.read_frame(8).unwrap(), 1).unwrap();
        assert!(second[0].timestamp_us > first[0].timestamp_us);
    }

    #[test]
    fn test_scripted_io_error_surfaces() {
        let mut mock = MockChannel::new();
        mock.push_io_error(io::ErrorKind::BrokenPipe);
        assert!(matches!(mock.read_frame(8), Err(ChannelError::Io(_))));
    }
}
