use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use serialport::SerialPort;
use thiserror::Error;

/// Marker byte written at each stimulus transition.
pub const SYNC_MARKER: u8 = b'S';

#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("failed to open serial port '{port}': {source}")]
    Open {
        port: String,
        source: serialport::Error,
    },

    #[error("sync channel I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("device sent no complete frame within {0:?}")]
    Timeout(Duration),
}

/// Duplex byte link to the acquisition device.
///
/// One run owns one channel exclusively; no unrelated traffic is interleaved
/// while a frame read is outstanding.
pub trait SyncChannel {
    /// Writes a single marker byte and flushes it out immediately.
    fn write_marker(&mut self, marker: u8) -> Result<(), ChannelError>;

    /// Reads exactly `len` bytes, blocking up to the configured timeout.
    /// A timeout fails the call whole; a partial buffer is never returned.
    fn read_frame(&mut self, len: usize) -> Result<Vec<u8>, ChannelError>;
}

pub struct SerialChannel {
    port: Box<dyn SerialPort>,
    timeout: Duration,
}

impl SerialChannel {
    /// Opens `path` and drains the device's boot greeting line, so the first
    /// trial's read sees frame bytes only. A device that boots silently just
    /// times the drain out.
    pub fn open(path: &str, baud_rate: u32, timeout: Duration) -> Result<Self, ChannelError> {
        let port = serialport::new(path, baud_rate)
            .timeout(timeout)
            .open()
            .map_err(|source| ChannelError::Open {
                port: path.to_string(),
                source,
            })?;

        log::info!("opened serial port {path} at {baud_rate} baud");

        let mut channel = Self { port, timeout };
        channel.drain_greeting()?;
        Ok(channel)
    }

    fn drain_greeting(&mut self) -> Result<(), ChannelError> {
        let mut greeting = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            match self.port.read(&mut byte) {
                Ok(0) => break,
                Ok(_) => {
                    if byte[0] == b'\n' {
                        break;
                    }
                    greeting.push(byte[0]);
                }
                Err(e) if e.kind() == ErrorKind::TimedOut => break,
                Err(e) => return Err(ChannelError::Io(e)),
            }
        }
        if !greeting.is_empty() {
            log::debug!("device greeting: {}", String::from_utf8_lossy(&greeting).trim());
        }
        Ok(())
    }
}

impl SyncChannel for SerialChannel {
    fn write_marker(&mut self, marker: u8) -> Result<(), ChannelError> {
        self.port.write_all(&[marker])?;
        self.port.flush()?;
        Ok(())
    }

    fn read_frame(&mut self, len: usize) -> Result<Vec<u8>, ChannelError> {
        let mut buf = vec![0u8; len];
        // Windows surfaces a timed-out read as EOF rather than TimedOut.
        self.port.read_exact(&mut buf).map_err(|e| {
            if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::UnexpectedEof) {
                ChannelError::Timeout(self.timeout)
            } else {
                ChannelError::Io(e)
            }
        })?;
        Ok(buf)
    }
}
