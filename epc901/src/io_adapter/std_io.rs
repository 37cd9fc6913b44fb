use super::Transport;
use crate::error::{ProtocolError, Result};
use core::time::Duration;
use log::{trace, warn};
use std::{
    io::{self, ErrorKind, Read, Write},
    time::Instant,
};

/// Adapts any blocking byte stream into a line transport. Reads one byte at a time, so nothing
/// past the current line terminator is ever taken out of the stream.
pub struct StdIoAdapter<IO: Read + Write> {
    // None once closed
    io: Option<IO>,
    port: String,
}

impl<IO: Read + Write> StdIoAdapter<IO> {
    pub fn new(io: IO) -> Self {
        Self::with_port(io, "stream")
    }

    pub fn with_port(io: IO, port: impl Into<String>) -> Self {
        StdIoAdapter {
            io: Some(io),
            port: port.into(),
        }
    }

    fn io(&mut self) -> io::Result<&mut IO> {
        self.io
            .as_mut()
            .ok_or_else(|| io::Error::new(ErrorKind::NotConnected, "transport is closed"))
    }
}

impl<IO: Read + Write> Transport for StdIoAdapter<IO> {
    fn port(&self) -> &str {
        &self.port
    }

    fn write_line(&mut self, line: &[u8]) -> Result<()> {
        trace!("-> {:?}", String::from_utf8_lossy(line));
        let io = self.io()?;
        io.write_all(line)?;
        io.flush()?;
        Ok(())
    }

    fn read_line(&mut self, timeout: Duration) -> Result<Option<String>> {
        let deadline = Instant::now() + timeout;
        let io = self.io()?;
        let mut line = Vec::new();
        let mut byte = [0u8; 1];

        while Instant::now() < deadline {
            match io.read(&mut byte) {
                // End of stream, nothing else is going to arrive
                Ok(0) => break,
                Ok(_) if byte[0] == b'\n' => {
                    if line.last() == Some(&b'\r') {
                        line.pop();
                    }
                    let line = String::from_utf8(line).map_err(|_| ProtocolError::InvalidUtf8)?;
                    trace!("<- {:?}", line);
                    return Ok(Some(line));
                }
                Ok(_) => line.push(byte[0]),
                Err(e)
                    if matches!(
                        e.kind(),
                        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                    ) =>
                {
                    continue
                }
                Err(e) => return Err(e.into()),
            }
        }

        if !line.is_empty() {
            warn!(
                "Discarding {} bytes of an unterminated line from {}",
                line.len(),
                self.port
            );
        }
        trace!("<- timed out");
        Ok(None)
    }

    fn close(&mut self) {
        if let Some(mut io) = self.io.take() {
            if let Err(e) = io.flush() {
                warn!("Failed to flush {} while closing: {}", self.port, e);
            }
        }
    }

    fn is_open(&self) -> bool {
        self.io.is_some()
    }
}
