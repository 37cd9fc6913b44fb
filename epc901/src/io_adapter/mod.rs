pub(crate) mod std_io;
#[cfg(feature = "serial")]
pub(crate) mod serial;

use crate::{error::Result, protocol::Protocol};
use core::time::Duration;

/// Line oriented byte stream connected to the breakout board
pub trait Transport {
    /// Human readable name of the connected device, usually a serial port path
    fn port(&self) -> &str;

    /// Writes bytes verbatim, caller is responsible for the line terminator
    fn write_line(&mut self, line: &[u8]) -> Result<()>;

    /// Waits for a single line for at most `timeout`. Returns `None` if no complete line arrived
    /// in time, which is not an error on transport level.
    fn read_line(&mut self, timeout: Duration) -> Result<Option<String>>;

    /// Releases underlying connection, does nothing if it is already released
    fn close(&mut self);

    fn is_open(&self) -> bool;

    fn into_protocol(self) -> Protocol<Self>
    where
        Self: Sized,
    {
        Protocol::new(self)
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn port(&self) -> &str {
        (**self).port()
    }

    fn write_line(&mut self, line: &[u8]) -> Result<()> {
        (**self).write_line(line)
    }

    fn read_line(&mut self, timeout: Duration) -> Result<Option<String>> {
        (**self).read_line(timeout)
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }
}
