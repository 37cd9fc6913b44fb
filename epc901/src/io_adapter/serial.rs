use super::std_io::StdIoAdapter;
use crate::{
    config::SerialConfig,
    error::{Error, Result},
};
use core::time::Duration;
use log::debug;
use serialport::SerialPort;

/// Upper bound for a single blocking read, line deadlines are tracked by the adapter itself
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub type SerialAdapter = StdIoAdapter<Box<dyn SerialPort>>;

/// Opens serial device at `port`. Failing to open is final, there are no retries.
pub fn open_serial(port: &str, conf: &SerialConfig) -> Result<SerialAdapter> {
    debug!("Opening {} at {} baud", port, conf.baud_rate);
    let io = serialport::new(port, conf.baud_rate)
        .timeout(conf.timeout.min(POLL_INTERVAL))
        .open()
        .map_err(|e| Error::Connection {
            port: port.to_owned(),
            source: Box::new(e),
        })?;
    Ok(StdIoAdapter::with_port(io, port))
}

/// Names of serial devices currently present on the system
pub fn list_ports() -> Result<Vec<String>> {
    let ports = serialport::available_ports().map_err(std::io::Error::from)?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}
