use clap::Args;
use epc901::{BurstController, SerialAdapter, SerialConfig};
use simple_eyre::{eyre::WrapErr, Result};
use std::time::Duration;

#[derive(Args)]
pub struct SerialConf {
    /// Name of serial port that should be used
    #[clap(short, long, value_parser)]
    pub serial: String,

    /// Serial port baud rate
    #[clap(long, value_parser, default_value_t = epc901::config::DEFAULT_BAUD_RATE)]
    pub baud_rate: u32,

    /// How long to wait for each reply line, in milliseconds
    #[clap(long, value_parser, default_value = "1000")]
    pub timeout_ms: u64,
}

pub type SerialCamera = BurstController<SerialAdapter>;

impl SerialConf {
    pub fn config(&self) -> SerialConfig {
        SerialConfig {
            baud_rate: self.baud_rate,
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }

    pub fn open_camera(&self) -> Result<SerialCamera> {
        BurstController::open_serial(&self.serial, &self.config())
            .wrap_err_with(|| format!("Failed to connect to sensor on {}", self.serial))
    }
}
