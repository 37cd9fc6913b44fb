use crate::serial::SerialConf;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lists connected serial devices
    List,
    /// Capture a burst of frames and print a summary of each
    Burst(BurstConf),
}

#[derive(Args)]
pub struct BurstConf {
    /// Exposure time in microseconds
    #[clap(short, long, value_parser, default_value = "1000")]
    pub exposure: u32,

    /// Amount of frames in a burst
    #[clap(short, long, value_parser, default_value = "10")]
    pub frames: u32,

    /// Interval in milliseconds between frames, 0 means as fast as the board acknowledges
    #[clap(short, long, value_parser, default_value = "0")]
    pub interval: u64,

    /// Let the sensor pick the cadence, interval is ignored
    #[clap(long, action)]
    pub fast: bool,

    #[clap(flatten)]
    pub serial: SerialConf,
}
