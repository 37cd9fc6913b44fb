mod cli;
mod output;
mod serial;

use clap::Parser;
use simple_eyre::{eyre::Report, Result};

use cli::*;
use epc901::{BurstConfig, CaptureMode};

fn main() -> Result<()> {
    simple_eyre::install()?;
    let cli = Cli::parse();
    env_logger::init();

    match &cli.command {
        Commands::List => list_serial(),
        Commands::Burst(conf) => run_burst(conf),
    }
}

fn list_serial() -> Result<()> {
    let ports = epc901::list_ports()?;
    output::print_ports(&mut output::terminal(), &ports)?;
    Ok(())
}

fn run_burst(conf: &BurstConf) -> Result<()> {
    let burst = BurstConfig::try_new(conf.frames.into(), conf.interval.try_into()?)?;
    let mut camera = conf.serial.open_camera()?;

    camera.configure_exposure(conf.exposure)?;
    camera.apply_burst(burst)?;
    println!("Recording images..");
    camera.capture_burst(CaptureMode::from(conf.fast))?;
    println!("Transfering image data");
    let session = match camera.transfer_all() {
        Ok(session) => session,
        Err(e) if e.is_protocol() => {
            return Err(Report::new(e).wrap_err("Board replied out of protocol, captured frames are lost"))
        }
        Err(e) => return Err(e.into()),
    };
    camera.close();

    log::debug!("Printing summary of {} frames", session.frames.len());
    for line in output::session_summary(&session) {
        println!("{}", line);
    }
    Ok(())
}
