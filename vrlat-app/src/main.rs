mod cli;
mod export;

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use vrlat_core::{Paradigm, StimulusState};
use vrlat_device::{MockChannel, SerialChannel, SyncChannel};
use vrlat_experiment::{ExperimentConfig, ExperimentStateMachine, TrialDataStore};
use vrlat_timing::HighPrecisionTimer;

use cli::Cli;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.list_ports {
        return list_ports();
    }

    let config = cli.config();
    let paradigm = cli.paradigm.paradigm();

    let started = Instant::now();
    let store = if cli.dry_run {
        log::info!("dry run against the mock device");
        acquire(config, paradigm, MockChannel::new())?
    } else {
        let port = cli.port.as_deref().context("--port is required")?;
        let channel = SerialChannel::open(port, cli.baud, cli.timeout)?;
        acquire(config, paradigm, channel)?
    };

    println!(
        "{} trials, {} records in {:.1} s",
        store.len(),
        store.record_count(),
        started.elapsed().as_secs_f64()
    );

    if let Some(path) = &cli.json {
        export::write_json(path, &store)?;
    }
    if let Some(path) = &cli.csv {
        export::write_csv(path, &store)?;
    }

    Ok(())
}

fn acquire<C: SyncChannel>(
    config: ExperimentConfig,
    paradigm: Box<dyn Paradigm>,
    channel: C,
) -> Result<TrialDataStore> {
    let mut machine = ExperimentStateMachine::new(
        config,
        paradigm,
        channel,
        HighPrecisionTimer::new(),
        rand::rng(),
    );
    let mut stimulus = StimulusState::default();
    machine.run(&mut stimulus)?;
    Ok(machine.into_store())
}

fn list_ports() -> Result<()> {
    let ports = serialport::available_ports().context("failed to enumerate serial ports")?;
    if ports.is_empty() {
        println!("no serial ports found");
    }
    for port in ports {
        println!("{}", port.port_name);
    }
    Ok(())
}
