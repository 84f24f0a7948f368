use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail};
use clap::{Parser, ValueEnum};
use vrlat_core::{DisplayLatency, Paradigm, TotalLatency, TrackingLatency};
use vrlat_experiment::{ExperimentConfig, PulseWidth};

#[derive(Parser, Debug)]
#[command(version, about = "VR latency measurement over a serial sync device")]
pub struct Cli {
    /// Serial port of the acquisition device, e.g. /dev/ttyACM0
    #[arg(long, required_unless_present_any = ["list_ports", "dry_run"])]
    pub port: Option<String>,

    /// Baud rate of the device link
    #[arg(long, default_value_t = 250_000)]
    pub baud: u32,

    /// Seconds to wait for one telemetry frame
    #[arg(long, default_value = "2", value_parser(parse_timeout))]
    pub timeout: Duration,

    /// Number of trials to run
    #[arg(long, default_value_t = 20)]
    pub trials: u64,

    /// Stimulus-on seconds: one width, or "min,max" to jitter
    #[arg(long, default_value = "0.5")]
    pub on_width: PulseWidth,

    /// Stimulus-off seconds: one width, or "min,max" to jitter
    #[arg(long, default_value = "0.5")]
    pub off_width: PulseWidth,

    /// Records the device sends per frame
    #[arg(long, default_value_t = 240)]
    pub points: usize,

    /// Which latency the stimulus transitions isolate
    #[arg(long, value_enum, default_value_t = ParadigmKind::Display)]
    pub paradigm: ParadigmKind,

    /// Write the decoded batches to this JSON file
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Write one CSV row per record to this file
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// List available serial ports and exit
    #[arg(long)]
    pub list_ports: bool,

    /// Run against the built-in mock device instead of hardware
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    pub fn config(&self) -> ExperimentConfig {
        ExperimentConfig {
            trials: self.trials,
            on_width: self.on_width,
            off_width: self.off_width,
            points_per_frame: self.points,
        }
    }
}

fn parse_timeout(s: &str) -> Result<Duration, anyhow::Error> {
    let seconds: f64 = s
        .parse()
        .map_err(|_| anyhow!("'{s}' is not a number of seconds"))?;
    if !seconds.is_finite() || seconds <= 0.0 {
        bail!("timeout must be a positive number of seconds");
    }
    Ok(Duration::try_from_secs_f64(seconds)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ParadigmKind {
    Display,
    Tracking,
    Total,
}

impl ParadigmKind {
    pub fn paradigm(self) -> Box<dyn Paradigm> {
        match self {
            ParadigmKind::Display => Box::new(DisplayLatency),
            ParadigmKind::Tracking => Box::new(TrackingLatency::default()),
            ParadigmKind::Total => Box::new(TotalLatency::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_mirror_config_defaults() {
        let cli = Cli::parse_from(["vrlat", "--port", "/dev/ttyACM0"]);
        let config = cli.config();
        let defaults = ExperimentConfig::default();
        assert_eq!(config.trials, defaults.trials);
        assert_eq!(config.on_width, defaults.on_width);
        assert_eq!(config.off_width, defaults.off_width);
        assert_eq!(config.points_per_frame, defaults.points_per_frame);
        assert_eq!(cli.baud, 250_000);
        assert_eq!(cli.timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_timeout_rejects_non_positive_and_non_finite() {
        assert!(Cli::try_parse_from(["vrlat", "--dry-run", "--timeout=-1"]).is_err());
        assert!(Cli::try_parse_from(["vrlat", "--dry-run", "--timeout", "0"]).is_err());
        assert!(Cli::try_parse_from(["vrlat", "--dry-run", "--timeout", "nan"]).is_err());
        assert!(Cli::try_parse_from(["vrlat", "--dry-run", "--timeout", "inf"]).is_err());

        let cli = Cli::parse_from(["vrlat", "--dry-run", "--timeout", "0.25"]);
        assert_eq!(cli.timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_width_range_parses() {
        let cli = Cli::parse_from(["vrlat", "--dry-run", "--on-width", "0.1,0.3"]);
        assert_eq!(cli.on_width, PulseWidth::range(0.1, 0.3));
    }

    #[test]
    fn test_port_required_unless_portless_mode() {
        assert!(Cli::try_parse_from(["vrlat"]).is_err());
        assert!(Cli::try_parse_from(["vrlat", "--list-ports"]).is_ok());
        assert!(Cli::try_parse_from(["vrlat", "--dry-run"]).is_ok());
    }
}
