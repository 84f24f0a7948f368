use std::time::Duration;

use rand::Rng;
use vrlat_core::{Paradigm, StimulusControl, TrialRecordBatch};
use vrlat_device::{SYNC_MARKER, SyncChannel, decode_frame};
use vrlat_timing::{Timer, TrialScheduler};

use crate::config::ExperimentConfig;
use crate::error::AcquisitionError;
use crate::store::TrialDataStore;

/// Where the machine sits between events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialPhase {
    Idle,
    Armed,
    AwaitingResponse,
    TrialComplete,
    Terminated,
}

/// Scheduler event identities. At most one of each is ever pending;
/// re-scheduling an identity supersedes the stale entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialEvent {
    ArmTrial,
    EndTrial,
}

pub struct ExperimentStateMachine<P, C, T, R>
where
    P: Paradigm,
    C: SyncChannel,
    T: Timer,
    R: Rng,
{
    phase: TrialPhase,
    trial_index: u64,
    paradigm: P,
    channel: C,
    scheduler: TrialScheduler<TrialEvent, T, R>,
    config: ExperimentConfig,
    store: TrialDataStore,
    abort_requested: bool,
}

impl<P, C, T, R> ExperimentStateMachine<P, C, T, R>
where
    P: Paradigm,
    C: SyncChannel,
    T: Timer,
    R: Rng,
{
    pub fn new(config: ExperimentConfig, paradigm: P, channel: C, timer: T, rng: R) -> Self {
        Self {
            phase: TrialPhase::Idle,
            trial_index: 0,
            paradigm,
            channel,
            scheduler: TrialScheduler::new(timer, rng),
            config,
            store: TrialDataStore::new(),
            abort_requested: false,
        }
    }

    /// Drives a full run: validates the configuration, then services
    /// scheduler events until the machine terminates.
    ///
    /// A completed run over `trials` configured trials leaves the store with
    /// exactly that many batches, indexed `1..=trials` in order.
    pub fn run(&mut self, stimulus: &mut dyn StimulusControl) -> Result<(), AcquisitionError> {
        if self.phase == TrialPhase::Terminated {
            return Ok(());
        }
        self.config.validate()?;
        log::info!(
            "starting {} run: {} trials, {} points per frame",
            self.paradigm.name(),
            self.config.trials,
            self.config.points_per_frame
        );

        let started = self.scheduler.timer().now();
        while self.step(stimulus)? {}

        log::info!(
            "run finished after {:.1} s with {} completed trials",
            self.scheduler.timer().elapsed(started).as_secs_f64(),
            self.store.len()
        );
        Ok(())
    }

    /// Services the next due event, arming the opening trial first when the
    /// machine is still idle. Returns whether the machine is still live, for
    /// callers that interleave the run with their own loop.
    pub fn step(&mut self, stimulus: &mut dyn StimulusControl) -> Result<bool, AcquisitionError> {
        if self.abort_requested && self.phase != TrialPhase::Terminated {
            log::info!("abort requested after {} completed trials", self.store.len());
            self.terminate();
        }
        if self.phase == TrialPhase::Terminated {
            return Ok(false);
        }
        if self.phase == TrialPhase::Idle {
            self.config.validate()?;
            self.scheduler
                .schedule_once(Duration::ZERO, TrialEvent::ArmTrial);
        }

        let Some(event) = self.scheduler.wait_next() else {
            log::warn!("nothing scheduled with the run still live");
            return Ok(false);
        };

        let outcome = match event {
            TrialEvent::ArmTrial => {
                self.arm_trial(stimulus);
                Ok(())
            }
            TrialEvent::EndTrial => self.end_trial(stimulus),
        };
        if let Err(err) = outcome {
            self.terminate();
            return Err(err);
        }
        Ok(self.phase != TrialPhase::Terminated)
    }

    /// Asks the machine to stop cleanly before the next event is serviced.
    pub fn abort(&mut self) {
        self.abort_requested = true;
    }

    fn arm_trial(&mut self, stimulus: &mut dyn StimulusControl) {
        self.trial_index += 1;
        self.phase = TrialPhase::Armed;
        self.paradigm.drive(stimulus, true);

        let on = self.config.on_width.jitter();
        let delay = self.scheduler.schedule_jittered(&on, TrialEvent::EndTrial);
        log::debug!(
            "trial {} armed, stimulus active for {:.3} s",
            self.trial_index,
            delay.as_secs_f64()
        );
    }

    fn end_trial(&mut self, stimulus: &mut dyn StimulusControl) -> Result<(), AcquisitionError> {
        let trial = self.trial_index;
        self.phase = TrialPhase::AwaitingResponse;

        // Stimulus off first, marker right behind it: the marker is the
        // reference edge the device timestamps against.
        self.paradigm.drive(stimulus, false);
        self.channel
            .write_marker(SYNC_MARKER)
            .map_err(|source| AcquisitionError::Channel { trial, source })?;

        let buf = self
            .channel
            .read_frame(self.config.frame_bytes())
            .map_err(|source| AcquisitionError::Channel { trial, source })?;
        let records = decode_frame(&buf, self.config.points_per_frame)
            .map_err(|source| AcquisitionError::Frame { trial, source })?;

        self.phase = TrialPhase::TrialComplete;
        self.store.append(TrialRecordBatch::new(trial, records));
        log::debug!(
            "trial {}/{} complete, {} records",
            trial,
            self.config.trials,
            self.config.points_per_frame
        );

        if trial >= self.config.trials {
            log::info!("all {} trials complete", self.config.trials);
            self.terminate();
        } else {
            let off = self.config.off_width.jitter();
            let delay = self.scheduler.schedule_jittered(&off, TrialEvent::ArmTrial);
            log::debug!("next trial in {:.3} s", delay.as_secs_f64());
        }
        Ok(())
    }

    fn terminate(&mut self) {
        self.scheduler.clear();
        self.phase = TrialPhase::Terminated;
    }

    pub fn phase(&self) -> TrialPhase {
        self.phase
    }

    /// 1-based index of the trial in flight; 0 before the first arms.
    pub fn trial_index(&self) -> u64 {
        self.trial_index
    }

    pub fn completed_trials(&self) -> usize {
        self.store.len()
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn store(&self) -> &TrialDataStore {
        &self.store
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Consumes the machine, handing the data out and releasing the channel.
    pub fn into_store(self) -> TrialDataStore {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PulseWidth;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use vrlat_core::{DisplayLatency, StimulusState};
    use vrlat_device::MockChannel;
    use vrlat_timing::HighPrecisionTimer;

    fn quick_config(trials: u64, points: usize) -> ExperimentConfig {
        ExperimentConfig {
            trials,
            on_width: PulseWidth::fixed(0.001),
            off_width: PulseWidth::fixed(0.001),
            points_per_frame: points,
        }
    }

    fn machine(
        config: ExperimentConfig,
        channel: MockChannel,
    ) -> ExperimentStateMachine<DisplayLatency, MockChannel, HighPrecisionTimer, StdRng> {
        ExperimentStateMachine::new(
            config,
            DisplayLatency,
            channel,
            HighPrecisionTimer::new(),
            StdRng::seed_from_u64(1),
        )
    }

    #[test]
    fn test_phases_advance_through_one_trial() {
        let mut m = machine(quick_config(1, 1), MockChannel::new());
        let mut stim = StimulusState::default();
        assert_eq!(m.phase(), TrialPhase::Idle);
        assert_eq!(m.trial_index(), 0);

        m.run(&mut stim).unwrap();
        assert_eq!(m.phase(), TrialPhase::Terminated);
        assert_eq!(m.trial_index(), 1);
        assert_eq!(m.completed_trials(), 1);
        assert!(!stim.visible);
    }

    #[test]
    fn test_abort_stops_before_next_event() {
        let mut m = machine(quick_config(10, 1), MockChannel::new());
        let mut stim = StimulusState::default();

        assert!(m.step(&mut stim).unwrap());
        m.abort();
        assert!(!m.step(&mut stim).unwrap());
        assert_eq!(m.phase(), TrialPhase::Terminated);
        assert!(m.store().is_empty());
    }

    #[test]
    fn test_step_loop_alone_runs_to_completion() {
        let mut m = machine(quick_config(2, 1), MockChannel::new());
        let mut stim = StimulusState::default();

        while m.step(&mut stim).unwrap() {}
        assert_eq!(m.phase(), TrialPhase::Terminated);
        assert_eq!(m.completed_trials(), 2);
        assert_eq!(m.channel().markers().len(), 2);
    }

    #[test]
    fn test_invalid_config_fails_before_any_io() {
        let config = ExperimentConfig {
            on_width: PulseWidth::range(0.2, 0.1),
            ..quick_config(3, 1)
        };
        let mut m = machine(config, MockChannel::new());
        let mut stim = StimulusState::default();

        let err = m.run(&mut stim).unwrap_err();
        assert!(matches!(err, AcquisitionError::Config(_)));
        assert_eq!(m.trial_index(), 0);
    }

    #[test]
    fn test_non_finite_width_fails_before_any_io() {
        let config = ExperimentConfig {
            on_width: PulseWidth::fixed(f64::NAN),
            ..quick_config(3, 1)
        };
        let mut m = machine(config, MockChannel::new());
        let mut stim = StimulusState::default();

        let err = m.run(&mut stim).unwrap_err();
        assert!(matches!(err, AcquisitionError::Config(_)));
        assert!(m.step(&mut stim).is_err());
        assert!(m.channel().markers().is_empty());
    }
}
