use rand::SeedableRng;
use rand::rngs::StdRng;
use vrlat_core::{
    DisplayLatency, StimulusControl, StimulusState, TelemetryRecord, TotalLatency,
};
use vrlat_device::{MockChannel, SYNC_MARKER};
use vrlat_experiment::{
    AcquisitionError, ExperimentConfig, ExperimentStateMachine, PulseWidth, TrialPhase,
};
use vrlat_timing::HighPrecisionTimer;

const FRAME_TWO_POINTS: [u8; 16] = [
    0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x02, 0x00, // t=1, 1, 2
    0x02, 0x00, 0x00, 0x00, 0x03, 0x00, 0x04, 0x00, // t=2, 3, 4
];

fn fast_config(trials: u64, points: usize) -> ExperimentConfig {
    ExperimentConfig {
        trials,
        on_width: PulseWidth::range(0.001, 0.003),
        off_width: PulseWidth::fixed(0.001),
        points_per_frame: points,
    }
}

fn display_machine(
    config: ExperimentConfig,
    channel: MockChannel,
) -> ExperimentStateMachine<DisplayLatency, MockChannel, HighPrecisionTimer, StdRng> {
    ExperimentStateMachine::new(
        config,
        DisplayLatency,
        channel,
        HighPrecisionTimer::new(),
        StdRng::seed_from_u64(99),
    )
}

#[test]
fn completed_run_yields_one_batch_per_trial() {
    let mut channel = MockChannel::new();
    channel.push_frames(&FRAME_TWO_POINTS, 3);
    let mut m = display_machine(fast_config(3, 2), channel);
    let mut stim = StimulusState::default();

    m.run(&mut stim).unwrap();
    assert_eq!(m.phase(), TrialPhase::Terminated);

    let store = m.into_store();
    assert_eq!(store.len(), 3);
    let indices: Vec<u64> = store.snapshot().iter().map(|b| b.trial_index).collect();
    assert_eq!(indices, vec![1, 2, 3]);

    for batch in store.snapshot() {
        assert_eq!(
            batch.records,
            vec![
                TelemetryRecord {
                    timestamp_us: 1,
                    chan1: 1,
                    chan2: 2,
                },
                TelemetryRecord {
                    timestamp_us: 2,
                    chan1: 3,
                    chan2: 4,
                },
            ]
        );
    }
}

#[test]
fn one_marker_per_trial_in_order() {
    let mut channel = MockChannel::new();
    channel.push_frames(&FRAME_TWO_POINTS, 3);
    let mut m = display_machine(fast_config(3, 2), channel);
    let mut stim = StimulusState::default();

    m.run(&mut stim).unwrap();
    assert_eq!(m.channel().markers(), [SYNC_MARKER; 3]);
}

#[test]
fn timeout_mid_run_keeps_earlier_batches_only() {
    let mut channel = MockChannel::new();
    channel.push_frame(FRAME_TWO_POINTS.to_vec()).push_timeout();
    let mut m = display_machine(fast_config(3, 2), channel);
    let mut stim = StimulusState::default();

    let err = m.run(&mut stim).unwrap_err();
    assert!(matches!(err, AcquisitionError::Channel { trial: 2, .. }));
    assert_eq!(m.phase(), TrialPhase::Terminated);

    // The broken trial contributes nothing; indices stay densely 1-based.
    assert_eq!(m.store().len(), 1);
    assert_eq!(m.store().snapshot()[0].trial_index, 1);
}

#[test]
fn wrong_length_frame_aborts_the_run() {
    let mut channel = MockChannel::new();
    channel.push_frame(vec![0u8; 15]);
    let mut m = display_machine(fast_config(2, 2), channel);
    let mut stim = StimulusState::default();

    let err = m.run(&mut stim).unwrap_err();
    assert!(matches!(err, AcquisitionError::Frame { trial: 1, .. }));
    assert!(m.store().is_empty());
}

#[derive(Default)]
struct RecordingStimulus {
    transitions: Vec<bool>,
}

impl StimulusControl for RecordingStimulus {
    fn set_visible(&mut self, visible: bool) {
        self.transitions.push(visible);
    }

    fn set_position(&mut self, _position: (f32, f32)) {}
}

#[test]
fn stimulus_toggles_on_then_off_each_trial() {
    let mut channel = MockChannel::new();
    channel.push_frames(&FRAME_TWO_POINTS, 2);
    let mut m = display_machine(fast_config(2, 2), channel);
    let mut stim = RecordingStimulus::default();

    m.run(&mut stim).unwrap();
    assert_eq!(stim.transitions, vec![true, false, true, false]);
}

#[test]
fn total_paradigm_rests_hidden_at_home() {
    let mut channel = MockChannel::new();
    channel.push_frames(&FRAME_TWO_POINTS, 1);
    let paradigm = TotalLatency::default();
    let home = paradigm.movement.home;
    let mut m = ExperimentStateMachine::new(
        fast_config(1, 2),
        paradigm,
        channel,
        HighPrecisionTimer::new(),
        StdRng::seed_from_u64(99),
    );
    let mut stim = StimulusState::default();

    m.run(&mut stim).unwrap();
    assert!(!stim.visible);
    assert_eq!(stim.position, home);
}

#[test]
fn unscripted_channel_sustains_a_dry_run() {
    let mut m = display_machine(fast_config(2, 240), MockChannel::new());
    let mut stim = StimulusState::default();

    m.run(&mut stim).unwrap();
    let store = m.into_store();
    assert_eq!(store.len(), 2);
    assert_eq!(store.record_count(), 480);
    for batch in store.snapshot() {
        assert_eq!(batch.len(), 240);
    }
}
