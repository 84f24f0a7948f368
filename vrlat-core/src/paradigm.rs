use crate::stimulus::StimulusControl;

/// Maps a trial phase onto stimulus commands.
///
/// A paradigm decides what "stimulus on" and "stimulus off" mean for the
/// pipeline under test. It is picked once, when the experiment is built.
pub trait Paradigm {
    fn name(&self) -> &'static str;

    /// Drives the stimulus into its active (`true`) or inactive (`false`)
    /// state for the current trial.
    fn drive(&mut self, stimulus: &mut dyn StimulusControl, active: bool);
}

impl Paradigm for Box<dyn Paradigm> {
    fn name(&self) -> &'static str {
        self.as_ref().name()
    }

    fn drive(&mut self, stimulus: &mut dyn StimulusControl, active: bool) {
        self.as_mut().drive(stimulus, active)
    }
}

/// Display latency: the stimulus blinks in place. The photodiode sees the
/// visibility edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayLatency;

impl Paradigm for DisplayLatency {
    fn name(&self) -> &'static str {
        "display"
    }

    fn drive(&mut self, stimulus: &mut dyn StimulusControl, active: bool) {
        stimulus.set_visible(active);
    }
}

/// Tracking latency: the stimulus stays visible and jumps between a home and
/// a target position, so the tracker-driven reprojection is what moves.
#[derive(Debug, Clone, Copy)]
pub struct TrackingLatency {
    pub home: (f32, f32),
    pub target: (f32, f32),
}

impl TrackingLatency {
    pub fn new(home: (f32, f32), target: (f32, f32)) -> Self {
        Self { home, target }
    }
}

impl Default for TrackingLatency {
    fn default() -> Self {
        Self {
            home: (0.0, 0.0),
            target: (1.0, 0.0),
        }
    }
}

impl Paradigm for TrackingLatency {
    fn name(&self) -> &'static str {
        "tracking"
    }

    fn drive(&mut self, stimulus: &mut dyn StimulusControl, active: bool) {
        stimulus.set_position(if active { self.target } else { self.home });
    }
}

/// Total latency: visibility and position toggle together, exercising the
/// full display-plus-tracking path.
#[derive(Debug, Clone, Copy, Default)]
pub struct TotalLatency {
    pub movement: TrackingLatency,
}

impl Paradigm for TotalLatency {
    fn name(&self) -> &'static str {
        "total"
    }

    fn drive(&mut self, stimulus: &mut dyn StimulusControl, active: bool) {
        stimulus.set_visible(active);
        stimulus.set_position(if active {
            self.movement.target
        } else {
            self.movement.home
        });
    }
}
