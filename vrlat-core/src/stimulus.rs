/// Commands the engine issues to whatever draws the stimulus.
///
/// Rendering lives outside the engine; an implementor maps these calls onto
/// its own draw state and applies them on its next frame.
pub trait StimulusControl {
    fn set_visible(&mut self, visible: bool);
    fn set_position(&mut self, position: (f32, f32));
}

/// Plain stimulus flags, usable headless and in tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StimulusState {
    pub visible: bool,
    pub position: (f32, f32),
}

impl Default for StimulusState {
    fn default() -> Self {
        Self {
            visible: false,
            position: (0.0, 0.0),
        }
    }
}

impl StimulusControl for StimulusState {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_position(&mut self, position: (f32, f32)) {
        self.position = position;
    }
}
