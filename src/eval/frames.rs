use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{VidscriptError, VidscriptResult};
use crate::script::ast::SceneSpec;

/// Length a scene actually plays for: the longer of its declared duration and the measured
/// narration audio, when the audio collaborator has reported one.
pub fn effective_duration(scene: &SceneSpec, narration_secs: Option<f64>) -> f64 {
    match narration_secs {
        Some(audio) if audio.is_finite() => scene.duration.max(audio),
        _ => scene.duration,
    }
}

/// Fixed-rate sample grid over `[0, duration]` for one scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FramePlan {
    /// Sample rate.
    pub fps: Fps,
    /// Seconds covered by the plan.
    pub duration: f64,
    /// Number of frames; at least one.
    pub frame_count: u64,
}

impl FramePlan {
    /// Plan `ceil(duration * fps)` frames, never fewer than one.
    pub fn new(fps: Fps, duration: f64) -> VidscriptResult<Self> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(VidscriptError::validation(format!(
                "sample duration must be finite and >= 0, got {duration}"
            )));
        }
        Ok(Self {
            fps,
            duration,
            frame_count: fps.secs_to_frames_ceil(duration).max(1),
        })
    }

    /// Plan covering the effective duration of `scene`.
    pub fn for_scene(
        scene: &SceneSpec,
        fps: Fps,
        narration_secs: Option<f64>,
    ) -> VidscriptResult<Self> {
        Self::new(fps, effective_duration(scene, narration_secs))
    }

    /// Sample time of `frame` in seconds from scene start.
    pub fn time_of(&self, frame: FrameIndex) -> f64 {
        self.fps.frames_to_secs(frame.0)
    }

    /// Frames with their sample times, in increasing order.
    pub fn frames(&self) -> impl Iterator<Item = (FrameIndex, f64)> + '_ {
        (0..self.frame_count).map(|f| (FrameIndex(f), self.time_of(FrameIndex(f))))
    }
}
