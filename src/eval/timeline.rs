use std::collections::HashMap;

use crate::foundation::core::{Canvas, Point};
use crate::foundation::error::{VidscriptError, VidscriptResult};
use crate::script::ast::{AnimationCommand, Fade, FadeDirection, Program, SceneSpec, VisualKind};

/// Rendered attributes of one visual element at one sampled instant.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ElementState {
    /// Id copied from the declaring element.
    pub id: String,
    /// Variant payload copied from the declaring element.
    pub kind: VisualKind,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Anchor in script space. Static: no motion verbs exist yet.
    pub position: Point,
}

/// Everything a rasterizer needs to draw one frame of one scene.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameSnapshot {
    /// Index of the scene in declaration order.
    pub scene: usize,
    /// Sample time in seconds from scene start.
    pub time: f64,
    /// Canvas the script-space coordinates refer to.
    pub canvas: Canvas,
    /// One entry per declared element, in declaration order.
    pub elements: Vec<ElementState>,
}

/// Compute the visual state of every element of `scene` at time `t` (seconds).
///
/// Events are applied in declaration order, not sorted by time, and every command whose window
/// matches `t` overwrites the opacity computed so far; the last matching command in declaration
/// order wins. Fades whose target id is not declared are skipped. The function is pure and total.
pub fn evaluate_scene(scene: &SceneSpec, t: f64) -> Vec<ElementState> {
    let mut states: Vec<ElementState> = scene
        .visuals
        .iter()
        .map(|v| ElementState {
            id: v.id.clone(),
            kind: v.kind.clone(),
            opacity: 1.0,
            position: v.at,
        })
        .collect();

    // Later declarations shadow earlier ones with the same id.
    let by_id: HashMap<&str, usize> = scene
        .visuals
        .iter()
        .enumerate()
        .map(|(i, v)| (v.id.as_str(), i))
        .collect();

    for event in &scene.timeline {
        for command in &event.commands {
            match command {
                AnimationCommand::Fade(fade) => {
                    let Some(&idx) = by_id.get(fade.target.as_str()) else {
                        continue;
                    };
                    if let Some(opacity) = fade_opacity_at(fade, event.time, t) {
                        states[idx].opacity = opacity;
                    }
                }
            }
        }
    }

    states
}

/// Opacity a fade starting at `start` imposes at time `t`, or `None` before it begins.
fn fade_opacity_at(fade: &Fade, start: f64, t: f64) -> Option<f64> {
    let dur = fade.duration;
    let end = start + dur;

    if dur == 0.0 {
        // Instant hide or show, permanent from `start` onward.
        return (t >= start).then_some(fade.direction.terminal_opacity());
    }

    if start <= t && t <= end {
        let progress = ((t - start) / dur).clamp(0.0, 1.0);
        return Some(match fade.direction {
            FadeDirection::In => progress,
            FadeDirection::Out => 1.0 - progress,
        });
    }

    if t > end {
        return Some(fade.direction.terminal_opacity());
    }

    None
}

/// Evaluate scene `scene` of `program` at `t` and bundle the result with the canvas size.
pub fn evaluate_program(
    program: &Program,
    scene: usize,
    t: f64,
) -> VidscriptResult<FrameSnapshot> {
    let spec = program.scenes.get(scene).ok_or_else(|| {
        VidscriptError::evaluation(format!(
            "scene index {scene} is out of range (program has {} scenes)",
            program.scenes.len()
        ))
    })?;
    Ok(FrameSnapshot {
        scene,
        time: t,
        canvas: program.video.dimensions,
        elements: evaluate_scene(spec, t),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/eval/timeline.rs"]
mod tests;
