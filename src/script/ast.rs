//! Program tree produced by the parser.
//!
//! The tree is immutable once built; the evaluator only reads it.

use crate::foundation::core::{Canvas, Point};

/// Root of a parsed script: one video block followed by at least one scene.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Program {
    /// Target output settings.
    pub video: VideoSpec,
    /// Scenes in playback order. Never empty for a parsed program.
    pub scenes: Vec<SceneSpec>,
}

/// Target video settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VideoSpec {
    /// Canvas size in pixels; all coordinate transforms key off of it.
    pub dimensions: Canvas,
}

/// A self-contained unit with its own duration, narration, visuals and timeline.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneSpec {
    /// Scene title; not required to be unique.
    pub title: String,
    /// Declared minimum length in seconds (non-negative).
    pub duration: f64,
    /// Text handed verbatim to the text-to-speech collaborator.
    pub narration: Option<String>,
    /// Elements in declaration order.
    pub visuals: Vec<VisualElement>,
    /// Events in declaration order, which is also evaluation order.
    pub timeline: Vec<TimelineEvent>,
}

/// A drawable entity with a stable id and an anchor in script space.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VisualElement {
    /// Name that timeline commands target. Expected to be unique per scene.
    pub id: String,
    /// Anchor position in script space (centered, Y-up).
    pub at: Point,
    /// Variant-specific payload.
    pub kind: VisualKind,
}

/// Closed set of element variants.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VisualKind {
    /// A text label.
    Text {
        /// Text to draw.
        content: String,
    },
    /// A circle centered on the anchor.
    Circle {
        /// Radius in script-space units (positive).
        radius: f64,
    },
}

impl VisualKind {
    /// Keyword used for this variant in scripts.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Circle { .. } => "circle",
        }
    }
}

/// A trigger at a fixed time offset bundling one or more animation commands.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimelineEvent {
    /// Seconds from scene start at which the commands begin.
    pub time: f64,
    /// Commands in declaration order.
    pub commands: Vec<AnimationCommand>,
}

/// Closed set of animation verbs.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnimationCommand {
    /// Opacity ramp on one element.
    Fade(Fade),
}

impl AnimationCommand {
    /// Element id this command refers to (unresolved).
    pub fn target(&self) -> &str {
        match self {
            Self::Fade(f) => &f.target,
        }
    }
}

/// Linear opacity ramp.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Fade {
    /// Id of the target element, resolved at evaluation time.
    pub target: String,
    /// Ramp direction.
    pub direction: FadeDirection,
    /// Ramp length in seconds (non-negative).
    pub duration: f64,
}

/// Direction of a [`Fade`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeDirection {
    /// 0 to 1.
    In,
    /// 1 to 0.
    Out,
}

impl FadeDirection {
    /// Opacity once the ramp has finished.
    pub fn terminal_opacity(self) -> f64 {
        match self {
            Self::In => 1.0,
            Self::Out => 0.0,
        }
    }
}
