//! Vidscript compiles a declarative script describing narrated, animated explainer videos.
//!
//! The crate covers the two coupled halves of that pipeline:
//!
//! - [`parse`] turns script text into an immutable [`Program`] tree, or a [`SyntaxError`]
//!   pointing at the first offending character.
//! - [`evaluate_scene`] maps a scene and a sample time to the [`ElementState`] of every
//!   visual element. It is pure, so frames can be computed in any order and on any thread.
//!
//! Rasterizing, speech synthesis and encoding live outside this crate. [`SampleSession`] feeds
//! fixed-rate frame snapshots to whatever [`SnapshotSink`] bridges to them.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod eval;
mod foundation;
mod sample;
mod script;
mod validate;

pub use crate::eval::frames::{FramePlan, effective_duration};
pub use crate::eval::timeline::{ElementState, FrameSnapshot, evaluate_program, evaluate_scene};
pub use crate::foundation::core::{Affine, Canvas, Fps, FrameIndex, Point, Vec2, script_to_raster};
pub use crate::foundation::error::{VidscriptError, VidscriptResult};
pub use crate::sample::fingerprint::FrameFingerprint;
pub use crate::sample::session::{SampleOpts, SampleSession, SampleStats};
pub use crate::sample::sink::{InMemorySink, JsonLinesSink, SampledFrame, SinkConfig, SnapshotSink};
pub use crate::script::ast::{
    AnimationCommand, Fade, FadeDirection, Program, SceneSpec, TimelineEvent, VideoSpec,
    VisualElement, VisualKind,
};
pub use crate::script::error::{Location, Position, SyntaxError};
pub use crate::validate::{Diagnostic, DiagnosticKind, Severity, validate_program};

/// Parse script text into a [`Program`].
///
/// Fails on the first grammar mismatch; nothing is partially built or retained on failure.
pub fn parse(src: &str) -> Result<Program, SyntaxError> {
    crate::script::parser::parse_program(src)
}

/// Read and parse a script file.
pub fn parse_file(path: impl AsRef<std::path::Path>) -> VidscriptResult<Program> {
    let src = std::fs::read_to_string(path.as_ref())?;
    Ok(parse(&src)?)
}
