use std::io::Write;

use crate::eval::timeline::FrameSnapshot;
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::VidscriptResult;
use crate::sample::fingerprint::FrameFingerprint;

/// Per-scene configuration handed to a [`SnapshotSink`] before its first frame.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SinkConfig {
    /// Index of the scene in declaration order.
    pub scene: usize,
    /// Scene title.
    pub title: String,
    /// Canvas size in pixels.
    pub canvas: Canvas,
    /// Sample rate.
    pub fps: Fps,
    /// Number of frames that will be pushed.
    pub frame_count: u64,
    /// Seconds covered by the frames (the scene's effective duration).
    pub duration: f64,
    /// Narration text for the text-to-speech collaborator, verbatim.
    pub narration: Option<String>,
}

/// One sampled frame as delivered to a sink.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SampledFrame {
    /// Frame index within the scene.
    pub frame: FrameIndex,
    /// Stable digest of the element states.
    pub fingerprint: FrameFingerprint,
    /// `true` when the previous frame of the same scene has the same fingerprint.
    pub repeats_previous: bool,
    /// Element states at this frame's sample time.
    pub snapshot: FrameSnapshot,
}

/// Consumer of sampled frames (a rasterizer, an encoder bridge, a test harness).
///
/// Ordering contract: for each scene `begin` is called once, then `push_frame` in strictly
/// increasing `FrameIndex` order, then `end`. Scenes arrive in declaration order.
pub trait SnapshotSink: Send {
    /// Called once per scene before any of its frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> VidscriptResult<()>;
    /// Push one frame in strictly increasing frame order.
    fn push_frame(&mut self, frame: &SampledFrame) -> VidscriptResult<()>;
    /// Called once per scene after its last frame.
    fn end(&mut self) -> VidscriptResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    scenes: Vec<(SinkConfig, Vec<SampledFrame>)>,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Captured scenes with their frames, in the order they were sampled.
    pub fn scenes(&self) -> &[(SinkConfig, Vec<SampledFrame>)] {
        &self.scenes
    }

    /// All captured frames of all scenes, flattened.
    pub fn frames(&self) -> impl Iterator<Item = &SampledFrame> {
        self.scenes.iter().flat_map(|(_, frames)| frames.iter())
    }
}

impl SnapshotSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> VidscriptResult<()> {
        self.scenes.push((cfg, Vec::new()));
        Ok(())
    }

    fn push_frame(&mut self, frame: &SampledFrame) -> VidscriptResult<()> {
        if let Some((_, frames)) = self.scenes.last_mut() {
            frames.push(frame.clone());
        }
        Ok(())
    }

    fn end(&mut self) -> VidscriptResult<()> {
        Ok(())
    }
}

#[derive(serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum JsonLine<'a> {
    Scene(&'a SinkConfig),
    Frame(&'a SampledFrame),
}

/// Writes one JSON object per line: a `scene` header per scene followed by its `frame`s.
pub struct JsonLinesSink<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> JsonLinesSink<W> {
    /// Wrap a writer. Buffer it yourself if it is unbuffered.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &JsonLine<'_>) -> VidscriptResult<()> {
        serde_json::to_writer(&mut self.out, line)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }
}

impl<W: Write + Send> SnapshotSink for JsonLinesSink<W> {
    fn begin(&mut self, cfg: SinkConfig) -> VidscriptResult<()> {
        self.write_line(&JsonLine::Scene(&cfg))
    }

    fn push_frame(&mut self, frame: &SampledFrame) -> VidscriptResult<()> {
        self.write_line(&JsonLine::Frame(frame))
    }

    fn end(&mut self) -> VidscriptResult<()> {
        self.out.flush()?;
        Ok(())
    }
}
