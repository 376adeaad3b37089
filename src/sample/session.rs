use std::collections::BTreeMap;
use std::ops::AddAssign;

use rayon::prelude::*;

use crate::eval::frames::FramePlan;
use crate::eval::timeline::{ElementState, FrameSnapshot, evaluate_scene};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{VidscriptError, VidscriptResult};
use crate::sample::fingerprint::{FrameFingerprint, fingerprint_states};
use crate::sample::sink::{SampledFrame, SinkConfig, SnapshotSink};
use crate::script::ast::{Program, SceneSpec};

/// Options for [`SampleSession`].
#[derive(Clone, Debug)]
pub struct SampleOpts {
    /// Sample rate.
    pub fps: Fps,
    /// Evaluate frames on a rayon pool when `true`.
    pub parallel: bool,
    /// Worker thread count for the pool. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Frames evaluated per parallel batch before they are pushed to the sink.
    pub chunk_size: usize,
    /// Measured narration audio length in seconds, keyed by scene index.
    pub narration_secs: BTreeMap<usize, f64>,
}

impl Default for SampleOpts {
    fn default() -> Self {
        Self {
            fps: Fps { num: 30, den: 1 },
            parallel: false,
            threads: None,
            chunk_size: 64,
            narration_secs: BTreeMap::new(),
        }
    }
}

/// Frame counters reported by a sampling run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct SampleStats {
    /// Frames pushed to the sink.
    pub frames_total: u64,
    /// Frames whose fingerprint repeats the previous frame of the same scene.
    pub frames_static: u64,
}

impl AddAssign for SampleStats {
    fn add_assign(&mut self, rhs: Self) {
        self.frames_total += rhs.frames_total;
        self.frames_static += rhs.frames_static;
    }
}

/// Samples the scenes of a parsed program at a fixed rate into a [`SnapshotSink`].
///
/// Every frame is an independent call to [`evaluate_scene`]; parallel mode only changes who
/// computes them, never the frames or the order they reach the sink.
pub struct SampleSession<'p> {
    program: &'p Program,
    opts: SampleOpts,
    pool: Option<rayon::ThreadPool>,
}

impl<'p> SampleSession<'p> {
    /// Create a session, building the worker pool up front in parallel mode.
    pub fn new(program: &'p Program, opts: SampleOpts) -> VidscriptResult<Self> {
        if opts.fps.num == 0 || opts.fps.den == 0 {
            return Err(VidscriptError::validation("fps must have num>0 and den>0"));
        }
        let pool = if opts.parallel {
            Some(build_thread_pool(opts.threads)?)
        } else {
            None
        };
        Ok(Self {
            program,
            opts,
            pool,
        })
    }

    /// Frame plan for one scene, honoring any measured narration length.
    pub fn plan(&self, scene: usize) -> VidscriptResult<FramePlan> {
        let spec = self.scene(scene)?;
        let narration = self.opts.narration_secs.get(&scene).copied();
        FramePlan::for_scene(spec, self.opts.fps, narration)
    }

    /// Sample every scene in declaration order.
    pub fn sample_all(&self, sink: &mut dyn SnapshotSink) -> VidscriptResult<SampleStats> {
        let mut stats = SampleStats::default();
        for scene in 0..self.program.scenes.len() {
            stats += self.sample_scene(scene, sink)?;
        }
        Ok(stats)
    }

    /// Sample one scene over its effective duration.
    #[tracing::instrument(skip(self, sink))]
    pub fn sample_scene(
        &self,
        scene: usize,
        sink: &mut dyn SnapshotSink,
    ) -> VidscriptResult<SampleStats> {
        let spec = self.scene(scene)?;
        let plan = self.plan(scene)?;

        sink.begin(SinkConfig {
            scene,
            title: spec.title.clone(),
            canvas: self.program.video.dimensions,
            fps: plan.fps,
            frame_count: plan.frame_count,
            duration: plan.duration,
            narration: spec.narration.clone(),
        })?;

        let mut stats = SampleStats::default();
        let mut previous: Option<FrameFingerprint> = None;
        let frames: Vec<(FrameIndex, f64)> = plan.frames().collect();
        let chunk_size = self.opts.chunk_size.max(1);

        for chunk in frames.chunks(chunk_size) {
            let evaluated: Vec<(Vec<ElementState>, FrameFingerprint)> = match &self.pool {
                Some(pool) => pool.install(|| {
                    chunk
                        .par_iter()
                        .map(|&(_, t)| evaluate_with_fingerprint(spec, t))
                        .collect()
                }),
                None => chunk
                    .iter()
                    .map(|&(_, t)| evaluate_with_fingerprint(spec, t))
                    .collect(),
            };

            for (&(frame, time), (elements, fingerprint)) in chunk.iter().zip(evaluated) {
                let repeats_previous = previous == Some(fingerprint);
                previous = Some(fingerprint);

                sink.push_frame(&SampledFrame {
                    frame,
                    fingerprint,
                    repeats_previous,
                    snapshot: FrameSnapshot {
                        scene,
                        time,
                        canvas: self.program.video.dimensions,
                        elements,
                    },
                })?;

                stats.frames_total += 1;
                if repeats_previous {
                    stats.frames_static += 1;
                }
            }
        }

        sink.end()?;
        tracing::debug!(
            scene,
            frames = stats.frames_total,
            static_frames = stats.frames_static,
            "sampled scene"
        );
        Ok(stats)
    }

    fn scene(&self, scene: usize) -> VidscriptResult<&'p SceneSpec> {
        self.program.scenes.get(scene).ok_or_else(|| {
            VidscriptError::evaluation(format!(
                "scene index {scene} is out of range (program has {} scenes)",
                self.program.scenes.len()
            ))
        })
    }
}

fn evaluate_with_fingerprint(
    scene: &SceneSpec,
    t: f64,
) -> (Vec<ElementState>, FrameFingerprint) {
    let states = evaluate_scene(scene, t);
    let fingerprint = fingerprint_states(&states);
    (states, fingerprint)
}

fn build_thread_pool(threads: Option<usize>) -> VidscriptResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        if n == 0 {
            return Err(VidscriptError::validation("threads must be > 0"));
        }
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| VidscriptError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/sample/session.rs"]
mod tests;
