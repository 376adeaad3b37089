use crate::foundation::error::{VidscriptError, VidscriptResult};

pub use kurbo::{Affine, Point, Vec2};

/// Absolute 0-based frame index within one sampled scene.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> VidscriptResult<Self> {
        if den == 0 {
            return Err(VidscriptError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(VidscriptError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Convert a frame count (or a frame index) to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * f64::from(self.den) / f64::from(self.num)
    }

    /// Number of frames needed to cover `secs`, rounding up.
    pub fn secs_to_frames_ceil(self, secs: f64) -> u64 {
        let frames = secs * self.as_f64();
        if !frames.is_finite() || frames <= 0.0 {
            return 0;
        }
        // Absorb float noise such as 2.0000000000000004 frames.
        let rounded = frames.round();
        if (frames - rounded).abs() < 1e-9 {
            rounded as u64
        } else {
            frames.ceil() as u64
        }
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Canvas center in raster space.
    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }
}

/// Affine transform from script space to raster space.
///
/// Script space is centered on the canvas midpoint with Y increasing upward; raster space has
/// its origin at the top-left corner with Y increasing downward.
pub fn script_to_raster(canvas: Canvas) -> Affine {
    let c = canvas.center();
    Affine::translate(Vec2::new(c.x, c.y)) * Affine::scale_non_uniform(1.0, -1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
