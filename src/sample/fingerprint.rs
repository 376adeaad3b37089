use crate::eval::timeline::ElementState;
use crate::script::ast::VisualKind;
use xxhash_rust::xxh3::Xxh3;

const XXH3_SEED: u64 = 0x5c1e_7a3d_90b4_e621;

/// Stable fingerprint of a frame's element states.
///
/// The sample time is not hashed, so two frames that draw the same thing compare equal even
/// though they sit at different instants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FrameFingerprint {
    /// High 64 bits of the xxh3-128 digest.
    pub hi: u64,
    /// Low 64 bits of the xxh3-128 digest.
    pub lo: u64,
}

pub(crate) fn fingerprint_states(states: &[ElementState]) -> FrameFingerprint {
    let mut h = StableHasher::new();
    h.write_u64(states.len() as u64);
    for s in states {
        h.write_str(&s.id);
        match &s.kind {
            VisualKind::Text { content } => {
                h.write_u8(0);
                h.write_str(content);
            }
            VisualKind::Circle { radius } => {
                h.write_u8(1);
                h.write_f64(*radius);
            }
        }
        h.write_f64(s.opacity);
        h.write_f64(s.position.x);
        h.write_f64(s.position.y);
    }
    h.finish()
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_str(&mut self, s: &str) {
        // Length-prefixed.
        self.write_u64(s.len() as u64);
        self.write_bytes(s.as_bytes());
    }

    fn finish(self) -> FrameFingerprint {
        let v = self.inner.digest128();
        FrameFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}
