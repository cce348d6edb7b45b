use std::hash::Hasher;

use crate::{eval::evaluator::EvaluatedGraph, foundation::math::Fnv1a64};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// 128-bit digest of everything that affects a frame's pixels.
pub struct FrameFingerprint {
    pub hi: u64,
    pub lo: u64,
}

/// Two independently seeded FNV streams fed the same bytes.
struct Wide(Fnv1a64, Fnv1a64);

impl Wide {
    fn new() -> Self {
        Self(Fnv1a64::new_default(), Fnv1a64::new(0x9ae1_6a3b_2f90_404f))
    }

    fn u64(&mut self, v: u64) {
        self.0.write_u64(v);
        self.1.write_u64(v);
    }

    fn f64(&mut self, v: f64) {
        self.0.write_f64(v);
        self.1.write_f64(v);
    }

    /// Length-prefixed so adjacent strings cannot run together.
    fn str(&mut self, s: &str) {
        self.u64(s.len() as u64);
        self.0.write(s.as_bytes());
        self.1.write(s.as_bytes());
    }

    fn finish(self) -> FrameFingerprint {
        FrameFingerprint {
            hi: self.0.finish(),
            lo: self.1.finish(),
        }
    }
}

/// Fingerprint an evaluated frame. Equal fingerprints render identical pixels, which is what lets
/// the pipeline reuse the previous frame instead of rasterizing again.
pub fn fingerprint_eval(eval: &EvaluatedGraph) -> FrameFingerprint {
    let mut h = Wide::new();
    h.u64(eval.nodes.len() as u64);
    for node in &eval.nodes {
        h.str(&node.clip_id);
        h.str(&node.asset);
        h.u64(i64::from(node.z) as u64);
        for c in node.transform.as_coeffs() {
            h.f64(c);
        }
        for v in [node.opacity, node.reveal, node.anchor.x, node.anchor.y] {
            h.f64(v);
        }
    }
    h.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/compile/fingerprint.rs"]
mod tests;
