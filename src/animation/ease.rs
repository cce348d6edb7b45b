#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Rate functions mapping linear progress `t` in `[0, 1]` to eased progress.
pub enum Ease {
    /// Constant speed; used for writing text glyph by glyph.
    Linear,
    /// Smootherstep S-curve, zero velocity and acceleration at both ends. The default rate
    /// function for stage animations.
    Smooth,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Smooth => t * t * t * (t * (6.0 * t - 15.0) + 10.0),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
