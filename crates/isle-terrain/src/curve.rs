//! Height remap curve applied when turning normalized heights into elevation.

use serde::{Deserialize, Serialize};

/// One control point of a [`HeightCurve`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    /// Input (normalized height).
    pub time: f64,
    /// Output multiplier before the mesh height multiplier is applied.
    pub value: f64,
}

impl CurveKey {
    /// Create a key.
    pub const fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }
}

/// Piecewise-linear remap curve.
///
/// An immutable value: builds and background workers evaluate their own clone,
/// so edits made to a configuration while a build runs never reach it.
/// Inputs outside the key range clamp to the first/last key. A curve with no
/// keys is the identity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<CurveKey>", into = "Vec<CurveKey>")]
pub struct HeightCurve {
    keys: Vec<CurveKey>,
}

impl HeightCurve {
    /// Build a curve from keys in any order; keys are sorted by time and
    /// non-finite keys are dropped.
    pub fn new(keys: impl IntoIterator<Item = CurveKey>) -> Self {
        let mut keys: Vec<CurveKey> = keys
            .into_iter()
            .filter(|k| k.time.is_finite() && k.value.is_finite())
            .collect();
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// The identity from `(0, 0)` to `(1, 1)`.
    pub fn linear() -> Self {
        Self::new([CurveKey::new(0.0, 0.0), CurveKey::new(1.0, 1.0)])
    }

    /// Flat sea floor up to the shoreline, then a gentle rise into steeper peaks.
    pub fn island() -> Self {
        Self::new([
            CurveKey::new(0.0, 0.0),
            CurveKey::new(0.3, 0.02),
            CurveKey::new(0.45, 0.12),
            CurveKey::new(0.7, 0.45),
            CurveKey::new(1.0, 1.0),
        ])
    }

    /// Control points in ascending time order.
    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    /// Evaluate the curve at `t`.
    pub fn evaluate(&self, t: f64) -> f64 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return t,
        };
        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        // First key strictly after t; t > first.time guarantees i >= 1.
        let i = self.keys.partition_point(|k| k.time <= t);
        let a = self.keys[i - 1];
        let b = self.keys[i];
        let span = b.time - a.time;
        if span <= 0.0 {
            return b.value;
        }
        let f = (t - a.time) / span;
        a.value + (b.value - a.value) * f
    }
}

impl From<Vec<CurveKey>> for HeightCurve {
    fn from(keys: Vec<CurveKey>) -> Self {
        Self::new(keys)
    }
}

impl From<HeightCurve> for Vec<CurveKey> {
    fn from(curve: HeightCurve) -> Self {
        curve.keys
    }
}
