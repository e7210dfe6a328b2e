//! Exponential smoothing of the magnitude spectrum across frames.

/// One-pole IIR smoother. Carries the smoothed spectrum between ticks;
/// reinitializes from the raw input whenever the spectrum length changes.
pub struct Smoother {
    alpha: f32,
    state: Vec<f32>,
}

impl Smoother {
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha,
            state: Vec::new(),
        }
    }

    /// Fold `magnitudes` into the smoothed spectrum and return it.
    pub fn apply(&mut self, magnitudes: &[f32]) -> &[f32] {
        if self.state.len() != magnitudes.len() {
            self.state.clear();
            self.state.extend_from_slice(magnitudes);
        } else {
            for (s, &m) in self.state.iter_mut().zip(magnitudes) {
                *s = self.alpha * *s + (1.0 - self.alpha) * m;
            }
        }
        &self.state
    }
}
