#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinchDirection {
    In,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchClassifier {
    threshold: f64,
}

impl PinchClassifier {
    /// `threshold` is the scale factor a pinch out has to exceed; a pinch in
    /// has to go below its inverse.
    pub fn new(threshold: f64) -> Self { Self { threshold: threshold.max(1.0) } }

    pub fn classify(&self, scale: f64) -> Option<PinchDirection> {
        if !scale.is_finite() || scale <= 0.0 {
            return None;
        }
        if scale > self.threshold {
            Some(PinchDirection::Out)
        } else if scale < 1.0 / self.threshold {
            Some(PinchDirection::In)
        } else {
            None
        }
    }
}
