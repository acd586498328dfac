//! Two-contact pinch tracking: baseline distance and running scale.

/// Tracks the inter-contact distance of a two-finger interaction relative to
/// the distance observed when the second contact landed.
///
/// Scale updates below the sensitivity threshold are swallowed so callbacks
/// are not flooded with imperceptible deltas; feeding the same distance
/// twice never reports twice.
#[derive(Debug)]
pub struct PinchTracker {
    baseline_distance: Option<f32>,
    last_scale: f32,
    sensitivity: f32,
}

impl PinchTracker {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            baseline_distance: None,
            last_scale: 1.0,
            sensitivity,
        }
    }

    pub fn is_active(&self) -> bool {
        self.baseline_distance.is_some()
    }

    /// Records the baseline at the 1→2 contact transition.
    pub fn begin(&mut self, distance: f32) {
        self.baseline_distance = Some(distance);
        self.last_scale = 1.0;
    }

    /// Reports the new scale when the change since the last report exceeds
    /// the sensitivity. A degenerate zero baseline never divides.
    pub fn update(&mut self, distance: f32) -> Option<f32> {
        let baseline = self.baseline_distance?;
        if baseline <= f32::EPSILON {
            return None;
        }
        let scale = distance / baseline;
        if (scale - self.last_scale).abs() > self.sensitivity {
            self.last_scale = scale;
            Some(scale)
        } else {
            None
        }
    }

    /// Clears the baseline and resets the reported scale to 1.
    pub fn end(&mut self) {
        self.baseline_distance = None;
        self.last_scale = 1.0;
    }
}
