//! Time-ordered intensity traces

/// One `(time, intensity)` sample of a chromatogram
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TracePoint {
    pub time: f64,
    pub intensity: f64,
}

impl TracePoint {
    pub fn new(time: f64, intensity: f64) -> Self {
        Self { time, intensity }
    }
}

impl From<(f64, f64)> for TracePoint {
    fn from(value: (f64, f64)) -> Self {
        Self::new(value.0, value.1)
    }
}

/// The intensity-over-time trace for a single mass window, in the order the
/// scan provider produced it.
///
/// Times and intensities are stored as parallel arrays which always have the
/// same length.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ChromatogramTrace {
    time: Vec<f64>,
    intensity: Vec<f64>,
}

impl ChromatogramTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            time: Vec::with_capacity(capacity),
            intensity: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, time: f64, intensity: f64) {
        self.time.push(time);
        self.intensity.push(intensity);
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn times(&self) -> &[f64] {
        &self.time
    }

    pub fn intensities(&self) -> &[f64] {
        &self.intensity
    }

    pub fn get(&self, index: usize) -> Option<TracePoint> {
        Some(TracePoint::new(
            *self.time.get(index)?,
            *self.intensity.get(index)?,
        ))
    }

    pub fn iter(&self) -> impl Iterator<Item = TracePoint> + '_ {
        self.time
            .iter()
            .zip(self.intensity.iter())
            .map(|(t, i)| TracePoint::new(*t, *i))
    }

    /// A copy of this trace keeping only samples with strictly positive
    /// intensity. Each sample is kept or dropped as a whole.
    pub fn retain_positive(&self) -> ChromatogramTrace {
        self.iter().filter(|p| p.intensity > 0.0).collect()
    }

    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.time, self.intensity)
    }

    pub fn total_intensity(&self) -> f64 {
        self.intensity.iter().sum()
    }
}

impl FromIterator<TracePoint> for ChromatogramTrace {
    fn from_iter<T: IntoIterator<Item = TracePoint>>(iter: T) -> Self {
        let mut trace = ChromatogramTrace::new();
        trace.extend(iter);
        trace
    }
}

impl Extend<TracePoint> for ChromatogramTrace {
    fn extend<T: IntoIterator<Item = TracePoint>>(&mut self, iter: T) {
        for point in iter {
            self.push(point.time, point.intensity);
        }
    }
}

impl FromIterator<(f64, f64)> for ChromatogramTrace {
    fn from_iter<T: IntoIterator<Item = (f64, f64)>>(iter: T) -> Self {
        iter.into_iter().map(TracePoint::from).collect()
    }
}

impl From<Vec<(f64, f64)>> for ChromatogramTrace {
    fn from(value: Vec<(f64, f64)>) -> Self {
        value.into_iter().collect()
    }
}
